//! HTTP client for the secret service with a consistent timeout and error
//! policy. Feature calls live in [`auth`] and [`secrets`]; this module owns the
//! request plumbing. The client never stores tokens itself, it only attaches
//! the token a caller passes in.

pub mod auth;
pub mod errors;
pub mod secrets;
pub mod types;

pub use errors::ApiError;

use reqwest::{Client, Response, StatusCode, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{Instrument, debug, info_span};
use types::ErrorBody;
use url::Url;

/// Default API base, matching a locally running backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Builds a client for the configured API base.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base = parse_base_url(&config.api_base_url)?;
        let http = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http, base })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Joins path segments onto the base URL, percent-encoding each one and
    /// keeping the trailing slash the backend routes expect.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Config(format!("API base URL cannot take a path: {}", self.base)))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    /// Sends a JSON POST and returns the raw response for callers that need to
    /// inspect error bodies themselves.
    async fn post(
        &self,
        segments: &[&str],
        body: Option<&(impl Serialize + ?Sized)>,
        token: Option<&SecretString>,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(segments)?;
        let span = info_span!("api.request", http.method = "POST", url = %url);

        let mut request = self.http.post(url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Token {}", token.expose_secret()));
        }

        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;
        debug!(status = %response.status(), "api response");
        Ok(response)
    }

    async fn post_json<B, T>(
        &self,
        segments: &[&str],
        body: &B,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.post(segments, Some(body), token).await?;
        handle_json_response(response).await
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Config("API base URL is not configured.".to_string()));
    }
    let url = Url::parse(trimmed)
        .map_err(|err| ApiError::Config(format!("Invalid API base URL `{trimmed}`: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ApiError::Config(format!(
            "Unsupported API base URL scheme: {scheme}"
        ))),
    }
}

/// Maps transport errors into user-facing variants.
fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with sanitized bodies.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

/// Handles responses whose body the caller does not need.
async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if status.is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ApiError::Http {
        status,
        message: error_message(&body),
    }
}

/// Prefers the structured `{error, detail}` reason and falls back to the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if parsed.detail.is_some() || parsed.error.is_some() => {
            sanitize_body(&parsed.reason("Request failed."))
        }
        _ => sanitize_body(body),
    }
}

/// Trims and truncates error bodies for user-facing messages.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
