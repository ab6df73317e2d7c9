//! Secret endpoints: creation (authenticated) and one-time viewing (anonymous).

use super::{
    ApiClient, ApiError,
    types::{CreateSecretRequest, CreateSecretResponse, ErrorBody, ViewSecretRequest, ViewSecretResponse},
};
use crate::viewer::{Retrieval, RevealedSecret, SecretSource};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

const VIEW_FALLBACK: &str = "Failed to view secret";

impl ApiClient {
    /// Creates a secret owned by the session behind `token`.
    ///
    /// # Errors
    /// Returns `ApiError::Unauthorized` when the token is expired or revoked, or
    /// any transport/HTTP error.
    pub async fn create_secret(
        &self,
        token: &SecretString,
        request: &CreateSecretRequest,
    ) -> Result<CreateSecretResponse, ApiError> {
        self.post_json(&["secrets"], request, Some(token)).await
    }

    /// Attempts to view a secret. An empty passphrase only probes whether one is
    /// required. Every failure is folded into [`Retrieval::Failure`].
    pub async fn view_secret(&self, id: &str, passphrase: &SecretString) -> Retrieval {
        let id = id.trim();
        if id.is_empty() {
            return Retrieval::Failure("The secret link is missing its identifier.".to_string());
        }

        let body = ViewSecretRequest {
            passphrase: passphrase.expose_secret(),
        };
        let response = match self
            .post(&["secrets", id, "view_protected"], Some(&body), None)
            .await
        {
            Ok(response) => response,
            Err(err) => return Retrieval::Failure(err.to_string()),
        };

        let status = response.status();
        if status.is_success() {
            let body = match response.json::<ViewSecretResponse>().await {
                Ok(body) => body,
                Err(err) => {
                    return Retrieval::Failure(
                        ApiError::Parse(format!("Failed to decode response: {err}")).to_string(),
                    );
                }
            };
            let animation = body.destruction_animation;
            return match body.into_message() {
                Some(message) => Retrieval::Revealed(RevealedSecret {
                    message: SecretString::from(message),
                    animation,
                }),
                None => Retrieval::Failure("The secret response did not include a message.".to_string()),
            };
        }

        let text = response.text().await.unwrap_or_default();
        let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
        if body.is_passphrase_required() {
            debug!("backend requires a passphrase");
            Retrieval::PassphraseRequired
        } else {
            Retrieval::Failure(body.reason(&format!("{VIEW_FALLBACK} ({})", status.as_u16())))
        }
    }
}

impl SecretSource for ApiClient {
    async fn retrieve(&self, id: &str, passphrase: &SecretString) -> Retrieval {
        self.view_secret(id, passphrase).await
    }
}
