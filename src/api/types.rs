//! Request and response payloads for the secret service. Several of these carry
//! messages, passphrases or tokens, so they intentionally do not derive `Debug`
//! and must never be logged.

use crate::viewer::DestructionAnimation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error marker the backend uses when a passphrase must be supplied.
pub const PASSPHRASE_REQUIRED: &str = "Passphrase required";

#[derive(Clone, Debug, Serialize)]
pub struct OtpRequest {
    pub email: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OtpResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_new_user: bool,
    /// Only present when the backend runs in debug mode and mail delivery failed.
    #[serde(default)]
    pub debug_otp: Option<String>,
}

#[derive(Clone, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

#[derive(Clone, Deserialize)]
pub struct VerifyOtpResponse {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Serialize)]
pub struct CreateSecretRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
    pub expiry_minutes: u32,
    pub destruction_animation: DestructionAnimation,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateSecretResponse {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Serialize)]
pub struct ViewSecretRequest<'a> {
    pub passphrase: &'a str,
}

#[derive(Clone, Deserialize)]
pub struct ViewSecretResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Older backends return the plaintext under `copy`.
    #[serde(default)]
    pub copy: Option<String>,
    #[serde(default)]
    pub destruction_animation: DestructionAnimation,
}

impl ViewSecretResponse {
    /// Consumes the response and returns the plaintext, preferring `message`.
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.copy)
    }
}

/// Error body shape shared by every endpoint: `{"error": .., "detail": ..}`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn is_passphrase_required(&self) -> bool {
        self.error.as_deref() == Some(PASSPHRASE_REQUIRED)
    }

    /// Most specific human-readable reason, or `fallback`.
    #[must_use]
    pub fn reason(&self, fallback: &str) -> String {
        self.detail
            .as_deref()
            .or(self.error.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn view_response_prefers_message_over_copy() {
        let response: ViewSecretResponse = serde_json::from_value(json!({
            "message": "primary",
            "copy": "legacy",
            "destruction_animation": "fire"
        }))
        .unwrap();
        assert_eq!(response.destruction_animation, DestructionAnimation::Fire);
        assert_eq!(response.into_message().as_deref(), Some("primary"));
    }

    #[test]
    fn view_response_falls_back_to_copy() {
        let response: ViewSecretResponse =
            serde_json::from_value(json!({ "copy": "legacy" })).unwrap();
        assert_eq!(response.destruction_animation, DestructionAnimation::None);
        assert_eq!(response.into_message().as_deref(), Some("legacy"));
    }

    #[test]
    fn error_body_reason_prefers_detail() {
        let body = ErrorBody {
            error: Some("Secret has expired".to_string()),
            detail: Some("This secret is no longer available".to_string()),
        };
        assert_eq!(body.reason("fallback"), "This secret is no longer available");

        let body = ErrorBody {
            error: Some("Invalid passphrase".to_string()),
            detail: None,
        };
        assert_eq!(body.reason("fallback"), "Invalid passphrase");
        assert_eq!(ErrorBody::default().reason("fallback"), "fallback");
    }

    #[test]
    fn error_body_detects_passphrase_marker() {
        let body: ErrorBody = serde_json::from_value(json!({
            "error": "Passphrase required",
            "detail": "Please provide a passphrase to view this secret"
        }))
        .unwrap();
        assert!(body.is_passphrase_required());
    }

    #[test]
    fn create_request_omits_missing_passphrase() {
        let request = CreateSecretRequest {
            message: "hi".to_string(),
            passphrase: None,
            expiry_minutes: 10,
            destruction_animation: DestructionAnimation::Explode,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "message": "hi",
                "expiry_minutes": 10,
                "destruction_animation": "explode"
            })
        );
    }
}
