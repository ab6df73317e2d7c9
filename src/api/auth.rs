//! One-time password login and token revocation.

use super::{
    ApiClient, ApiError, handle_empty_response,
    types::{OtpRequest, OtpResponse, VerifyOtpRequest, VerifyOtpResponse},
};
use secrecy::{ExposeSecret, SecretString};

impl ApiClient {
    /// Asks the backend to email a one-time code. Development backends also
    /// echo the code back in `debug_otp`.
    ///
    /// # Errors
    /// Returns transport or HTTP errors from the backend.
    pub async fn request_otp(&self, email: &str) -> Result<OtpResponse, ApiError> {
        let request = OtpRequest {
            email: email.trim().to_string(),
        };
        self.post_json(&["users", "login"], &request, None).await
    }

    /// Exchanges the emailed code for an API token.
    ///
    /// # Errors
    /// Returns `ApiError::Http` when the code is wrong or expired.
    pub async fn verify_otp(
        &self,
        email: &str,
        otp: &SecretString,
    ) -> Result<VerifyOtpResponse, ApiError> {
        let request = VerifyOtpRequest {
            email: email.trim().to_string(),
            otp: otp.expose_secret().trim().to_string(),
        };
        self.post_json(&["users", "verify_otp"], &request, None).await
    }

    /// Revokes `token` on the backend.
    ///
    /// # Errors
    /// Returns `ApiError::Unauthorized` if the token was already invalid.
    pub async fn logout(&self, token: &SecretString) -> Result<(), ApiError> {
        let response = self
            .post(&["users", "logout"], None::<&()>, Some(token))
            .await?;
        handle_empty_response(response).await
    }
}
