use crate::{
    api::{ApiClient, ApiError},
    cli::commands::api,
    terminal::Console,
    viewer::Notice,
};
use anyhow::Result;
use secrecy::SecretString;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub api: api::Options,
    pub token: SecretString,
}

/// Revoke the token on the backend.
/// # Errors
/// Returns an error if the backend cannot be reached or rejects the request.
pub async fn execute(args: Args) -> Result<()> {
    let client = ApiClient::new(&args.api.client)?;
    let console = Console::stderr();

    match client.logout(&args.token).await {
        Ok(()) => {
            info!("token revoked");
            console.notice(&Notice::success("Logged out", "Your token has been revoked."));
            Ok(())
        }
        // Already invalid on the backend; nothing left to revoke.
        Err(ApiError::Unauthorized) => {
            console.notice(&Notice::info("Logged out", "The token was already expired."));
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
