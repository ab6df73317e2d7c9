use crate::{
    api::ApiClient,
    cli::commands::api,
    session::SessionContext,
    terminal::{Console, input},
    viewer::Notice,
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::io::Write;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub api: api::Options,
    pub email: String,
    pub otp: Option<SecretString>,
}

/// Log in with an emailed one-time code and print the API token.
/// # Errors
/// Returns an error if the code cannot be requested or verified.
pub async fn execute(args: Args) -> Result<()> {
    let client = ApiClient::new(&args.api.client)?;
    let console = Console::stderr();

    let sent = client.request_otp(&args.email).await?;
    let message = if sent.message.trim().is_empty() {
        format!("A one-time code was sent to {}.", args.email)
    } else {
        sent.message.clone()
    };
    console.notice(&Notice::info("Check your email", message));
    if sent.is_new_user {
        info!("new account registered");
    }
    if let Some(code) = &sent.debug_otp {
        console.notice(&Notice::info("Development code", code.as_str()));
    }

    let otp = match args.otp {
        Some(otp) => otp,
        None => {
            console.write(|out| write!(out, "One-time code: "));
            input::stdin_lines()
                .recv()
                .await
                .map(SecretString::from)
                .context("no one-time code entered")?
        }
    };

    let verified = client.verify_otp(&args.email, &otp).await?;
    let session = SessionContext::new(SecretString::from(verified.token), verified.expires_at);

    let validity = session.remaining().map_or_else(
        || "The token has no expiry.".to_string(),
        |remaining| format!("The token is valid for {} minutes.", remaining.as_secs() / 60),
    );
    console.notice(&Notice::success("Logged in", validity));

    println!("BURNLINK_TOKEN={}", session.token().expose_secret());
    if let Some(expires_at) = session.expires_at() {
        println!("BURNLINK_TOKEN_EXPIRES_AT={}", expires_at.to_rfc3339());
    }

    Ok(())
}
