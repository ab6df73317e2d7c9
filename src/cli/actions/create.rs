use crate::{
    api::{ApiClient, ApiError, types::CreateSecretRequest},
    cli::commands::api,
    session::{CHECK_INTERVAL, SessionContext},
    terminal::{Clipboard, Console, SystemClipboard, input},
    viewer::{DestructionAnimation, Notice},
};
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::io::{IsTerminal, Write};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub api: api::Options,
    pub token: SecretString,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub message: Option<SecretString>,
    pub passphrase: Option<SecretString>,
    pub expiry_minutes: u32,
    pub animation: DestructionAnimation,
    pub copy: bool,
}

const SESSION_EXPIRED: &str = "Session expired. Please log in again with `burnlink login`.";

/// Create a secret and print its shareable link on stdout.
/// # Errors
/// Returns an error if the session has expired, the message is empty, or the
/// backend rejects the request.
pub async fn execute(args: Args) -> Result<()> {
    let client = ApiClient::new(&args.api.client)?;
    let console = Console::stderr();

    let session = SessionContext::new(args.token, args.token_expires_at);
    if session.is_expired() {
        bail!(SESSION_EXPIRED);
    }
    let mut watch = session.watch(CHECK_INTERVAL);

    let message = match args.message {
        Some(message) => message,
        None => {
            if std::io::stdin().is_terminal() {
                console.write(|out| writeln!(out, "Enter the secret message, then press Ctrl-D:"));
            }
            tokio::select! {
                read = input::read_stdin() => SecretString::from(read?),
                () = watch.expired() => bail!(SESSION_EXPIRED),
            }
        }
    };
    session.touch_activity();

    let text = message.expose_secret().trim_end_matches(['\r', '\n']);
    if text.trim().is_empty() {
        console.notice(&Notice::error("Error", "Please enter a message"));
        bail!("secret message must not be empty");
    }

    let request = CreateSecretRequest {
        message: text.to_string(),
        passphrase: args
            .passphrase
            .as_ref()
            .map(|passphrase| passphrase.expose_secret().to_string()),
        expiry_minutes: args.expiry_minutes,
        destruction_animation: args.animation,
    };

    let created = match client.create_secret(session.token(), &request).await {
        Ok(created) => created,
        Err(ApiError::Unauthorized) => bail!(SESSION_EXPIRED),
        Err(err) => return Err(err.into()),
    };
    drop(watch);
    info!(expiry_minutes = args.expiry_minutes, "secret created");

    let link = args.api.share_link(&created.id);
    println!("{link}");

    let expiry = created.expires_at.map_or_else(
        || format!("It expires in {} minutes if nobody views it.", args.expiry_minutes),
        |at| format!("It expires at {} if nobody views it.", at.to_rfc3339()),
    );
    console.notice(&Notice::success("Secret created", expiry));

    if args.copy {
        match SystemClipboard::default().copy(&link).await {
            Ok(()) => console.notice(&Notice::success("Copied", "Link copied to clipboard")),
            Err(err) => console.notice(&Notice::error("Failed to copy link", err.to_string())),
        }
    }

    Ok(())
}
