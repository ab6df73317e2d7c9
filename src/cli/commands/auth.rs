use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";

pub const ARG_EMAIL: &str = "email";
pub const ARG_OTP: &str = "otp";
pub const ARG_TOKEN: &str = "token";
pub const ARG_TOKEN_EXPIRES_AT: &str = "token-expires-at";

#[must_use]
pub fn login_command() -> Command {
    Command::new(CMD_LOGIN)
        .about("Request a one-time code by email and exchange it for an API token")
        .arg(
            Arg::new(ARG_EMAIL)
                .help("Email address to log in with")
                .env("BURNLINK_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_OTP)
                .long("otp")
                .help("One-time code; prompted for on stdin when omitted"),
        )
}

#[must_use]
pub fn logout_command() -> Command {
    with_token_args(Command::new(CMD_LOGOUT).about("Revoke an API token"))
}

/// Adds the token arguments used by authenticated subcommands.
#[must_use]
pub fn with_token_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN)
                .long("token")
                .help("API token returned by `burnlink login`")
                .env("BURNLINK_TOKEN")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_EXPIRES_AT)
                .long("token-expires-at")
                .help("Token expiry as an RFC 3339 timestamp, as printed by `burnlink login`")
                .env("BURNLINK_TOKEN_EXPIRES_AT"),
        )
}

pub struct LoginOptions {
    pub email: String,
    pub otp: Option<SecretString>,
}

impl LoginOptions {
    /// Parse login arguments from subcommand matches.
    ///
    /// # Errors
    /// Returns an error if the email is empty or malformed.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let email = matches
            .get_one::<String>(ARG_EMAIL)
            .map(|value| value.trim().to_string())
            .unwrap_or_default();
        if email.is_empty() {
            bail!("missing required argument: <{ARG_EMAIL}>");
        }
        if !email.contains('@') {
            bail!("invalid email address: {email}");
        }

        let otp = matches
            .get_one::<String>(ARG_OTP)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(SecretString::from);

        Ok(Self { email, otp })
    }
}

pub struct TokenOptions {
    pub token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenOptions {
    /// Parse token arguments from subcommand matches.
    ///
    /// # Errors
    /// Returns an error if the token is empty or the expiry is not RFC 3339.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let token = matches
            .get_one::<String>(ARG_TOKEN)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .context("missing required argument: --token (or BURNLINK_TOKEN)")?;

        let expires_at = matches
            .get_one::<String>(ARG_TOKEN_EXPIRES_AT)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(|value| {
                DateTime::parse_from_rfc3339(value)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .with_context(|| format!("invalid --{ARG_TOKEN_EXPIRES_AT}: {value}"))
            })
            .transpose()?;

        Ok(Self {
            token: SecretString::from(token),
            expires_at,
        })
    }
}
