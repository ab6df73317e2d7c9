use crate::viewer::ViewConfig;
use anyhow::{Context, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use percent_encoding::percent_decode_str;
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

pub const CMD_VIEW: &str = "view";

pub const ARG_SECRET: &str = "secret";
pub const ARG_PASSPHRASE: &str = "passphrase";
pub const ARG_COPY: &str = "copy";
pub const ARG_BURN_MS: &str = "burn-ms";
pub const ARG_ANIMATION_MS: &str = "animation-ms";
pub const ARG_ANIMATIONS: &str = "animations";

#[must_use]
pub fn command() -> Command {
    Command::new(CMD_VIEW)
        .about("View a secret once; it burns after a short countdown")
        .arg(
            Arg::new(ARG_SECRET)
                .help("Secret id or a full link such as https://host/secrets/<id>")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSPHRASE)
                .long("passphrase")
                .help("Passphrase to try first if the secret is protected"),
        )
        .arg(
            Arg::new(ARG_COPY)
                .long("copy")
                .help("Copy the message to the clipboard once revealed")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_BURN_MS)
                .long("burn-ms")
                .help("Countdown in milliseconds between reveal and burn")
                .env("BURNLINK_BURN_MS")
                .default_value("5000")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_ANIMATION_MS)
                .long("animation-ms")
                .help("How long the destruction animation plays, in milliseconds")
                .env("BURNLINK_ANIMATION_MS")
                .default_value("3000")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_ANIMATIONS)
                .long("animations")
                .help("Play destruction animations (true/false)")
                .env("BURNLINK_ANIMATIONS")
                .default_value("true")
                .value_parser(clap::value_parser!(bool)),
        )
}

pub struct Options {
    pub id: String,
    pub passphrase: Option<SecretString>,
    pub copy: bool,
    pub config: ViewConfig,
}

impl Options {
    /// Parse view arguments from subcommand matches.
    ///
    /// # Errors
    /// Returns an error if no secret id can be extracted.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let raw = matches
            .get_one::<String>(ARG_SECRET)
            .context("missing required argument: <secret>")?;
        let id = secret_id(raw)?;

        let millis = |id: &str, default: u64| {
            Duration::from_millis(matches.get_one::<u64>(id).copied().unwrap_or(default))
        };

        let config = ViewConfig {
            burn_after: millis(ARG_BURN_MS, 5000),
            animation_hold: millis(ARG_ANIMATION_MS, 3000),
            animations_enabled: matches
                .get_one::<bool>(ARG_ANIMATIONS)
                .copied()
                .unwrap_or(true),
            ..ViewConfig::default()
        };

        Ok(Self {
            id,
            passphrase: matches
                .get_one::<String>(ARG_PASSPHRASE)
                .cloned()
                .map(SecretString::from),
            copy: matches.get_flag(ARG_COPY),
            config,
        })
    }
}

/// Extracts the secret id from a bare id or a `/secrets/<id>` link. Ids taken
/// from a link are percent-decoded.
///
/// # Errors
/// Returns an error if the input is empty, a link without a secret id, or an id
/// that does not decode to UTF-8.
pub fn secret_id(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("secret id must not be empty");
    }

    let Ok(url) = Url::parse(raw) else {
        if raw.contains('/') {
            bail!("invalid secret id: {raw}");
        }
        return Ok(raw.to_string());
    };

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default();
    match segments.as_slice() {
        [.., "secrets", id] => {
            let id = percent_decode_str(id)
                .decode_utf8()
                .with_context(|| format!("invalid secret id in link: {raw}"))?;
            Ok(id.into_owned())
        }
        _ => bail!("link does not point to a secret: {raw}"),
    }
}
