use super::auth::with_token_args;
use crate::viewer::DestructionAnimation;
use anyhow::bail;
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const CMD_CREATE: &str = "create";

pub const ARG_MESSAGE: &str = "message";
pub const ARG_PASSPHRASE: &str = "passphrase";
pub const ARG_EXPIRY_MINUTES: &str = "expiry-minutes";
pub const ARG_MAX_EXPIRY_MINUTES: &str = "max-expiry-minutes";
pub const ARG_ANIMATION: &str = "animation";
pub const ARG_COPY: &str = "copy";

#[must_use]
pub fn command() -> Command {
    let command = Command::new(CMD_CREATE)
        .about("Create a self-destructing secret and print its link")
        .arg(
            Arg::new(ARG_MESSAGE)
                .short('m')
                .long("message")
                .help("Secret message; read from stdin when omitted"),
        )
        .arg(
            Arg::new(ARG_PASSPHRASE)
                .long("passphrase")
                .help("Require this passphrase to view the secret"),
        )
        .arg(
            Arg::new(ARG_EXPIRY_MINUTES)
                .short('e')
                .long("expiry-minutes")
                .help("Minutes until the secret expires unviewed")
                .env("BURNLINK_DEFAULT_EXPIRY_MINUTES")
                .default_value("10")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_MAX_EXPIRY_MINUTES)
                .long("max-expiry-minutes")
                .help("Largest accepted expiry in minutes")
                .env("BURNLINK_MAX_EXPIRY_MINUTES")
                .default_value("10080")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_ANIMATION)
                .short('a')
                .long("animation")
                .help("Animation played when the secret burns")
                .value_parser(DestructionAnimation::ALL.map(DestructionAnimation::as_str))
                .default_value("none"),
        )
        .arg(
            Arg::new(ARG_COPY)
                .long("copy")
                .help("Copy the link to the clipboard")
                .action(ArgAction::SetTrue),
        );
    with_token_args(command)
}

pub struct Options {
    pub message: Option<SecretString>,
    pub passphrase: Option<SecretString>,
    pub expiry_minutes: u32,
    pub animation: DestructionAnimation,
    pub copy: bool,
}

impl Options {
    /// Parse create arguments from subcommand matches.
    ///
    /// # Errors
    /// Returns an error if the expiry is outside `1..=max` or the animation is unknown.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let max = matches
            .get_one::<u32>(ARG_MAX_EXPIRY_MINUTES)
            .copied()
            .unwrap_or(10_080);
        let expiry_minutes = matches
            .get_one::<u32>(ARG_EXPIRY_MINUTES)
            .copied()
            .unwrap_or(10);
        if expiry_minutes == 0 || expiry_minutes > max {
            bail!("--{ARG_EXPIRY_MINUTES} must be between 1 and {max} minutes");
        }

        let animation = match matches.get_one::<String>(ARG_ANIMATION) {
            Some(value) => value
                .parse::<DestructionAnimation>()
                .map_err(|err: String| anyhow::anyhow!(err))?,
            None => DestructionAnimation::None,
        };

        let get_secret = |id: &str| {
            matches
                .get_one::<String>(id)
                .filter(|value| !value.is_empty())
                .cloned()
                .map(SecretString::from)
        };

        Ok(Self {
            message: get_secret(ARG_MESSAGE),
            passphrase: get_secret(ARG_PASSPHRASE),
            expiry_minutes,
            animation,
            copy: matches.get_flag(ARG_COPY),
        })
    }
}
