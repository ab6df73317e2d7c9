//! Maps parsed CLI arguments to the [`Action`] the binary executes.

use crate::cli::actions::{Action, create, login, logout, view};
use crate::cli::commands::{self, api, auth};
use anyhow::{Result, bail};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let api = api::Options::parse(matches)?;

    match matches.subcommand() {
        Some((auth::CMD_LOGIN, sub)) => {
            let options = auth::LoginOptions::parse(sub)?;
            Ok(Action::Login(login::Args {
                api,
                email: options.email,
                otp: options.otp,
            }))
        }
        Some((auth::CMD_LOGOUT, sub)) => {
            let token = auth::TokenOptions::parse(sub)?;
            Ok(Action::Logout(logout::Args {
                api,
                token: token.token,
            }))
        }
        Some((commands::create::CMD_CREATE, sub)) => {
            let token = auth::TokenOptions::parse(sub)?;
            let options = commands::create::Options::parse(sub)?;
            Ok(Action::Create(create::Args {
                api,
                token: token.token,
                token_expires_at: token.expires_at,
                message: options.message,
                passphrase: options.passphrase,
                expiry_minutes: options.expiry_minutes,
                animation: options.animation,
                copy: options.copy,
            }))
        }
        Some((commands::view::CMD_VIEW, sub)) => {
            let options = commands::view::Options::parse(sub)?;
            Ok(Action::View(view::Args {
                api,
                id: options.id,
                passphrase: options.passphrase,
                copy: options.copy,
                config: options.config,
            }))
        }
        Some((name, _)) => bail!("unknown command: {name}"),
        None => bail!("missing command"),
    }
}
