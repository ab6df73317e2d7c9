pub mod api;
pub mod auth;
pub mod create;
pub mod logging;
pub mod view;

use clap::{
    ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("burnlink")
        .about("Share self-destructing secrets")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(auth::login_command())
        .subcommand(auth::logout_command())
        .subcommand(create::command())
        .subcommand(view::command());

    let command = api::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::DestructionAnimation;
    use secrecy::ExposeSecret;
    use std::time::Duration;

    const ENV_VARS: [&str; 12] = [
        "BURNLINK_API_URL",
        "BURNLINK_LINK_BASE",
        "BURNLINK_TIMEOUT_SECONDS",
        "BURNLINK_TOKEN",
        "BURNLINK_TOKEN_EXPIRES_AT",
        "BURNLINK_BURN_MS",
        "BURNLINK_ANIMATION_MS",
        "BURNLINK_ANIMATIONS",
        "BURNLINK_DEFAULT_EXPIRY_MINUTES",
        "BURNLINK_MAX_EXPIRY_MINUTES",
        "BURNLINK_LOG_LEVEL",
        "BURNLINK_LOG_FORMAT",
    ];

    // Helper to run with a clean BURNLINK_* environment
    fn with_clean_env<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        temp_env::with_vars(ENV_VARS.map(|name| (name, None::<&str>)), f)
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "burnlink");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Share self-destructing secrets".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_api_defaults() -> anyhow::Result<()> {
        with_clean_env(|| {
            let matches = new().try_get_matches_from(["burnlink", "view", "abc123"])?;
            let options = api::Options::parse(&matches)?;
            assert_eq!(options.client.api_base_url, "http://localhost:8000/api");
            assert_eq!(options.client.timeout, Duration::from_secs(10));
            assert_eq!(
                options.share_link("abc123"),
                "http://localhost:5173/secrets/abc123"
            );
            Ok(())
        })
    }

    #[test]
    fn test_check_env() -> anyhow::Result<()> {
        temp_env::with_vars(
            [
                ("BURNLINK_API_URL", Some("https://burn.example/api")),
                ("BURNLINK_LINK_BASE", Some("https://burn.example/")),
                ("BURNLINK_TIMEOUT_SECONDS", Some("3")),
                ("BURNLINK_BURN_MS", Some("1000")),
                ("BURNLINK_ANIMATION_MS", Some("250")),
                ("BURNLINK_ANIMATIONS", Some("false")),
                ("BURNLINK_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().try_get_matches_from(["burnlink", "view", "abc123"])?;
                let options = api::Options::parse(&matches)?;
                assert_eq!(options.client.api_base_url, "https://burn.example/api");
                assert_eq!(options.client.timeout, Duration::from_secs(3));
                assert_eq!(
                    options.share_link("abc123"),
                    "https://burn.example/secrets/abc123"
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );

                let Some((_, view_matches)) = matches.subcommand() else {
                    anyhow::bail!("expected a subcommand");
                };
                let view = view::Options::parse(view_matches)?;
                assert_eq!(view.config.burn_after, Duration::from_millis(1000));
                assert_eq!(view.config.animation_hold, Duration::from_millis(250));
                assert!(!view.config.animations_enabled);
                Ok(())
            },
        )
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("BURNLINK_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["burnlink", "view", "abc123"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("BURNLINK_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["burnlink".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }
                args.push("view".to_string());
                args.push("abc123".to_string());

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_log_format_json() {
        with_clean_env(|| {
            let matches = new().get_matches_from(["burnlink", "view", "abc123"]);
            assert!(!logging::is_json(&matches));

            let matches =
                new().get_matches_from(["burnlink", "--log-format", "json", "view", "abc123"]);
            assert!(logging::is_json(&matches));
        });
    }

    #[test]
    fn test_subcommand_required() {
        let result = new().try_get_matches_from(["burnlink"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_options() -> anyhow::Result<()> {
        with_clean_env(|| {
            let matches = new().try_get_matches_from([
                "burnlink",
                "create",
                "--token",
                "tkn",
                "--message",
                "hello",
                "--passphrase",
                "pw",
                "--expiry-minutes",
                "60",
                "--animation",
                "explode",
                "--copy",
            ])?;
            let Some((name, sub)) = matches.subcommand() else {
                anyhow::bail!("expected a subcommand");
            };
            assert_eq!(name, create::CMD_CREATE);

            let options = create::Options::parse(sub)?;
            assert_eq!(
                options.message.as_ref().map(|m| m.expose_secret().to_string()),
                Some("hello".to_string())
            );
            assert_eq!(
                options.passphrase.as_ref().map(|p| p.expose_secret().to_string()),
                Some("pw".to_string())
            );
            assert_eq!(options.expiry_minutes, 60);
            assert_eq!(options.animation, DestructionAnimation::Explode);
            assert!(options.copy);

            let token = auth::TokenOptions::parse(sub)?;
            assert_eq!(token.token.expose_secret(), "tkn");
            assert!(token.expires_at.is_none());
            Ok(())
        })
    }

    #[test]
    fn test_create_expiry_bounds() -> anyhow::Result<()> {
        with_clean_env(|| {
            for expiry in ["0", "10081"] {
                let matches = new().try_get_matches_from([
                    "burnlink",
                    "create",
                    "--token",
                    "tkn",
                    "--expiry-minutes",
                    expiry,
                ])?;
                let Some((_, sub)) = matches.subcommand() else {
                    anyhow::bail!("expected a subcommand");
                };
                assert!(create::Options::parse(sub).is_err(), "{expiry} should be rejected");
            }

            let matches = new().try_get_matches_from([
                "burnlink",
                "create",
                "--token",
                "tkn",
                "--max-expiry-minutes",
                "60",
                "--expiry-minutes",
                "60",
            ])?;
            let Some((_, sub)) = matches.subcommand() else {
                anyhow::bail!("expected a subcommand");
            };
            assert_eq!(create::Options::parse(sub)?.expiry_minutes, 60);
            Ok(())
        })
    }

    #[test]
    fn test_create_rejects_unknown_animation() {
        with_clean_env(|| {
            let result = new().try_get_matches_from([
                "burnlink",
                "create",
                "--token",
                "tkn",
                "--animation",
                "confetti",
            ]);
            assert_eq!(
                result.map(|_| ()).map_err(|e| e.kind()),
                Err(clap::error::ErrorKind::InvalidValue)
            );
        });
    }

    #[test]
    fn test_token_required_for_create() {
        with_clean_env(|| {
            let result = new().try_get_matches_from(["burnlink", "create", "--message", "x"]);
            assert_eq!(
                result.map(|_| ()).map_err(|e| e.kind()),
                Err(clap::error::ErrorKind::MissingRequiredArgument)
            );
        });
    }

    #[test]
    fn test_token_expiry_is_parsed() -> anyhow::Result<()> {
        with_clean_env(|| {
            let matches = new().try_get_matches_from([
                "burnlink",
                "logout",
                "--token",
                "tkn",
                "--token-expires-at",
                "2026-10-20T10:00:00+02:00",
            ])?;
            let Some((_, sub)) = matches.subcommand() else {
                anyhow::bail!("expected a subcommand");
            };
            let token = auth::TokenOptions::parse(sub)?;
            assert_eq!(
                token.expires_at.map(|at| at.to_rfc3339()),
                Some("2026-10-20T08:00:00+00:00".to_string())
            );

            let matches = new().try_get_matches_from([
                "burnlink",
                "logout",
                "--token",
                "tkn",
                "--token-expires-at",
                "tomorrow",
            ])?;
            let Some((_, sub)) = matches.subcommand() else {
                anyhow::bail!("expected a subcommand");
            };
            assert!(auth::TokenOptions::parse(sub).is_err());
            Ok(())
        })
    }

    #[test]
    fn test_login_options() -> anyhow::Result<()> {
        temp_env::with_var("BURNLINK_EMAIL", None::<&str>, || {
            let matches =
                new().try_get_matches_from(["burnlink", "login", " alice@example.com ", "--otp", "123456"])?;
            let Some((_, sub)) = matches.subcommand() else {
                anyhow::bail!("expected a subcommand");
            };
            let login = auth::LoginOptions::parse(sub)?;
            assert_eq!(login.email, "alice@example.com");
            assert_eq!(
                login.otp.as_ref().map(|otp| otp.expose_secret().to_string()),
                Some("123456".to_string())
            );

            let matches = new().try_get_matches_from(["burnlink", "login", "alice"])?;
            let Some((_, sub)) = matches.subcommand() else {
                anyhow::bail!("expected a subcommand");
            };
            assert!(auth::LoginOptions::parse(sub).is_err());
            Ok(())
        })
    }

    #[test]
    fn test_secret_id_from_link_or_id() -> anyhow::Result<()> {
        assert_eq!(view::secret_id("abc123")?, "abc123");
        assert_eq!(view::secret_id("  abc123 ")?, "abc123");
        assert_eq!(
            view::secret_id("http://localhost:5173/secrets/abc123")?,
            "abc123"
        );
        assert_eq!(
            view::secret_id("https://burn.example/app/secrets/xyz789/")?,
            "xyz789"
        );
        assert_eq!(
            view::secret_id("https://burn.example/secrets/a%20b")?,
            "a b"
        );
        assert!(view::secret_id("https://burn.example/secrets/%FF").is_err());
        assert!(view::secret_id("").is_err());
        assert!(view::secret_id("https://burn.example/login").is_err());
        assert!(view::secret_id("a/b").is_err());
        Ok(())
    }

    #[test]
    fn test_view_passphrase_and_copy() -> anyhow::Result<()> {
        with_clean_env(|| {
            let matches = new().try_get_matches_from([
                "burnlink",
                "view",
                "xyz789",
                "--passphrase",
                "secret42",
                "--copy",
            ])?;
            let Some((_, sub)) = matches.subcommand() else {
                anyhow::bail!("expected a subcommand");
            };
            let view = view::Options::parse(sub)?;
            assert_eq!(view.id, "xyz789");
            assert_eq!(
                view.passphrase.as_ref().map(|p| p.expose_secret().to_string()),
                Some("secret42".to_string())
            );
            assert!(view.copy);
            assert_eq!(view.config.burn_after, Duration::from_millis(5000));
            assert!(view.config.animations_enabled);
            Ok(())
        })
    }
}
