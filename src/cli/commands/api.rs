use crate::api::{ClientConfig, DEFAULT_API_URL};
use anyhow::bail;
use clap::{Arg, ArgMatches, Command};
use std::time::Duration;

pub const ARG_API_URL: &str = "api-url";
pub const ARG_LINK_BASE: &str = "link-base";
pub const ARG_TIMEOUT_SECONDS: &str = "timeout-seconds";

pub const DEFAULT_LINK_BASE: &str = "http://localhost:5173";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Secret service API base URL")
                .env("BURNLINK_API_URL")
                .global(true)
                .default_value(DEFAULT_API_URL),
        )
        .arg(
            Arg::new(ARG_LINK_BASE)
                .long("link-base")
                .help("Base URL used to build shareable links: <base>/secrets/<id>")
                .env("BURNLINK_LINK_BASE")
                .global(true)
                .default_value(DEFAULT_LINK_BASE),
        )
        .arg(
            Arg::new(ARG_TIMEOUT_SECONDS)
                .long("timeout-seconds")
                .help("HTTP request timeout in seconds")
                .env("BURNLINK_TIMEOUT_SECONDS")
                .global(true)
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

#[derive(Clone, Debug)]
pub struct Options {
    pub client: ClientConfig,
    pub link_base: String,
}

impl Options {
    /// Parse API arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the API URL or link base is empty.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let Some(api_base_url) = get_non_empty(ARG_API_URL) else {
            bail!("missing required argument: --{ARG_API_URL}");
        };
        let Some(link_base) = get_non_empty(ARG_LINK_BASE) else {
            bail!("missing required argument: --{ARG_LINK_BASE}");
        };
        let timeout = matches
            .get_one::<u64>(ARG_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(10);

        Ok(Self {
            client: ClientConfig {
                api_base_url,
                timeout: Duration::from_secs(timeout),
            },
            link_base: link_base.trim_end_matches('/').to_string(),
        })
    }

    /// Shareable link for a secret id.
    #[must_use]
    pub fn share_link(&self, id: &str) -> String {
        format!("{}/secrets/{id}", self.link_base)
    }
}
