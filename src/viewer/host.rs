//! Collaborators the view controller consumes: the retrieval source, and the
//! host UI's navigation and notification primitives.

use super::DestructionAnimation;
use secrecy::SecretString;
use std::future::Future;

/// A secret the backend released to this client.
#[derive(Debug)]
pub struct RevealedSecret {
    pub message: SecretString,
    pub animation: DestructionAnimation,
}

/// Outcome of one retrieval call.
#[derive(Debug)]
pub enum Retrieval {
    Revealed(RevealedSecret),
    PassphraseRequired,
    Failure(String),
}

/// Retrieves a secret by id. An empty passphrase is a discovery probe.
pub trait SecretSource: Send + Sync + 'static {
    fn retrieve(
        &self,
        id: &str,
        passphrase: &SecretString,
    ) -> impl Future<Output = Retrieval> + Send;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Secret creation, `/`.
    Create,
    Login,
}

impl Route {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Create => "/",
            Self::Login => "/login",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient user-facing message, outside the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, description)
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, description)
    }

    fn new(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Navigation and notification primitives provided by the host UI.
pub trait ViewHost: Send + Sync + 'static {
    fn notify(&self, notice: Notice);

    fn navigate(&self, route: Route);

    /// Called once when the burn countdown elapses.
    fn burn_started(&self) {}
}
