//! Destruction animation kinds and the trigger seam the controller plays them
//! through. Animations are cosmetic: the controller never waits on them, it
//! holds the `animating` phase for a fixed delay and drops the guard.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};
use tokio::task::JoinHandle;

/// How long the `animating` phase is held before redirecting.
pub const ANIMATION_HOLD: Duration = Duration::from_millis(3000);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum DestructionAnimation {
    #[default]
    None,
    Fire,
    Explode,
}

impl DestructionAnimation {
    pub const ALL: [Self; 3] = [Self::None, Self::Fire, Self::Explode];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fire => "fire",
            Self::Explode => "explode",
        }
    }

    /// The kind actually played once animations may be switched off globally.
    #[must_use]
    pub const fn effective(self, animations_enabled: bool) -> Self {
        if animations_enabled { self } else { Self::None }
    }
}

// Backends may send tags this client has no renderer for (`shred`) or `null`;
// both play as no animation.
impl From<Option<String>> for DestructionAnimation {
    fn from(value: Option<String>) -> Self {
        value
            .as_deref()
            .and_then(|tag| tag.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for DestructionAnimation {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "fire" => Ok(Self::Fire),
            "explode" => Ok(Self::Explode),
            other => Err(format!(
                "unknown destruction animation `{other}` (expected none, fire or explode)"
            )),
        }
    }
}

impl fmt::Display for DestructionAnimation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs a timed visual sequence for an animation kind.
pub trait AnimationTrigger: Send + Sync + 'static {
    /// Starts the sequence; dropping the returned guard stops it.
    fn play(&self, kind: DestructionAnimation) -> AnimationGuard;
}

/// Owns a running animation; aborting happens on drop.
#[derive(Debug, Default)]
pub struct AnimationGuard {
    task: Option<JoinHandle<()>>,
}

impl AnimationGuard {
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_task(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }
}

impl Drop for AnimationGuard {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
