//! Client-side lifecycle for viewing a one-time secret: passphrase probe,
//! retrieval, burn countdown, destruction animation, then redirect.

pub mod animation;
pub mod controller;
pub mod countdown;
pub mod gate;
pub mod host;

pub use animation::{AnimationGuard, AnimationTrigger, DestructionAnimation};
pub use controller::{Phase, ViewClosed, ViewConfig, ViewController, ViewExit, ViewHandle, ViewSnapshot};
pub use countdown::{CompletionCell, Countdown, CountdownHandle, progress_at};
pub use gate::LiveGate;
pub use host::{Notice, NoticeLevel, Retrieval, RevealedSecret, Route, SecretSource, ViewHost};
