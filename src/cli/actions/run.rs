use crate::cli::actions::{Action, create, login, logout, view};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => login::execute(args).await,
        Action::Logout(args) => logout::execute(args).await,
        Action::Create(args) => create::execute(args).await,
        Action::View(args) => view::execute(args).await,
    }
}
