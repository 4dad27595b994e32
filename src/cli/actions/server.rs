use crate::api;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;

/// Handle the server action
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let Action::Server { port, dsn } = action;

    api::new(port, dsn, globals).await
}
