//! Cleanup after a scenario.

use forge_api::ForgeApi;

use crate::error::Result;
use crate::scratch::delete_file;
use crate::state::ScenarioState;

/// Delete the local scratch file and the remote repository of a scenario.
///
/// The scratch file is optional: a scenario that failed before committing
/// never created one. The repository is not: tearing down a scenario that
/// created none is reported as [`crate::FlowError::MissingState`]. Local
/// cleanup runs before the remote result is reported so a failing delete
/// does not leave the file behind.
pub async fn teardown(api: &ForgeApi, state: &ScenarioState) -> Result<()> {
    let local = state
        .scratch
        .as_ref()
        .map(|scratch| delete_file(&scratch.path))
        .transpose();

    let repo = match state.repository() {
        Ok(repo) => repo,
        Err(e) => {
            if let Err(local) = local {
                tracing::warn!(error = %local, "Scratch file cleanup failed");
            }
            return Err(e);
        }
    };
    api.delete_repository(&repo.owner, &repo.name).await?;
    tracing::info!(owner = %repo.owner, repo = %repo.name, "Repository deleted");

    local.map(|_| ())
}
