//! Content-plan store operations.
//!
//! The content plan is a JSON array of tasks kept in the site repository.
//! Reads return the revision alongside the tasks; status write-backs are
//! conditioned on that revision.

use tracing::debug;

use contentpilot_shared::{ContentPilotError, ContentTask, Result, Revision};

use crate::GithubClient;

/// Commit message for plan status write-backs.
const PLAN_COMMIT_MESSAGE: &str = "chore: Update content plan status";

/// Fetch and parse the content plan.
///
/// Returns the task list and the revision to pass to [`write_plan`] when
/// persisting status changes.
pub async fn fetch_plan(
    client: &GithubClient,
    plan_path: &str,
) -> Result<(Vec<ContentTask>, Revision)> {
    let file = client.get_file(plan_path).await?;
    let tasks: Vec<ContentTask> = serde_json::from_str(&file.text).map_err(|e| {
        ContentPilotError::parse(format!("{plan_path}: invalid content plan JSON: {e}"))
    })?;
    debug!(tasks = tasks.len(), revision = %file.revision, "content plan loaded");
    Ok((tasks, file.revision))
}

/// Persist the full task list, conditioned on the revision read earlier.
pub async fn write_plan(
    client: &GithubClient,
    plan_path: &str,
    tasks: &[ContentTask],
    revision: &Revision,
) -> Result<()> {
    let text = serde_json::to_string_pretty(tasks)
        .map_err(|e| ContentPilotError::parse(format!("failed to serialize content plan: {e}")))?;
    client
        .put_file(plan_path, &text, PLAN_COMMIT_MESSAGE, Some(revision))
        .await
}
