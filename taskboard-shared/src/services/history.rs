/// Status history capture
///
/// Called by the task update use case after it has locked the stored row and
/// before it writes the new state.

use crate::models::history::History;
use crate::models::task::{Task, TaskStatus};
use sqlx::PgConnection;
use tracing::debug;

/// Records a transition if the incoming status differs from the stored one
///
/// Returns the new history row, or None when the status is unchanged.
pub async fn capture_status_change(
    conn: &mut PgConnection,
    stored: &Task,
    incoming: TaskStatus,
) -> Result<Option<History>, sqlx::Error> {
    if stored.status == incoming {
        return Ok(None);
    }

    let entry = History::record(conn, stored.id, stored.status, incoming).await?;

    debug!(
        task_id = %stored.id,
        prev_status = %stored.status,
        updated_status = %incoming,
        "Recorded task status change"
    );

    Ok(Some(entry))
}
