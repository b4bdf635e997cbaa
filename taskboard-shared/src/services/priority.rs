/// Priority renumbering
///
/// Keeps priorities unique among a user's active tasks. When a task is saved
/// with priority `P` and other active tasks already occupy `P`, `P + 1`, ...
/// as a contiguous run, every task in that run moves up by one so `P` is free
/// for the task being saved. The run ends at the first gap; tasks above it
/// keep their priority.
///
/// ```text
/// before:  A=1  B=2  C=3  D=5        save X with priority 1
/// after:   A=2  B=3  C=4  D=5  X=1
/// ```
///
/// The colliding rows are locked with `SELECT ... FOR UPDATE` in the caller's
/// transaction, so two concurrent saves for the same user serialize.

use sqlx::PgConnection;
use tracing::debug;
use uuid::Uuid;

/// Renumbering errors
#[derive(Debug, thiserror::Error)]
pub enum RenumberError {
    /// The colliding run already reaches the largest priority
    #[error("No room to shift tasks above priority {0}")]
    Overflow(i32),

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Picks the tasks that must move up by one to free `start`
///
/// `rows` are `(task_id, priority)` pairs sorted by ascending priority, all
/// with priority >= `start`. Returns the IDs of the contiguous run beginning
/// at `start`, in order.
///
/// # Errors
///
/// [`RenumberError::Overflow`] when the run ends at `i32::MAX`.
pub fn plan_priority_shift(start: i32, rows: &[(Uuid, i32)]) -> Result<Vec<Uuid>, RenumberError> {
    let mut expected = start;
    let mut shifted = Vec::new();

    for &(id, priority) in rows {
        if priority != expected {
            break;
        }
        if priority == i32::MAX {
            return Err(RenumberError::Overflow(start));
        }
        shifted.push(id);
        expected += 1;
    }

    Ok(shifted)
}

/// Frees `priority` for a task being saved by one of the user's writes
///
/// Must be called inside the transaction that saves the task. `exclude` is the
/// task being saved (None on create). Returns the number of tasks moved.
pub async fn renumber_priorities(
    conn: &mut PgConnection,
    user_id: Uuid,
    priority: i32,
    exclude: Option<Uuid>,
) -> Result<usize, RenumberError> {
    let rows: Vec<(Uuid, i32)> = sqlx::query_as(
        r#"
        SELECT id, priority
        FROM tasks
        WHERE user_id = $1
          AND deleted = FALSE
          AND completed = FALSE
          AND priority >= $2
          AND ($3::uuid IS NULL OR id <> $3)
        ORDER BY priority ASC
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .bind(priority)
    .bind(exclude)
    .fetch_all(&mut *conn)
    .await?;

    let shifted = plan_priority_shift(priority, &rows)?;
    if shifted.is_empty() {
        return Ok(0);
    }

    sqlx::query(
        r#"
        UPDATE tasks
        SET priority = priority + 1,
            updated_at = NOW()
        WHERE id = ANY($1)
        "#,
    )
    .bind(&shifted[..])
    .execute(&mut *conn)
    .await?;

    debug!(
        user_id = %user_id,
        priority = priority,
        shifted = shifted.len(),
        "Renumbered colliding task priorities"
    );

    Ok(shifted.len())
}
