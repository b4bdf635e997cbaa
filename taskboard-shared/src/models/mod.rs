/// Database models for Taskboard
///
/// Each model owns its SQL. Multi-step writes (renumbering, history capture,
/// signup) take a `&mut PgConnection` so callers can run them inside one
/// transaction.
///
/// # Models
///
/// - `user`: Accounts and session generations
/// - `task`: Tasks with priority, status and soft delete
/// - `history`: Append-only status transitions
/// - `email_settings`: Digest schedule per user
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{Task, TaskView};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let first_page = Task::list_for_user(&pool, user_id, TaskView::Pending, 4, 0).await?;
/// let total = Task::count_for_user(&pool, user_id, TaskView::All).await?;
/// # Ok(())
/// # }
/// ```

pub mod email_settings;
pub mod history;
pub mod task;
pub mod user;
