/// Task model and database operations
///
/// A task belongs to exactly one user. Tasks are never physically removed by
/// the application: deleting sets the `deleted` flag, and every query in this
/// module that backs a user-facing list or count filters soft-deleted rows
/// out.
///
/// An *active* task is one that is neither deleted nor completed. Among a
/// user's active tasks priorities are kept unique by the renumbering step in
/// [`crate::services::priority`].
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('PENDING', 'IN_PROGRESS', 'COMPLETED', 'CANCELLED');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(100) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     priority INTEGER NOT NULL,
///     status task_status NOT NULL DEFAULT 'PENDING',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT priority_gt_0 CHECK (priority > 0)
/// );
/// ```
///
/// Writes that must renumber priorities or capture history go through
/// [`crate::services::task_service`]; this module only holds the SQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub(crate) const TASK_COLUMNS: &str = "id, user_id, title, description, completed, deleted, \
                                       priority, status, created_at, updated_at";

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Pending,

    /// Being worked on
    InProgress,

    /// Done (independent of the `completed` flag)
    Completed,

    /// Abandoned
    Cancelled,
}

impl TaskStatus {
    /// Every status, in the order reports list them
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    /// Database / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Task owned by a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Short title (5 to 100 characters, capitalized)
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Completion flag
    pub completed: bool,

    /// Soft-delete flag
    pub deleted: bool,

    /// Positive priority, lower comes first
    pub priority: i32,

    /// Workflow status
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last saved
    pub updated_at: DateTime<Utc>,
}

/// The writable fields of a task
///
/// Used both for creation and as the fully-resolved state of an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Priority
    pub priority: i32,

    /// Completion flag
    pub completed: bool,

    /// Status
    pub status: TaskStatus,
}

/// Partial update of a task
///
/// `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChanges {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New priority
    pub priority: Option<i32>,

    /// New completion flag
    pub completed: Option<bool>,

    /// New status
    pub status: Option<TaskStatus>,
}

impl TaskChanges {
    /// Resolves the changes against the stored task
    pub fn apply_to(self, task: &Task) -> TaskFields {
        TaskFields {
            title: self.title.unwrap_or_else(|| task.title.clone()),
            description: self.description.unwrap_or_else(|| task.description.clone()),
            priority: self.priority.unwrap_or(task.priority),
            completed: self.completed.unwrap_or(task.completed),
            status: self.status.unwrap_or(task.status),
        }
    }
}

impl From<TaskFields> for TaskChanges {
    fn from(fields: TaskFields) -> Self {
        TaskChanges {
            title: Some(fields.title),
            description: Some(fields.description),
            priority: Some(fields.priority),
            completed: Some(fields.completed),
            status: Some(fields.status),
        }
    }
}

/// Which slice of a user's tasks a list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskView {
    /// Active tasks (not deleted, not completed)
    Pending,

    /// Every non-deleted task
    All,

    /// Non-deleted completed tasks
    Completed,
}

impl TaskView {
    fn predicate(&self) -> &'static str {
        match self {
            TaskView::Pending => "deleted = FALSE AND completed = FALSE",
            TaskView::All => "deleted = FALSE",
            TaskView::Completed => "deleted = FALSE AND completed = TRUE",
        }
    }
}

/// Filters accepted by the versioned task API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,

    /// Exact description
    pub description: Option<String>,

    /// Completion flag
    pub completed: Option<bool>,

    /// Status
    pub status: Option<TaskStatus>,
}

/// Escapes LIKE wildcards so user input only ever matches literally
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl Task {
    /// Inserts a task for a user
    pub async fn insert(
        conn: &mut PgConnection,
        user_id: Uuid,
        fields: &TaskFields,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO tasks (user_id, title, description, priority, completed, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.priority)
            .bind(fields.completed)
            .bind(fields.status)
            .fetch_one(conn)
            .await
    }

    /// Finds a non-deleted task owned by the user
    ///
    /// Tasks belonging to someone else are indistinguishable from missing ones.
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2 AND deleted = FALSE",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Locks a non-deleted task owned by the user for the rest of the transaction
    pub async fn lock_by_id_and_user(
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2 AND deleted = FALSE FOR UPDATE",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }

    /// Overwrites the writable fields of a task
    pub async fn save_fields(
        conn: &mut PgConnection,
        id: Uuid,
        fields: &TaskFields,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                priority = $4,
                completed = $5,
                status = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(fields.priority)
            .bind(fields.completed)
            .bind(fields.status)
            .fetch_one(conn)
            .await
    }

    /// Sets the completion flag
    ///
    /// Status is left untouched, so no history is recorded.
    pub async fn mark_completed(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE tasks
            SET completed = TRUE,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND deleted = FALSE
            RETURNING {}
            "#,
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-deletes a task
    ///
    /// Returns false when the task doesn't exist, belongs to someone else or
    /// was already deleted.
    pub async fn soft_delete(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET deleted = TRUE,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2 AND deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists one page of a user's tasks, ordered by priority
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        view: TaskView,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {}
            FROM tasks
            WHERE user_id = $1 AND {}
            ORDER BY priority ASC, created_at ASC
            LIMIT $2 OFFSET $3
            "#,
            TASK_COLUMNS,
            view.predicate()
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Counts a user's tasks in a view
    pub async fn count_for_user(
        pool: &PgPool,
        user_id: Uuid,
        view: TaskView,
    ) -> Result<i64, sqlx::Error> {
        let sql = format!(
            "SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND {}",
            view.predicate()
        );

        let (count,): (i64,) = sqlx::query_as(&sql).bind(user_id).fetch_one(pool).await?;

        Ok(count)
    }

    /// Lists a user's non-deleted tasks matching the API filters
    pub async fn filter_for_user(
        pool: &PgPool,
        user_id: Uuid,
        filter: &TaskFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 AND deleted = FALSE",
            TASK_COLUMNS
        );
        let mut bind_count = 1;

        if filter.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND title ILIKE ${} ESCAPE '\\'", bind_count));
        }
        if filter.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND description = ${}", bind_count));
        }
        if filter.completed.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND completed = ${}", bind_count));
        }
        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND status = ${}", bind_count));
        }

        query.push_str(" ORDER BY priority ASC, created_at ASC");

        let mut q = sqlx::query_as::<_, Task>(&query).bind(user_id);

        if let Some(title) = &filter.title {
            q = q.bind(format!("%{}%", escape_like(title)));
        }
        if let Some(description) = &filter.description {
            q = q.bind(description.clone());
        }
        if let Some(completed) = filter.completed {
            q = q.bind(completed);
        }
        if let Some(status) = filter.status {
            q = q.bind(status);
        }

        q.fetch_all(pool).await
    }

    /// Counts a user's active tasks grouped by status
    ///
    /// Statuses without tasks are absent from the result.
    pub async fn count_active_by_status(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<(TaskStatus, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (TaskStatus, i64)>(
            r#"
            SELECT status, COUNT(*)
            FROM tasks
            WHERE user_id = $1 AND deleted = FALSE AND completed = FALSE
            GROUP BY status
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
    }
}
