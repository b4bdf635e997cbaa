/// Task status history
///
/// One row is appended every time a saved task's status differs from the
/// stored one. Rows are never updated or removed by the application.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE history (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     task_id UUID NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
///     prev_status task_status NOT NULL,
///     updated_status task_status NOT NULL,
///     changed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use super::task::TaskStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// A recorded status transition
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct History {
    /// Unique history ID
    pub id: Uuid,

    /// Task whose status changed
    pub task_id: Uuid,

    /// Status before the save
    pub prev_status: TaskStatus,

    /// Status after the save
    pub updated_status: TaskStatus,

    /// When the change was recorded
    pub changed_at: DateTime<Utc>,
}

impl History {
    /// Calendar date (UTC) of the change
    pub fn changed_date(&self) -> NaiveDate {
        self.changed_at.date_naive()
    }
}

/// Filters accepted by the history listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryFilter {
    /// Status before the change
    pub prev_status: Option<TaskStatus>,

    /// Status after the change
    pub updated_status: Option<TaskStatus>,

    /// UTC date of the change
    pub changed_date: Option<NaiveDate>,
}

impl History {
    /// Appends a transition for a task
    pub async fn record(
        conn: &mut PgConnection,
        task_id: Uuid,
        prev_status: TaskStatus,
        updated_status: TaskStatus,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, History>(
            r#"
            INSERT INTO history (task_id, prev_status, updated_status)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, prev_status, updated_status, changed_at
            "#,
        )
        .bind(task_id)
        .bind(prev_status)
        .bind(updated_status)
        .fetch_one(conn)
        .await
    }

    /// Lists the history of a task owned by the user, oldest first
    ///
    /// Returns an empty list when the task is deleted or not owned; callers
    /// check ownership first to tell that apart from "no changes yet".
    pub async fn list_for_task(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
        filter: &HistoryFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = String::from(
            r#"
            SELECT h.id, h.task_id, h.prev_status, h.updated_status, h.changed_at
            FROM history h
            JOIN tasks t ON t.id = h.task_id
            WHERE h.task_id = $1 AND t.user_id = $2 AND t.deleted = FALSE
            "#,
        );
        let mut bind_count = 2;

        if filter.prev_status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND h.prev_status = ${}", bind_count));
        }
        if filter.updated_status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND h.updated_status = ${}", bind_count));
        }
        if filter.changed_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(
                " AND (h.changed_at AT TIME ZONE 'UTC')::date = ${}",
                bind_count
            ));
        }

        query.push_str(" ORDER BY h.changed_at ASC, h.id ASC");

        let mut q = sqlx::query_as::<_, History>(&query).bind(task_id).bind(user_id);

        if let Some(prev_status) = filter.prev_status {
            q = q.bind(prev_status);
        }
        if let Some(updated_status) = filter.updated_status {
            q = q.bind(updated_status);
        }
        if let Some(changed_date) = filter.changed_date {
            q = q.bind(changed_date);
        }

        q.fetch_all(pool).await
    }

    /// Finds one history row of a task owned by the user
    pub async fn find_for_task(
        pool: &PgPool,
        id: Uuid,
        task_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, History>(
            r#"
            SELECT h.id, h.task_id, h.prev_status, h.updated_status, h.changed_at
            FROM history h
            JOIN tasks t ON t.id = h.task_id
            WHERE h.id = $1 AND h.task_id = $2 AND t.user_id = $3 AND t.deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
