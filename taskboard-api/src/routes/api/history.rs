/// `/api/v1/task/:id/history` endpoints
///
/// History is read-only. The task must belong to the caller and not be
/// deleted, otherwise the answer is 404.
///
/// ```text
/// GET /api/v1/task/:id/history?prev_status=PENDING&changed_date=2025-03-01
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::tasks::TaskResponse,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::{
        history::{History, HistoryFilter},
        task::TaskStatus,
    },
};
use uuid::Uuid;

/// History representation
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    /// History ID
    pub id: Uuid,

    /// Status before the change
    pub prev_status: TaskStatus,

    /// Status after the change
    pub updated_status: TaskStatus,

    /// When the change happened
    pub changed_at: DateTime<Utc>,

    /// UTC date of the change
    pub changed_date: NaiveDate,

    /// The task, as it is now
    pub task: TaskResponse,
}

impl HistoryResponse {
    fn new(entry: History, task: TaskResponse) -> Self {
        Self {
            id: entry.id,
            prev_status: entry.prev_status,
            updated_status: entry.updated_status,
            changed_at: entry.changed_at,
            changed_date: entry.changed_date(),
            task,
        }
    }
}

/// `GET /api/v1/task/:id/history`
pub async fn list_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<Uuid>,
    Query(filter): Query<HistoryFilter>,
) -> ApiResult<Json<Vec<HistoryResponse>>> {
    let task = state.tasks().get(auth.user_id, task_id).await?;
    let task = TaskResponse::new(task, &auth.username);

    let entries = History::list_for_task(&state.db, task_id, auth.user_id, &filter).await?;

    Ok(Json(
        entries
            .into_iter()
            .map(|entry| HistoryResponse::new(entry, task.clone()))
            .collect(),
    ))
}

/// `GET /api/v1/task/:id/history/:history_id`
pub async fn get_history(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((task_id, history_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<HistoryResponse>> {
    let task = state.tasks().get(auth.user_id, task_id).await?;

    let entry = History::find_for_task(&state.db, history_id, task_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("History entry not found".to_string()))?;

    Ok(Json(HistoryResponse::new(
        entry,
        TaskResponse::new(task, &auth.username),
    )))
}
