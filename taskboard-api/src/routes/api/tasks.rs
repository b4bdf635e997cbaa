/// `/api/v1/task` endpoints
///
/// ```text
/// GET /api/v1/task?title=report&completed=false&status=PENDING
/// ```
///
/// - `title`: case-insensitive substring
/// - `description`: exact match
/// - `completed`: `true` / `false`
/// - `status`: `PENDING`, `IN_PROGRESS`, `COMPLETED` or `CANCELLED`

use crate::{
    app::AppState,
    error::ApiResult,
    routes::tasks::{TaskRequest, TaskResponse},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, TaskChanges, TaskFields, TaskFilter},
};
use uuid::Uuid;

/// `GET /api/v1/task`
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = Task::filter_for_user(&state.db, auth.user_id, &filter).await?;

    Ok(Json(
        tasks
            .into_iter()
            .map(|t| TaskResponse::new(t, &auth.username))
            .collect(),
    ))
}

/// `POST /api/v1/task`
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let task = state.tasks().create(auth.user_id, req.into()).await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::new(task, &auth.username))))
}

/// `GET /api/v1/task/:id`
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks().get(auth.user_id, id).await?;

    Ok(Json(TaskResponse::new(task, &auth.username)))
}

/// `PUT /api/v1/task/:id` - full update
pub async fn replace_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let changes = TaskChanges::from(TaskFields::from(req));
    let task = state.tasks().update(auth.user_id, id, changes).await?;

    Ok(Json(TaskResponse::new(task, &auth.username)))
}

/// `PATCH /api/v1/task/:id` - partial update
pub async fn patch_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(changes): Json<TaskChanges>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks().update(auth.user_id, id, changes).await?;

    Ok(Json(TaskResponse::new(task, &auth.username)))
}

/// `DELETE /api/v1/task/:id` - soft delete
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.tasks().delete(auth.user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
