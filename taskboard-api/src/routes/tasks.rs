/// App surface task endpoints (`/v1/tasks`)
///
/// Lists are ordered by priority and paginated four to a page. Every list
/// response also carries the caller's `completed_count` and `total_count`
/// over non-deleted tasks.
///
/// Writes go through [`TaskService`](taskboard_shared::services::task_service::TaskService),
/// so creating or updating a task renumbers colliding priorities and a status
/// change is recorded in the task history.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::{Task, TaskChanges, TaskFields, TaskStatus, TaskView},
};
use uuid::Uuid;

/// Tasks per page
pub const PAGE_SIZE: i64 = 4;

/// Owner reference embedded in task representations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRef {
    /// Owner login name
    pub username: String,
}

/// Task representation shared by both surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Task ID
    pub id: Uuid,

    /// Title
    pub title: String,

    /// Description
    pub description: String,

    /// Completion flag
    pub completed: bool,

    /// Priority
    pub priority: i32,

    /// Status
    pub status: TaskStatus,

    /// Owner
    pub user: UserRef,
}

impl TaskResponse {
    /// Representation of a task owned by `username`
    pub fn new(task: Task, username: &str) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            priority: task.priority,
            status: task.status,
            user: UserRef {
                username: username.to_string(),
            },
        }
    }
}

/// Create / full update body
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRequest {
    /// Title (5 to 100 characters)
    pub title: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Priority (> 0)
    pub priority: i32,

    /// Completion flag
    #[serde(default)]
    pub completed: bool,

    /// Status
    #[serde(default)]
    pub status: TaskStatus,
}

impl From<TaskRequest> for TaskFields {
    fn from(req: TaskRequest) -> Self {
        TaskFields {
            title: req.title,
            description: req.description,
            priority: req.priority,
            completed: req.completed,
            status: req.status,
        }
    }
}

/// `?page=N`, 1-based
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    /// Page number
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

/// One page of a task list
#[derive(Debug, Serialize)]
pub struct TaskPage {
    /// Tasks on this page
    pub tasks: Vec<TaskResponse>,

    /// Current page
    pub page: u32,

    /// Page size
    pub per_page: i64,

    /// Number of pages in this list (at least 1)
    pub total_pages: i64,

    /// Non-deleted completed tasks of the caller
    pub completed_count: i64,

    /// Non-deleted tasks of the caller
    pub total_count: i64,
}

/// Number of pages for `items` entries; an empty list still has one page
fn page_count(items: i64) -> i64 {
    ((items + PAGE_SIZE - 1) / PAGE_SIZE).max(1)
}

async fn list_page(
    state: &AppState,
    auth: &AuthContext,
    view: TaskView,
    page: u32,
) -> ApiResult<Json<TaskPage>> {
    let in_view = Task::count_for_user(&state.db, auth.user_id, view).await?;
    let total_pages = page_count(in_view);

    if page == 0 || i64::from(page) > total_pages {
        return Err(ApiError::NotFound("Invalid page".to_string()));
    }

    let offset = (i64::from(page) - 1) * PAGE_SIZE;
    let tasks = Task::list_for_user(&state.db, auth.user_id, view, PAGE_SIZE, offset).await?;

    let completed_count = Task::count_for_user(&state.db, auth.user_id, TaskView::Completed).await?;
    let total_count = Task::count_for_user(&state.db, auth.user_id, TaskView::All).await?;

    Ok(Json(TaskPage {
        tasks: tasks
            .into_iter()
            .map(|t| TaskResponse::new(t, &auth.username))
            .collect(),
        page,
        per_page: PAGE_SIZE,
        total_pages,
        completed_count,
        total_count,
    }))
}

/// `GET /v1/tasks` - active tasks
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<TaskPage>> {
    list_page(&state, &auth, TaskView::Pending, query.page).await
}

/// `GET /v1/tasks/all` - every non-deleted task
pub async fn list_all(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<TaskPage>> {
    list_page(&state, &auth, TaskView::All, query.page).await
}

/// `GET /v1/tasks/completed` - completed tasks
pub async fn list_completed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<TaskPage>> {
    list_page(&state, &auth, TaskView::Completed, query.page).await
}

/// `POST /v1/tasks`
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let task = state.tasks().create(auth.user_id, req.into()).await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::new(task, &auth.username))))
}

/// `GET /v1/tasks/:id`
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks().get(auth.user_id, id).await?;

    Ok(Json(TaskResponse::new(task, &auth.username)))
}

/// `PUT /v1/tasks/:id`
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<TaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let changes = TaskChanges::from(TaskFields::from(req));
    let task = state.tasks().update(auth.user_id, id, changes).await?;

    Ok(Json(TaskResponse::new(task, &auth.username)))
}

/// `DELETE /v1/tasks/:id` - soft delete
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.tasks().delete(auth.user_id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /v1/tasks/:id/complete` - sets only the completion flag
pub async fn complete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks().complete(auth.user_id, id).await?;

    Ok(Json(TaskResponse::new(task, &auth.username)))
}
