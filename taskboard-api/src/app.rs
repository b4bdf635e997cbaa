/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::{ApiError, AUTH_FAILED_MESSAGE},
    middleware::security::SecurityHeadersLayer,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::{
    auth::middleware::{authenticate_bearer, AuthError},
    services::task_service::TaskService,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, Level};

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Task write use cases over the shared pool
    pub fn tasks(&self) -> TaskService {
        TaskService::new(self.db.clone())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                         (public)
/// ├── /v1/                                app surface, auth failures → 401
/// │   ├── POST /auth/signup | /auth/login | /auth/refresh   (public)
/// │   ├── POST /auth/logout
/// │   ├── GET  /tasks | /tasks/all | /tasks/completed   ?page=N
/// │   ├── POST /tasks
/// │   ├── GET | PUT | DELETE /tasks/:id
/// │   ├── POST /tasks/:id/complete
/// │   └── GET | PUT /settings/email
/// └── /api/v1/                            versioned API, auth failures → 403
///     ├── GET | POST /task
///     ├── GET | PUT | PATCH | DELETE /task/:id
///     ├── GET /task/:id/history
///     └── GET /task/:id/history/:history_id
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/auth/signup", post(routes::auth::signup))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh));

    let session_routes = Router::new()
        .route("/auth/logout", post(routes::auth::logout))
        .route(
            "/tasks",
            get(routes::tasks::list_pending).post(routes::tasks::create_task),
        )
        .route("/tasks/all", get(routes::tasks::list_all))
        .route("/tasks/completed", get(routes::tasks::list_completed))
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/tasks/:id/complete", post(routes::tasks::complete_task))
        .route(
            "/settings/email",
            get(routes::email_settings::get_settings).put(routes::email_settings::update_settings),
        )
        .route_layer(from_fn_with_state(state.clone(), session_auth_layer));

    let v1_routes = public_auth_routes.merge(session_routes);

    let api_routes = Router::new()
        .route(
            "/task",
            get(routes::api::tasks::list_tasks).post(routes::api::tasks::create_task),
        )
        .route(
            "/task/:id",
            get(routes::api::tasks::get_task)
                .put(routes::api::tasks::replace_task)
                .patch(routes::api::tasks::patch_task)
                .delete(routes::api::tasks::delete_task),
        )
        .route("/task/:id/history", get(routes::api::history::list_history))
        .route(
            "/task/:id/history/:history_id",
            get(routes::api::history::get_history),
        )
        .route_layer(from_fn_with_state(state.clone(), api_auth_layer));

    let cors = if state.config.cors_permissive() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .nest("/api/v1", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Maps an authentication failure to the surface's rejection
///
/// The cause is logged but never returned to the client.
pub(crate) fn reject(err: AuthError, rejection: fn(String) -> ApiError) -> ApiError {
    match err {
        AuthError::Database(e) => ApiError::InternalError(format!("Session lookup failed: {}", e)),
        other => {
            debug!(reason = %other, "Rejected unauthenticated request");
            rejection(AUTH_FAILED_MESSAGE.to_string())
        }
    }
}

/// Bearer authentication for the app surface (401 on failure)
async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate_bearer(&state.db, state.jwt_secret(), req.headers())
        .await
        .map_err(|e| reject(e, ApiError::Unauthorized))?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Bearer authentication for the versioned API (403 on failure)
async fn api_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate_bearer(&state.db, state.jwt_secret(), req.headers())
        .await
        .map_err(|e| reject(e, ApiError::Forbidden))?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
