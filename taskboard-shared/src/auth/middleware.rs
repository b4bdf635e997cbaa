/// Bearer token authentication
///
/// Resolves the `Authorization: Bearer <token>` header of a request into an
/// [`AuthContext`]. The token must be a valid access token and its `gen`
/// claim must equal the user's current session generation, so tokens issued
/// before a logout are rejected.
///
/// The HTTP status for a failure is decided by the caller: the app surface
/// answers 401, the versioned API answers 403.
///
/// # Example
///
/// ```no_run
/// use axum::Extension;
/// use taskboard_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.username)
/// }
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_access_token, Claims, JwtError};
use crate::models::user::User;

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Login name, echoed in task representations
    pub username: String,
}

impl AuthContext {
    /// Builds the context from a loaded user
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Why a request could not be authenticated
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Signature, expiry or type check failed
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),

    /// User deleted or logged out since the token was issued
    #[error("Token has been revoked")]
    Revoked,

    /// Lookup of the user failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Header is not valid ASCII".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Loads the user a token was issued to and checks it is still live
pub async fn resolve_session(pool: &PgPool, claims: &Claims) -> Result<User, AuthError> {
    let user = User::find_by_id(pool, claims.sub)
        .await?
        .ok_or(AuthError::Revoked)?;

    if user.session_generation != claims.gen {
        return Err(AuthError::Revoked);
    }

    Ok(user)
}

/// Authenticates a request from its headers
pub async fn authenticate_bearer(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let claims = validate_access_token(token, secret)?;
    let user = resolve_session(pool, &claims).await?;

    Ok(AuthContext::from_user(&user))
}
