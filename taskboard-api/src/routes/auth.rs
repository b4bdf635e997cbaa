/// Authentication endpoints
///
/// - `POST /v1/auth/signup` - Create an account (and its digest settings)
/// - `POST /v1/auth/login` - Exchange username and password for tokens
/// - `POST /v1/auth/refresh` - Exchange a refresh token for an access token
/// - `POST /v1/auth/logout` - Revoke every token issued so far

use crate::{
    app::{reject, AppState},
    error::{ApiError, ApiResult, AUTH_FAILED_MESSAGE},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{
        jwt::{self, TokenPair, TokenType},
        middleware::{resolve_session, AuthContext},
        password,
    },
    models::{
        email_settings::EmailSettings,
        user::{CreateUser, User},
    },
};
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Letters, digits and `@.+-_`
fn validate_username(username: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');

    if username.chars().all(allowed) {
        Ok(())
    } else {
        let mut err = ValidationError::new("username_chars");
        err.message = Some("Username may only contain letters, digits and @/./+/-/_".into());
        Err(err)
    }
}

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Login name
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1 to 150 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,

    /// Digest address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (checked for strength separately)
    pub password: String,

    /// Must equal `password`
    #[validate(must_match(other = "password", message = "Passwords don't match"))]
    pub password_confirmation: String,
}

/// Signup response
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    /// New user ID
    pub user_id: Uuid,

    /// Login name
    pub username: String,

    /// Issued tokens
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login name
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: Uuid,

    /// Issued tokens
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token
    pub access_token: String,

    /// Always "Bearer"
    pub token_type: &'static str,

    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Creates an account
///
/// The user row and its email settings are written in one transaction, with
/// the first digest scheduled at the signup moment.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation or password strength failed
/// - `409 Conflict`: Username taken
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    req.validate()?;

    password::validate_password_strength(&req.password, &req.username)
        .map_err(|message| ApiError::invalid_field("password", message))?;

    let password_hash = password::hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;

    let user = User::create(
        &mut tx,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    EmailSettings::create_for_user(&mut tx, user.id, Utc::now()).await?;

    tx.commit().await?;

    info!(user_id = %user.id, username = %user.username, "User signed up");

    let tokens = jwt::issue_token_pair(user.id, user.session_generation, state.jwt_secret())?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            user_id: user.id,
            username: user.username,
            tokens,
        }),
    ))
}

/// Logs in with username and password
///
/// Unknown usernames and wrong passwords get the same answer.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    User::update_last_login(&state.db, user.id).await?;

    info!(user_id = %user.id, "User logged in");

    let tokens = jwt::issue_token_pair(user.id, user.session_generation, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        tokens,
    }))
}

/// Exchanges a refresh token for a new access token
///
/// Refresh tokens issued before the last logout are rejected. A failed
/// session lookup is a 500, not a rejection.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;

    let user = resolve_session(&state.db, &claims)
        .await
        .map_err(|e| reject(e, ApiError::Unauthorized))?;

    let access = jwt::Claims::new(user.id, user.session_generation, TokenType::Access);

    Ok(Json(RefreshResponse {
        access_token: jwt::create_token(&access, state.jwt_secret())?,
        token_type: "Bearer",
        expires_in: access.expires_in(),
    }))
}

/// Revokes all tokens of the caller
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    User::bump_session_generation(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(AUTH_FAILED_MESSAGE.to_string()))?;

    info!(user_id = %auth.user_id, "User logged out");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(username: &str, password: &str, confirmation: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: "gokul@example.org".to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        }
    }

    #[test]
    fn test_signup_validation_passes() {
        assert!(signup("gokul.k", "plum-orbit-42", "plum-orbit-42").validate().is_ok());
    }

    #[test]
    fn test_signup_password_mismatch() {
        let errors = signup("gokul", "plum-orbit-42", "plum-orbit-43")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirmation"));
    }

    #[test]
    fn test_signup_username_characters() {
        let errors = signup("gokul k!", "plum-orbit-42", "plum-orbit-42")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_signup_email_format() {
        let mut req = signup("gokul", "plum-orbit-42", "plum-orbit-42");
        req.email = "not-an-email".to_string();
        assert!(req.validate().is_err());
    }
}
