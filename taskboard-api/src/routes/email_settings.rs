/// Digest settings of the caller (`/v1/settings/email`)
///
/// Only the time of day and the opt-in flag are writable; the next digest
/// date is owned by the worker.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use taskboard_shared::{auth::middleware::AuthContext, models::email_settings::EmailSettings};
use tracing::info;

/// Settings representation
#[derive(Debug, Serialize, Deserialize)]
pub struct EmailSettingsResponse {
    /// Time of day (UTC) digests go out
    pub email_time: NaiveTime,

    /// Date of the next digest
    pub email_date: NaiveDate,

    /// Opt-in flag
    pub email_enable: bool,
}

impl From<EmailSettings> for EmailSettingsResponse {
    fn from(settings: EmailSettings) -> Self {
        Self {
            email_time: settings.email_time,
            email_date: settings.email_date,
            email_enable: settings.email_enable,
        }
    }
}

/// Update body; omitted fields keep their value
#[derive(Debug, Deserialize)]
pub struct UpdateEmailSettingsRequest {
    /// New time of day, `HH:MM:SS`
    pub email_time: Option<NaiveTime>,

    /// New opt-in flag
    pub email_enable: Option<bool>,
}

fn missing() -> ApiError {
    ApiError::NotFound("Email settings not found".to_string())
}

/// `GET /v1/settings/email`
pub async fn get_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<EmailSettingsResponse>> {
    let settings = EmailSettings::find_by_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(missing)?;

    Ok(Json(settings.into()))
}

/// `PUT /v1/settings/email`
pub async fn update_settings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateEmailSettingsRequest>,
) -> ApiResult<Json<EmailSettingsResponse>> {
    let settings =
        EmailSettings::update_for_user(&state.db, auth.user_id, req.email_time, req.email_enable)
            .await?
            .ok_or_else(missing)?;

    info!(
        user_id = %auth.user_id,
        email_enable = settings.email_enable,
        email_time = %settings.email_time,
        "Email settings updated"
    );

    Ok(Json(settings.into()))
}
