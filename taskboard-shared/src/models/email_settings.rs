/// Per-user digest email settings
///
/// Every user has exactly one row, created at signup with the schedule set to
/// the signup moment. The digest worker treats `email_date + email_time` (UTC)
/// as the next due instant and advances `email_date` by one day after each
/// successful send.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE email_settings (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     email_time TIME NOT NULL,
///     email_date DATE NOT NULL,
///     email_enable BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT email_settings_user_id_key UNIQUE (user_id)
/// );
/// ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

const SETTINGS_COLUMNS: &str =
    "id, user_id, email_time, email_date, email_enable, created_at, updated_at";

/// Digest schedule of one user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmailSettings {
    /// Unique settings ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Time of day (UTC) the digest goes out
    pub email_time: NaiveTime,

    /// Date of the next digest
    pub email_date: NaiveDate,

    /// Opt-in flag
    pub email_enable: bool,

    /// When the row was created
    pub created_at: DateTime<Utc>,

    /// When the row was last changed
    pub updated_at: DateTime<Utc>,
}

impl EmailSettings {
    /// The instant the next digest becomes due
    pub fn next_due(&self) -> NaiveDateTime {
        self.email_date.and_time(self.email_time)
    }

    /// Whether a digest should go out at `now`
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.email_enable && self.next_due() <= now
    }
}

/// A due digest together with its recipient
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DueDigest {
    /// Settings row to lock and advance
    pub settings_id: Uuid,

    /// Recipient user
    pub user_id: Uuid,

    /// Recipient login name
    pub username: String,

    /// Recipient address
    pub email: String,

    /// Scheduled date
    pub email_date: NaiveDate,

    /// Scheduled time of day
    pub email_time: NaiveTime,
}

impl EmailSettings {
    /// Creates the settings row for a new user, scheduled at `now`
    pub async fn create_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO email_settings (user_id, email_time, email_date)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        );

        sqlx::query_as::<_, EmailSettings>(&sql)
            .bind(user_id)
            .bind(now.time())
            .bind(now.date_naive())
            .fetch_one(conn)
            .await
    }

    /// Finds the settings of a user
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM email_settings WHERE user_id = $1",
            SETTINGS_COLUMNS
        );

        sqlx::query_as::<_, EmailSettings>(&sql)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Updates the time of day and opt-in flag of a user's settings
    ///
    /// `None` keeps the stored value.
    pub async fn update_for_user(
        pool: &PgPool,
        user_id: Uuid,
        email_time: Option<NaiveTime>,
        email_enable: Option<bool>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE email_settings
            SET email_time = COALESCE($2, email_time),
                email_enable = COALESCE($3, email_enable),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {}
            "#,
            SETTINGS_COLUMNS
        );

        sqlx::query_as::<_, EmailSettings>(&sql)
            .bind(user_id)
            .bind(email_time)
            .bind(email_enable)
            .fetch_optional(pool)
            .await
    }

    /// Lists enabled schedules that are due at `now`, oldest first
    pub async fn list_due(
        pool: &PgPool,
        now: NaiveDateTime,
        limit: i64,
    ) -> Result<Vec<DueDigest>, sqlx::Error> {
        sqlx::query_as::<_, DueDigest>(
            r#"
            SELECT s.id AS settings_id, s.user_id, u.username, u.email,
                   s.email_date, s.email_time
            FROM email_settings s
            JOIN users u ON u.id = s.user_id
            WHERE s.email_enable = TRUE
              AND s.email_date + s.email_time <= $1
            ORDER BY s.email_date ASC, s.email_time ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Locks a settings row if it is still due
    ///
    /// Returns None when another worker holds the lock or already advanced
    /// the schedule.
    pub async fn lock_if_due(
        conn: &mut PgConnection,
        id: Uuid,
        now: NaiveDateTime,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {}
            FROM email_settings
            WHERE id = $1
              AND email_enable = TRUE
              AND email_date + email_time <= $2
            FOR UPDATE SKIP LOCKED
            "#,
            SETTINGS_COLUMNS
        );

        sqlx::query_as::<_, EmailSettings>(&sql)
            .bind(id)
            .bind(now)
            .fetch_optional(conn)
            .await
    }

    /// Moves the next digest one day forward
    pub async fn advance_schedule(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<NaiveDate, sqlx::Error> {
        let (email_date,): (NaiveDate,) = sqlx::query_as(
            r#"
            UPDATE email_settings
            SET email_date = email_date + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING email_date
            "#,
        )
        .bind(id)
        .fetch_one(conn)
        .await?;

        Ok(email_date)
    }
}
