//! # Taskboard Worker Library
//!
//! Sends the scheduled task digest emails.
//!
//! ## Modules
//!
//! - `config`: Environment configuration
//! - `digest`: Poll loop that finds due schedules and dispatches digests
//! - `mailer`: Mail transports (HTTP relay, log, in-memory)
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskboard_worker::digest::{DigestConfig, DigestScheduler};
//! use taskboard_worker::mailer::LogMailer;
//!
//! # async fn example(pool: sqlx::PgPool) -> anyhow::Result<()> {
//! let scheduler = DigestScheduler::new(
//!     pool,
//!     Arc::new(LogMailer::new()),
//!     "noreply@taskboard.local",
//!     DigestConfig::default(),
//! );
//! let summary = scheduler.run_once(chrono::Utc::now()).await?;
//! println!("sent {} digests", summary.sent);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod digest;
pub mod mailer;
