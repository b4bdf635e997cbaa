//! # Taskboard Worker
//!
//! Sends the scheduled task digest emails. Every 30 seconds (by default) it
//! looks for users whose digest is due, mails them a breakdown of their
//! active tasks and moves their schedule one day forward.
//!
//! Migrations are applied by the API server; the worker expects the schema to
//! exist.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskboard MAIL_FROM=noreply@taskboard.local \
//!     cargo run -p taskboard-worker
//! ```

use taskboard_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use taskboard_worker::{config::WorkerConfig, digest::DigestScheduler, mailer::build_mailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Taskboard Worker v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = WorkerConfig::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    let mailer = build_mailer(&config.mail)?;
    let scheduler = DigestScheduler::new(pool.clone(), mailer, config.mail.from, config.digest);

    let shutdown = scheduler.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received, stopping after the current scan..."),
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
        shutdown.cancel();
    });

    scheduler.run().await;

    close_pool(pool).await;
    tracing::info!("Worker stopped");

    Ok(())
}
