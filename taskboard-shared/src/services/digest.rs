/// Digest email composition
///
/// Builds the per-status breakdown of a user's active tasks and renders the
/// plain-text report the worker sends. Sending and scheduling live in the
/// worker crate.

use crate::models::task::{Task, TaskStatus};
use sqlx::PgConnection;
use uuid::Uuid;

/// Subject line of every digest
pub const DIGEST_SUBJECT: &str = "Task Report (Breakdown based on task status)";

/// Active task counts for every status, in report order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBreakdown {
    counts: [(TaskStatus, i64); 4],
}

impl StatusBreakdown {
    /// Builds a breakdown from grouped counts; missing statuses count as zero
    pub fn from_counts(grouped: &[(TaskStatus, i64)]) -> Self {
        let counts = TaskStatus::ALL.map(|status| {
            let count: i64 = grouped
                .iter()
                .filter(|(s, _)| *s == status)
                .map(|(_, n)| *n)
                .sum();
            (status, count)
        });

        Self { counts }
    }

    /// Loads the breakdown of a user's non-deleted, incomplete tasks
    pub async fn load(conn: &mut PgConnection, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let grouped = Task::count_active_by_status(conn, user_id).await?;
        Ok(Self::from_counts(&grouped))
    }

    /// Count for one status
    pub fn count(&self, status: TaskStatus) -> i64 {
        self.counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Sum over every status
    pub fn total(&self) -> i64 {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Renders the report body
pub fn compose_report(breakdown: &StatusBreakdown) -> String {
    let mut body = String::from("Task Report\nHere's your report for today:\n");
    for (status, count) in &breakdown.counts {
        body.push_str(&format!("{}: {}\n", status, count));
    }
    body
}
