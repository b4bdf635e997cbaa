/// Task write use cases
///
/// Every write that can change a priority or a status goes through here, so
/// both HTTP surfaces get the same validation, renumbering and history
/// capture. Each use case runs in a single transaction.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::task::{TaskFields, TaskStatus};
/// use taskboard_shared::services::task_service::TaskService;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let service = TaskService::new(pool);
///
/// let task = service
///     .create(user_id, TaskFields {
///         title: "buy groceries".to_string(),
///         description: String::new(),
///         priority: 1,
///         completed: false,
///         status: TaskStatus::Pending,
///     })
///     .await?;
///
/// assert_eq!(task.title, "Buy groceries");
/// # Ok(())
/// # }
/// ```

use crate::models::task::{Task, TaskChanges, TaskFields};
use crate::services::priority::{self, RenumberError};
use crate::services::history;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Minimum title length in characters
pub const TITLE_MIN_CHARS: usize = 5;

/// Maximum title length in characters
pub const TITLE_MAX_CHARS: usize = 100;

/// A validation failure on one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as sent by the client
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Task use case errors
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Input rejected before touching the database
    #[error("Invalid task input")]
    Validation(Vec<FieldError>),

    /// Task missing, deleted or owned by someone else
    #[error("Task not found")]
    NotFound,

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<RenumberError> for TaskServiceError {
    fn from(err: RenumberError) -> Self {
        match err {
            RenumberError::Overflow(_) => TaskServiceError::Validation(vec![FieldError::new(
                "priority",
                "Priority too large, no room to move the tasks above it",
            )]),
            RenumberError::Database(e) => TaskServiceError::Database(e),
        }
    }
}

/// Capitalizes the first character and lower-cases the rest
pub fn capitalize_title(title: &str) -> String {
    let mut chars = title.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Checks task input and normalizes the title
///
/// Collects every failing field instead of stopping at the first.
pub fn validate_fields(mut fields: TaskFields) -> Result<TaskFields, TaskServiceError> {
    let mut errors = Vec::new();

    // Case mapping can lengthen a title ('ß' -> "SS"), so the stored form is measured
    let title = capitalize_title(&fields.title);
    let title_chars = title.chars().count();
    if title_chars < TITLE_MIN_CHARS {
        errors.push(FieldError::new(
            "title",
            "Title too small, must be at least 5 characters",
        ));
    } else if title_chars > TITLE_MAX_CHARS {
        errors.push(FieldError::new(
            "title",
            "Title too long, must be at most 100 characters",
        ));
    }

    if fields.priority <= 0 {
        errors.push(FieldError::new(
            "priority",
            "Priority must be greater than zero",
        ));
    }

    if !errors.is_empty() {
        return Err(TaskServiceError::Validation(errors));
    }

    fields.title = title;
    Ok(fields)
}

/// Whether saving `fields` must free its priority among the active tasks
fn needs_renumbering(stored_priority: Option<i32>, fields: &TaskFields) -> bool {
    !fields.completed && stored_priority != Some(fields.priority)
}

/// Task write use cases bound to a pool
#[derive(Debug, Clone)]
pub struct TaskService {
    pool: PgPool,
}

impl TaskService {
    /// Creates a service over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a task for a user
    ///
    /// Renumbers colliding active tasks unless the task is created completed.
    pub async fn create(&self, user_id: Uuid, fields: TaskFields) -> Result<Task, TaskServiceError> {
        let fields = validate_fields(fields)?;

        let mut tx = self.pool.begin().await?;

        if needs_renumbering(None, &fields) {
            priority::renumber_priorities(&mut tx, user_id, fields.priority, None).await?;
        }

        let task = Task::insert(&mut tx, user_id, &fields).await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            task_id = %task.id,
            priority = task.priority,
            "Task created"
        );

        Ok(task)
    }

    /// Updates a task owned by the user
    ///
    /// Fields left as None keep their stored value. Records a history row when
    /// the status changes and renumbers when the priority changes on a task
    /// that stays incomplete.
    pub async fn update(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> Result<Task, TaskServiceError> {
        let mut tx = self.pool.begin().await?;

        let stored = Task::lock_by_id_and_user(&mut tx, task_id, user_id)
            .await?
            .ok_or(TaskServiceError::NotFound)?;

        let fields = validate_fields(changes.apply_to(&stored))?;

        if needs_renumbering(Some(stored.priority), &fields) {
            priority::renumber_priorities(&mut tx, user_id, fields.priority, Some(task_id))
                .await?;
        }

        history::capture_status_change(&mut tx, &stored, fields.status).await?;

        let task = Task::save_fields(&mut tx, task_id, &fields).await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            task_id = %task_id,
            status = %task.status,
            "Task updated"
        );

        Ok(task)
    }

    /// Marks a task completed without touching status or priority
    pub async fn complete(&self, user_id: Uuid, task_id: Uuid) -> Result<Task, TaskServiceError> {
        let task = Task::mark_completed(&self.pool, task_id, user_id)
            .await?
            .ok_or(TaskServiceError::NotFound)?;

        info!(user_id = %user_id, task_id = %task_id, "Task completed");

        Ok(task)
    }

    /// Soft-deletes a task owned by the user
    pub async fn delete(&self, user_id: Uuid, task_id: Uuid) -> Result<(), TaskServiceError> {
        if !Task::soft_delete(&self.pool, task_id, user_id).await? {
            return Err(TaskServiceError::NotFound);
        }

        info!(user_id = %user_id, task_id = %task_id, "Task deleted");

        Ok(())
    }

    /// Loads a non-deleted task owned by the user
    pub async fn get(&self, user_id: Uuid, task_id: Uuid) -> Result<Task, TaskServiceError> {
        Task::find_by_id_and_user(&self.pool, task_id, user_id)
            .await?
            .ok_or(TaskServiceError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;

    fn fields(title: &str, priority: i32) -> TaskFields {
        TaskFields {
            title: title.to_string(),
            description: String::new(),
            priority,
            completed: false,
            status: TaskStatus::Pending,
        }
    }

    #[test]
    fn test_capitalize_title() {
        assert_eq!(capitalize_title("buy MILK"), "Buy milk");
        assert_eq!(capitalize_title("Écrire"), "Écrire");
        assert_eq!(capitalize_title("123 abc"), "123 abc");
        assert_eq!(capitalize_title(""), "");
    }

    #[test]
    fn test_validate_normalizes_title() {
        let validated = validate_fields(fields("wASH the car", 2)).unwrap();
        assert_eq!(validated.title, "Wash the car");
        assert_eq!(validated.priority, 2);
    }

    #[test]
    fn test_validate_rejects_short_title_and_bad_priority() {
        let err = validate_fields(fields("abcd", 0)).unwrap_err();

        match err {
            TaskServiceError::Validation(errors) => {
                let names: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(names, vec!["title", "priority"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_counts_characters_not_bytes() {
        // Five characters, ten bytes
        assert!(validate_fields(fields("ééééé", 1)).is_ok());
        assert!(validate_fields(fields(&"a".repeat(101), 1)).is_err());
        assert!(validate_fields(fields(&"a".repeat(100), 1)).is_ok());
    }

    #[test]
    fn test_title_length_checked_after_capitalizing() {
        // 'ß' upper-cases to "SS": 100 characters in, 101 stored
        let err = validate_fields(fields(&format!("ß{}", "a".repeat(99)), 1)).unwrap_err();
        match err {
            TaskServiceError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "title");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let validated = validate_fields(fields(&format!("ß{}", "a".repeat(98)), 1)).unwrap();
        assert_eq!(validated.title.chars().count(), TITLE_MAX_CHARS);
        assert!(validated.title.starts_with("SSa"));
    }

    #[test]
    fn test_renumber_overflow_is_priority_validation_error() {
        let err = TaskServiceError::from(RenumberError::Overflow(i32::MAX - 1));

        match err {
            TaskServiceError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "priority");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_renumbering_trigger() {
        let active = fields("Write tests", 3);
        assert!(needs_renumbering(None, &active));
        assert!(needs_renumbering(Some(5), &active));
        assert!(!needs_renumbering(Some(3), &active));

        let done = TaskFields {
            completed: true,
            ..active
        };
        assert!(!needs_renumbering(None, &done));
        assert!(!needs_renumbering(Some(5), &done));
    }
}
