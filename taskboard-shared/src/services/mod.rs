/// Business logic on top of the models
///
/// - `priority`: Frees a priority by shifting the colliding run of active tasks
/// - `history`: Records status transitions
/// - `task_service`: Validated, transactional task writes
/// - `digest`: Status breakdown and report text for digest emails

pub mod digest;
pub mod history;
pub mod priority;
pub mod task_service;
