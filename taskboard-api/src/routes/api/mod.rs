/// Versioned REST API (`/api/v1`)
///
/// Same data and the same write rules as the app surface, with query-string
/// filtering and read access to task history. Authentication failures answer
/// 403 here.
///
/// - `tasks`: Task CRUD with filters
/// - `history`: Status history of one task

pub mod history;
pub mod tasks;
