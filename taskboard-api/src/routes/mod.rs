/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, login, refresh and logout
/// - `tasks`: App surface task lists and writes
/// - `email_settings`: Digest settings of the caller
/// - `api`: Versioned REST API

pub mod api;
pub mod auth;
pub mod email_settings;
pub mod health;
pub mod tasks;
