//! # Taskboard API Server Library
//!
//! HTTP surface of Taskboard: the JSON app surface under `/v1` and the
//! versioned REST API under `/api/v1`.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and bearer authentication layers
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
