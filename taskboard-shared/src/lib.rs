//! # Taskboard Shared Library
//!
//! Shared types, SQL access and business logic used by the Taskboard API
//! server and the digest worker.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT tokens and bearer authentication
//! - `db`: Connection pool and embedded migrations
//! - `models`: Database models and their queries
//! - `services`: Task use cases, priority renumbering, history capture and
//!   digest composition

pub mod auth;
pub mod db;
pub mod models;
pub mod services;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
