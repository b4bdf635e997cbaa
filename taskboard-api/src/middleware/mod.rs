/// Custom tower middleware for the API server
///
/// - `security`: Security response headers (HSTS in production)
///
/// Bearer authentication lives in `app` as `from_fn_with_state` layers.

pub mod security;
