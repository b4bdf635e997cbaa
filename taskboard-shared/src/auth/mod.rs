/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and signup strength rules
/// - [`jwt`]: HS256 access/refresh tokens bound to a session generation
/// - [`middleware`]: Bearer header parsing and session resolution
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::jwt::issue_token_pair;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("plum-orbit-42")?;
/// assert!(verify_password("plum-orbit-42", &hash)?);
///
/// let tokens = issue_token_pair(Uuid::new_v4(), 0, "a-secret-that-is-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
