//! Business services.
//!
//! - [`token`] - Issue and verify access tokens
//! - [`principal_cache`] - TTL cache of resolved principals
//! - [`session`] - Credential to principal resolution
//! - [`orders`] - Transactional order writes and status transitions
//! - [`password`] - Argon2 hashing for logins

pub mod orders;
pub mod password;
pub mod principal_cache;
pub mod session;
pub mod token;
