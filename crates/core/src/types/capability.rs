//! Capability keys granted through roles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque key naming one module or action a role is allowed to use.
///
/// The backend does not interpret these; they are returned to clients to
/// drive which screens are shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
pub struct CapabilityKey(String);

impl CapabilityKey {
    /// Wrap a raw key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CapabilityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
