//! Core types for the catalog backend.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod capability;
pub mod id;
pub mod principal;
pub mod status;

pub use capability::CapabilityKey;
pub use id::*;
pub use principal::{Principal, PrincipalKey, PrincipalKind, SubjectError};
pub use status::{OrderStatus, TransitionRejected, UnknownStatus};
