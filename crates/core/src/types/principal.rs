//! Principal identities resolved from access tokens.
//!
//! A principal is either an administrator or a customer. Its [`PrincipalKey`]
//! is the textual `"<kind>:<id>"` form used both as the token subject and as
//! the principal cache key.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::id::{AdminId, CustomerId, RoleId};

/// Errors that can occur when parsing a token subject into a [`PrincipalKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubjectError {
    /// The subject string is empty.
    #[error("token subject is empty")]
    Empty,
    /// The kind prefix is not `admin` or `customer`.
    #[error("unknown principal kind: {0}")]
    UnknownKind(String),
    /// The id part is not a positive integer.
    #[error("invalid principal id: {0}")]
    InvalidId(String),
}

/// Which audience a principal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    /// Back-office administrator.
    Admin,
    /// End customer of the storefront.
    Customer,
}

impl PrincipalKind {
    /// The prefix used in subjects and cache keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a principal: kind plus row id.
///
/// ## Format
///
/// - `admin:<id>` and `customer:<id>` are the canonical forms.
/// - A bare `<id>` is read as an admin subject.
///
/// ## Examples
///
/// ```
/// use energy_maximum_core::{PrincipalKey, PrincipalKind};
///
/// let key: PrincipalKey = "customer:42".parse().unwrap();
/// assert_eq!(key.kind(), PrincipalKind::Customer);
/// assert_eq!(key.id(), 42);
///
/// let legacy: PrincipalKey = "7".parse().unwrap();
/// assert_eq!(legacy.to_string(), "admin:7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrincipalKey {
    kind: PrincipalKind,
    id: i64,
}

impl PrincipalKey {
    /// Create a key for an administrator.
    #[must_use]
    pub const fn admin(id: AdminId) -> Self {
        Self {
            kind: PrincipalKind::Admin,
            id: id.as_i64(),
        }
    }

    /// Create a key for a customer.
    #[must_use]
    pub const fn customer(id: CustomerId) -> Self {
        Self {
            kind: PrincipalKind::Customer,
            id: id.as_i64(),
        }
    }

    /// The principal kind.
    #[must_use]
    pub const fn kind(&self) -> PrincipalKind {
        self.kind
    }

    /// The backing row id.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }
}

impl fmt::Display for PrincipalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for PrincipalKey {
    type Err = SubjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SubjectError::Empty);
        }

        let (kind, raw_id) = match s.split_once(':') {
            Some(("admin", id)) => (PrincipalKind::Admin, id),
            Some(("customer", id)) => (PrincipalKind::Customer, id),
            Some((other, _)) => return Err(SubjectError::UnknownKind(other.to_owned())),
            None => (PrincipalKind::Admin, s),
        };

        let id = raw_id
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| SubjectError::InvalidId(raw_id.to_owned()))?;

        Ok(Self { kind, id })
    }
}

/// An authenticated identity attached to a request.
///
/// This is the snapshot stored in the principal cache, so it only carries the
/// minimal identity projection of the backing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Admin or customer.
    pub kind: PrincipalKind,
    /// Row id in the `admins` or `customers` table.
    pub id: i64,
    /// Role assigned to an administrator, if any.
    pub role_id: Option<RoleId>,
    /// Whether an administrator has superuser rights. Always false for customers.
    #[serde(default)]
    pub is_superuser: bool,
}

impl Principal {
    /// Build an administrator principal.
    #[must_use]
    pub const fn admin(id: AdminId, role_id: Option<RoleId>, is_superuser: bool) -> Self {
        Self {
            kind: PrincipalKind::Admin,
            id: id.as_i64(),
            role_id,
            is_superuser,
        }
    }

    /// Build a customer principal.
    #[must_use]
    pub const fn customer(id: CustomerId) -> Self {
        Self {
            kind: PrincipalKind::Customer,
            id: id.as_i64(),
            role_id: None,
            is_superuser: false,
        }
    }

    /// The cache key / token subject for this principal.
    #[must_use]
    pub const fn key(&self) -> PrincipalKey {
        PrincipalKey {
            kind: self.kind,
            id: self.id,
        }
    }

    /// The admin id, if this is an administrator.
    #[must_use]
    pub const fn admin_id(&self) -> Option<AdminId> {
        match self.kind {
            PrincipalKind::Admin => Some(AdminId::new(self.id)),
            PrincipalKind::Customer => None,
        }
    }

    /// The customer id, if this is a customer.
    #[must_use]
    pub const fn customer_id(&self) -> Option<CustomerId> {
        match self.kind {
            PrincipalKind::Customer => Some(CustomerId::new(self.id)),
            PrincipalKind::Admin => None,
        }
    }
}
