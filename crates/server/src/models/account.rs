//! Login projections of admin and customer rows.

use energy_maximum_core::{Principal, RoleId};

/// What a password login needs from a backing row.
///
/// The password hash never leaves the login handler.
#[derive(Clone)]
pub struct LoginRecord {
    /// The principal the row resolves to.
    pub principal: Principal,
    /// Argon2 PHC string.
    pub password_hash: String,
}

impl LoginRecord {
    /// Role of the principal, if any.
    #[must_use]
    pub const fn role_id(&self) -> Option<RoleId> {
        self.principal.role_id
    }
}

impl std::fmt::Debug for LoginRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRecord")
            .field("principal", &self.principal)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}
