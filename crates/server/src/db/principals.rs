//! `PostgreSQL` principal store used by the session resolver.

use sqlx::PgPool;

use energy_maximum_core::{AdminId, CustomerId, Principal, PrincipalKey, PrincipalKind};

use super::{AdminRepository, CustomerRepository, RepositoryError};
use crate::services::session::PrincipalStore;

/// Looks up admins and customers by principal key.
#[derive(Clone)]
pub struct PgPrincipalStore {
    pool: PgPool,
}

impl PgPrincipalStore {
    /// Create a store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PrincipalStore for PgPrincipalStore {
    async fn find_active(&self, key: PrincipalKey) -> Result<Option<Principal>, RepositoryError> {
        match key.kind() {
            PrincipalKind::Admin => {
                AdminRepository::new(&self.pool)
                    .find_active_principal(AdminId::new(key.id()))
                    .await
            }
            PrincipalKind::Customer => {
                CustomerRepository::new(&self.pool)
                    .find_active_principal(CustomerId::new(key.id()))
                    .await
            }
        }
    }

    async fn touch_last_visit(&self, key: PrincipalKey) -> Result<(), RepositoryError> {
        match key.kind() {
            PrincipalKind::Admin => {
                AdminRepository::new(&self.pool)
                    .touch_last_visit(AdminId::new(key.id()))
                    .await
            }
            PrincipalKind::Customer => {
                CustomerRepository::new(&self.pool)
                    .touch_last_visit(CustomerId::new(key.id()))
                    .await
            }
        }
    }
}
