//! Role capability lookups.

use sqlx::PgPool;

use energy_maximum_core::{CapabilityKey, RoleId};

use super::RepositoryError;

/// Repository for role and role item reads.
pub struct RoleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RoleRepository<'a> {
    /// Create a new role repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Capability keys granted to a role, sorted and without duplicates.
    ///
    /// A soft-deleted role grants nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(role_id = %role_id))]
    pub async fn capabilities_for(
        &self,
        role_id: RoleId,
    ) -> Result<Vec<CapabilityKey>, RepositoryError> {
        let keys = sqlx::query_scalar::<_, CapabilityKey>(
            r"
            SELECT DISTINCT ri.module_item_key
            FROM role_items ri
            JOIN roles r ON r.id = ri.role_id
            WHERE ri.role_id = $1 AND r.deleted_at IS NULL
            ORDER BY ri.module_item_key
            ",
        )
        .bind(role_id)
        .fetch_all(self.pool)
        .await?;

        Ok(keys)
    }
}
