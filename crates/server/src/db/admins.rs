//! Admin repository.
//!
//! A row counts as a live principal only while `deleted_at IS NULL` and
//! `is_active` holds. Every lookup used for authentication applies both.

use sqlx::PgPool;

use energy_maximum_core::{AdminId, Principal, RoleId};

use super::RepositoryError;
use crate::models::LoginRecord;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Identity projection of an admin row.
#[derive(Debug, sqlx::FromRow)]
struct AdminIdentityRow {
    id: AdminId,
    role_id: Option<RoleId>,
    is_superuser: bool,
}

impl From<AdminIdentityRow> for Principal {
    fn from(row: AdminIdentityRow) -> Self {
        Self::admin(row.id, row.role_id, row.is_superuser)
    }
}

#[derive(sqlx::FromRow)]
struct AdminLoginRow {
    id: AdminId,
    role_id: Option<RoleId>,
    is_superuser: bool,
    password: String,
}

impl From<AdminLoginRow> for LoginRecord {
    fn from(row: AdminLoginRow) -> Self {
        Self {
            principal: Principal::admin(row.id, row.role_id, row.is_superuser),
            password_hash: row.password,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin database operations.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a live admin by id, projecting only identity fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(admin_id = %id))]
    pub async fn find_active_principal(
        &self,
        id: AdminId,
    ) -> Result<Option<Principal>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminIdentityRow>(
            r"
            SELECT id, role_id, is_superuser
            FROM admins
            WHERE id = $1 AND deleted_at IS NULL AND is_active
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Look up a live admin by username for password login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self))]
    pub async fn find_login(&self, username: &str) -> Result<Option<LoginRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminLoginRow>(
            r"
            SELECT id, role_id, is_superuser, password
            FROM admins
            WHERE username = $1 AND deleted_at IS NULL AND is_active
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Record that the admin was just seen.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch_last_visit(&self, id: AdminId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE admins SET last_visit = now() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Activate or deactivate a live admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live admin has this id.
    /// Returns `RepositoryError::Database` if the update fails.
    #[tracing::instrument(skip(self), fields(admin_id = %id))]
    pub async fn set_active(&self, id: AdminId, active: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE admins
            SET is_active = $2, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .bind(active)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Soft delete a live admin. The row is also deactivated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live admin has this id.
    /// Returns `RepositoryError::Database` if the update fails.
    #[tracing::instrument(skip(self), fields(admin_id = %id))]
    pub async fn soft_delete(&self, id: AdminId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE admins
            SET deleted_at = now(), is_active = false, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Create an admin with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a live admin already uses the username.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        is_superuser: bool,
        role_id: Option<RoleId>,
    ) -> Result<AdminId, RepositoryError> {
        let (id,): (AdminId,) = sqlx::query_as(
            r"
            INSERT INTO admins (username, password, is_superuser, role_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(username)
        .bind(password_hash)
        .bind(is_superuser)
        .bind(role_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "username"))?;

        Ok(id)
    }
}
