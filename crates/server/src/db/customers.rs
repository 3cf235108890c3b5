//! Customer repository.

use sqlx::PgPool;

use energy_maximum_core::{CustomerId, Principal};

use super::RepositoryError;
use crate::models::LoginRecord;

#[derive(sqlx::FromRow)]
struct CustomerLoginRow {
    id: CustomerId,
    password: String,
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a non-deleted customer by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self), fields(customer_id = %id))]
    pub async fn find_active_principal(
        &self,
        id: CustomerId,
    ) -> Result<Option<Principal>, RepositoryError> {
        let row: Option<(CustomerId,)> =
            sqlx::query_as("SELECT id FROM customers WHERE id = $1 AND deleted_at IS NULL")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(id,)| Principal::customer(id)))
    }

    /// Look up a non-deleted customer by phone for password login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[tracing::instrument(skip(self))]
    pub async fn find_login(&self, phone: &str) -> Result<Option<LoginRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerLoginRow>(
            "SELECT id, password FROM customers WHERE phone = $1 AND deleted_at IS NULL",
        )
        .bind(phone)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| LoginRecord {
            principal: Principal::customer(r.id),
            password_hash: r.password,
        }))
    }

    /// Record that the customer was just seen.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch_last_visit(&self, id: CustomerId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE customers SET last_visit = now() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}
