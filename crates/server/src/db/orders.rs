//! `PostgreSQL` order store.
//!
//! Implements the processor seams over a pooled connection. A
//! [`PgOrderTransaction`] owns one `sqlx` transaction for its whole life;
//! dropping it without commit rolls back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use energy_maximum_core::{AdminId, CustomerId, OrderId, OrderStatus, ProductId};

use super::RepositoryError;
use crate::models::{
    NewOrderItem, Order, OrderFilter, OrderItem, OrderPatch, OrderWithItems, StatusCounts,
};
use crate::services::orders::{OrderStore, OrderTransaction};

const ORDER_COLUMNS: &str = "id, customer_id, description, total, status, created_at, \
                             updated_at, updated_id, deleted_at, deleted_id";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_id: CustomerId,
    description: String,
    total: Decimal,
    status: i16,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    updated_id: Option<AdminId>,
    deleted_at: Option<DateTime<Utc>>,
    deleted_id: Option<AdminId>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::try_from(row.status).map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            customer_id: row.customer_id,
            description: row.description,
            total: row.total,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            updated_id: row.updated_id,
            deleted_at: row.deleted_at,
            deleted_id: row.deleted_id,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    price: Decimal,
    amount: i32,
    item_id: ProductId,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            order_id: row.order_id,
            price: row.price,
            amount: row.amount,
            item_id: row.item_id,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Order store backed by the connection pool.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl OrderStore for PgOrderStore {
    type Tx = PgOrderTransaction;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        Ok(PgOrderTransaction {
            tx: self.pool.begin().await?,
        })
    }

    async fn fetch(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemRow>(
            r"
            SELECT order_id, price, amount, item_id
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderWithItems {
            order: row.try_into()?,
            items: items.into_iter().map(Into::into).collect(),
        }))
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE deleted_at IS NULL"
        ));
        if let Some(customer_id) = filter.customer_id {
            builder.push(" AND customer_id = ").push_bind(customer_id);
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        builder
            .push(" ORDER BY id DESC LIMIT ")
            .push_bind(filter.page.limit())
            .push(" OFFSET ")
            .push_bind(filter.page.offset());

        let rows = builder
            .build_query_as::<OrderRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_by_status(&self, customer_id: CustomerId) -> Result<StatusCounts, RepositoryError> {
        let rows = sqlx::query_as::<_, (i16, i64)>(
            r"
            SELECT status, COUNT(*)
            FROM orders
            WHERE customer_id = $1 AND deleted_at IS NULL
            GROUP BY status
            ",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (code, n) in rows {
            let status = OrderStatus::try_from(code)
                .map_err(|e| RepositoryError::DataCorruption(format!("orders.status: {e}")))?;
            counts.record(status, n);
        }
        Ok(counts)
    }
}

/// One open order transaction.
pub struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

impl OrderTransaction for PgOrderTransaction {
    async fn insert_order(
        &mut self,
        customer_id: CustomerId,
        description: &str,
        total: Decimal,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (customer_id, description, total, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(customer_id)
        .bind(description)
        .bind(total)
        .bind(OrderStatus::Active)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_reference(e, "customer"))?;

        row.try_into()
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn patch_order(
        &mut self,
        id: OrderId,
        patch: &OrderPatch,
        actor: AdminId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders
            SET customer_id = COALESCE($2, customer_id),
                description = COALESCE($3, description),
                total = COALESCE($4, total),
                updated_at = now(),
                updated_id = $5
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(patch.customer_id)
        .bind(patch.description.as_deref())
        .bind(patch.total)
        .bind(actor)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| RepositoryError::from_reference(e, "customer"))?;

        row.map(TryInto::try_into).transpose()
    }

    async fn set_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
        actor: AdminId,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders
            SET status = $2, updated_at = now(), updated_id = $3
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .bind(actor)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn soft_delete(
        &mut self,
        id: OrderId,
        actor: AdminId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            UPDATE orders
            SET deleted_at = now(), deleted_id = $2
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(actor)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn delete_items(&mut self, id: OrderId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert_items(
        &mut self,
        id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder =
            QueryBuilder::<Postgres>::new("INSERT INTO order_items (order_id, price, amount, item_id) ");
        builder.push_values(items, |mut row, item| {
            row.push_bind(id)
                .push_bind(item.price)
                .push_bind(item.amount)
                .push_bind(item.item_id);
        });
        builder.push(" RETURNING order_id, price, amount, item_id");

        let rows = builder
            .build_query_as::<OrderItemRow>()
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
