//! Order transaction processor.
//!
//! Every write runs in one store transaction: the header and its items are
//! committed together or not at all. Item replacement is delete-all then
//! insert-all inside that transaction. Status changes go through
//! [`OrderStatus::transition`] against a row locked for the duration.
//!
//! Each operation runs under a deadline. When it expires the in-flight
//! future is dropped, which drops the open transaction and rolls it back.

mod error;
#[cfg(test)]
pub(crate) mod memory;

use std::future::Future;
use std::time::Duration;

use rust_decimal::Decimal;

use energy_maximum_core::{AdminId, CustomerId, OrderId, OrderStatus};

pub use error::OrderError;

use crate::db::RepositoryError;
use crate::models::{
    CustomerOrders, NewOrder, NewOrderItem, Order, OrderFilter, OrderItem, OrderPatch,
    OrderWithItems, Page, StatusCounts,
};

// =============================================================================
// Store Seams
// =============================================================================

/// Storage for orders. Writes go through [`OrderTransaction`].
pub trait OrderStore: Send + Sync {
    /// Transaction handle. Dropping it without [`OrderTransaction::commit`] rolls back.
    type Tx: OrderTransaction;

    /// Open a transaction on one connection.
    fn begin(&self) -> impl Future<Output = Result<Self::Tx, RepositoryError>> + Send;

    /// Read a live order and its items.
    fn fetch(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<OrderWithItems>, RepositoryError>> + Send;

    /// Live headers matching `filter`, newest first.
    fn list(
        &self,
        filter: &OrderFilter,
    ) -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;

    /// Live orders of one customer, counted per status.
    fn count_by_status(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<StatusCounts, RepositoryError>> + Send;
}

/// Statements available inside an order transaction.
///
/// Methods that target an existing order ignore soft-deleted rows and
/// return `None` for them.
pub trait OrderTransaction: Send {
    /// Insert a header with status `Active`.
    fn insert_order(
        &mut self,
        customer_id: CustomerId,
        description: &str,
        total: Decimal,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Lock a live header for update.
    fn lock_order(
        &mut self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// Apply the present fields of `patch` and stamp `updated_at` / `updated_id`.
    fn patch_order(
        &mut self,
        id: OrderId,
        patch: &OrderPatch,
        actor: AdminId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// Write `status`, `updated_at` and `updated_id` in one statement.
    fn set_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
        actor: AdminId,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Stamp `deleted_at` / `deleted_id`.
    fn soft_delete(
        &mut self,
        id: OrderId,
        actor: AdminId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// Remove every item of the order, returning how many were removed.
    fn delete_items(
        &mut self,
        id: OrderId,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Bulk insert items. An empty slice inserts nothing.
    fn insert_items(
        &mut self,
        id: OrderId,
        items: &[NewOrderItem],
    ) -> impl Future<Output = Result<Vec<OrderItem>, RepositoryError>> + Send;

    /// Make every statement of the transaction visible.
    fn commit(self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

// =============================================================================
// Processor
// =============================================================================

/// Drives order writes through a store, one transaction per operation.
#[derive(Clone)]
pub struct OrderProcessor<S> {
    store: S,
    deadline: Duration,
}

impl<S: OrderStore> OrderProcessor<S> {
    /// Create a processor whose operations each get `deadline` to finish.
    #[must_use]
    pub const fn new(store: S, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Create an order and its items atomically.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if any write fails, or
    /// `OrderError::Cancelled` if the deadline expires.
    #[tracing::instrument(skip_all, fields(customer_id = %order.customer_id, items = order.items.len()))]
    pub async fn create(&self, order: NewOrder) -> Result<OrderWithItems, OrderError> {
        self.within_deadline(async {
            let mut tx = self.store.begin().await?;
            let header = tx
                .insert_order(order.customer_id, &order.description, order.total)
                .await?;
            let items = tx.insert_items(header.id, &order.items).await?;
            tx.commit().await?;

            tracing::info!(order_id = %header.id, "order created");
            Ok(OrderWithItems {
                order: header,
                items,
            })
        })
        .await
    }

    /// Patch the header and replace every item atomically.
    ///
    /// An empty `items` leaves the order with no items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for a missing or soft-deleted order,
    /// `OrderError::Repository` if any write fails, or `OrderError::Cancelled`.
    #[tracing::instrument(skip(self, patch, items), fields(order_id = %id, actor = %actor, items = items.len()))]
    pub async fn update(
        &self,
        id: OrderId,
        patch: OrderPatch,
        items: Vec<NewOrderItem>,
        actor: AdminId,
    ) -> Result<OrderWithItems, OrderError> {
        self.within_deadline(async {
            let mut tx = self.store.begin().await?;
            let header = tx
                .patch_order(id, &patch, actor)
                .await?
                .ok_or(OrderError::NotFound)?;
            let removed = tx.delete_items(id).await?;
            let items = tx.insert_items(id, &items).await?;
            tx.commit().await?;

            tracing::info!(removed, inserted = items.len(), "order updated");
            Ok(OrderWithItems {
                order: header,
                items,
            })
        })
        .await
    }

    /// Move an order to `target` if the state machine allows it.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound`, `OrderError::Conflict` for a rejected
    /// transition, `OrderError::Repository`, or `OrderError::Cancelled`.
    #[tracing::instrument(skip(self), fields(order_id = %id, actor = %actor))]
    pub async fn transition(
        &self,
        id: OrderId,
        target: OrderStatus,
        actor: AdminId,
    ) -> Result<Order, OrderError> {
        self.within_deadline(async {
            let mut tx = self.store.begin().await?;
            let current = tx.lock_order(id).await?.ok_or(OrderError::NotFound)?;
            let next = current.status.transition(target)?;
            let order = tx.set_status(id, next, actor).await?;
            tx.commit().await?;

            tracing::info!(from = %current.status, to = %next, "order status changed");
            Ok(order)
        })
        .await
    }

    /// Soft delete an order, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order is missing or already
    /// deleted, `OrderError::Repository`, or `OrderError::Cancelled`.
    #[tracing::instrument(skip(self), fields(order_id = %id, actor = %actor))]
    pub async fn soft_delete(&self, id: OrderId, actor: AdminId) -> Result<Order, OrderError> {
        self.within_deadline(async {
            let mut tx = self.store.begin().await?;
            let order = tx
                .soft_delete(id, actor)
                .await?
                .ok_or(OrderError::NotFound)?;
            tx.commit().await?;
            Ok(order)
        })
        .await
    }

    /// Read a live order with its items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound`, `OrderError::Repository`, or `OrderError::Cancelled`.
    pub async fn get(&self, id: OrderId) -> Result<OrderWithItems, OrderError> {
        self.within_deadline(async { self.store.fetch(id).await?.ok_or(OrderError::NotFound) })
            .await
    }

    /// List live orders matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` or `OrderError::Cancelled`.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>, OrderError> {
        self.within_deadline(async { Ok(self.store.list(&filter).await?) })
            .await
    }

    /// One page of a customer's orders plus how many they have in each status.
    ///
    /// `status` narrows the page only; the counts always cover every live
    /// order of the customer.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` or `OrderError::Cancelled`.
    #[tracing::instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        status: Option<OrderStatus>,
        page: Page,
    ) -> Result<CustomerOrders, OrderError> {
        self.within_deadline(async {
            let counts = self.store.count_by_status(customer_id).await?;
            let filter = OrderFilter {
                customer_id: Some(customer_id),
                status,
                page,
            };
            let orders = self.store.list(&filter).await?;
            Ok(CustomerOrders {
                page,
                counts,
                orders,
            })
        })
        .await
    }

    async fn within_deadline<T>(
        &self,
        op: impl Future<Output = Result<T, OrderError>>,
    ) -> Result<T, OrderError> {
        tokio::time::timeout(self.deadline, op).await.map_err(|_| {
            tracing::warn!(deadline_ms = %self.deadline.as_millis(), "order operation cancelled");
            OrderError::Cancelled
        })?
    }
}
