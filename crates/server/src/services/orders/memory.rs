//! In-memory order store for tests.
//!
//! A transaction works on a private copy of the data and publishes it on
//! commit, so dropping it discards every statement.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;

use energy_maximum_core::{AdminId, CustomerId, OrderId, OrderStatus};

use super::{OrderStore, OrderTransaction};
use crate::db::RepositoryError;
use crate::models::{
    NewOrderItem, Order, OrderFilter, OrderItem, OrderPatch, OrderWithItems, StatusCounts,
};

#[derive(Debug, Default, Clone)]
struct Snapshot {
    last_id: i64,
    orders: BTreeMap<OrderId, Order>,
    items: BTreeMap<OrderId, Vec<OrderItem>>,
}

impl Snapshot {
    fn live_mut(&mut self, id: OrderId) -> Option<&mut Order> {
        self.orders.get_mut(&id).filter(|o| !o.is_deleted())
    }
}

#[derive(Default)]
pub(crate) struct MemoryOrderStore {
    state: Arc<Mutex<Snapshot>>,
    /// Make the next item inserts fail.
    pub(crate) fail_item_insert: Arc<AtomicBool>,
    /// Sleep this long inside the item insert.
    pub(crate) stall: Arc<Mutex<Option<Duration>>>,
    /// When set, orders may only reference these customers.
    customers: Arc<Mutex<Option<BTreeSet<CustomerId>>>>,
}

impl MemoryOrderStore {
    pub(crate) fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    /// Reject orders for any customer not in `ids`, like the foreign key does.
    pub(crate) fn known_customers(&self, ids: &[CustomerId]) {
        *self.customers.lock().unwrap() = Some(ids.iter().copied().collect());
    }
}

pub(crate) struct MemoryTransaction {
    shared: Arc<Mutex<Snapshot>>,
    working: Snapshot,
    fail_item_insert: Arc<AtomicBool>,
    stall: Option<Duration>,
    customers: Option<BTreeSet<CustomerId>>,
}

impl MemoryTransaction {
    fn check_customer(&self, customer_id: CustomerId) -> Result<(), RepositoryError> {
        match &self.customers {
            Some(known) if !known.contains(&customer_id) => {
                Err(RepositoryError::MissingReference("customer".to_owned()))
            }
            _ => Ok(()),
        }
    }
}

impl OrderStore for MemoryOrderStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        let working = self.state.lock().unwrap().clone();
        let stall = *self.stall.lock().unwrap();
        let customers = self.customers.lock().unwrap().clone();
        Ok(MemoryTransaction {
            shared: Arc::clone(&self.state),
            working,
            fail_item_insert: Arc::clone(&self.fail_item_insert),
            stall,
            customers,
        })
    }

    async fn fetch(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .get(&id)
            .filter(|o| !o.is_deleted())
            .map(|order| OrderWithItems {
                order: order.clone(),
                items: state.items.get(&id).cloned().unwrap_or_default(),
            }))
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .orders
            .values()
            .rev()
            .filter(|o| !o.is_deleted())
            .filter(|o| filter.customer_id.is_none_or(|c| o.customer_id == c))
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .skip(usize::try_from(filter.page.offset()).unwrap())
            .take(usize::try_from(filter.page.limit()).unwrap())
            .cloned()
            .collect())
    }

    async fn count_by_status(&self, customer_id: CustomerId) -> Result<StatusCounts, RepositoryError> {
        let state = self.state.lock().unwrap();
        let mut counts = StatusCounts::default();
        for order in state
            .orders
            .values()
            .filter(|o| !o.is_deleted() && o.customer_id == customer_id)
        {
            counts.record(order.status, 1);
        }
        Ok(counts)
    }
}

impl OrderTransaction for MemoryTransaction {
    async fn insert_order(
        &mut self,
        customer_id: CustomerId,
        description: &str,
        total: Decimal,
    ) -> Result<Order, RepositoryError> {
        self.check_customer(customer_id)?;
        self.working.last_id += 1;
        let order = Order {
            id: OrderId::new(self.working.last_id),
            customer_id,
            description: description.to_owned(),
            total,
            status: OrderStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
            updated_id: None,
            deleted_at: None,
            deleted_id: None,
        };
        self.working.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn lock_order(&mut self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.working.live_mut(id).cloned())
    }

    async fn patch_order(
        &mut self,
        id: OrderId,
        patch: &OrderPatch,
        actor: AdminId,
    ) -> Result<Option<Order>, RepositoryError> {
        if let Some(customer_id) = patch.customer_id {
            self.check_customer(customer_id)?;
        }
        Ok(self.working.live_mut(id).map(|order| {
            patch.apply(order);
            order.updated_at = Some(Utc::now());
            order.updated_id = Some(actor);
            order.clone()
        }))
    }

    async fn set_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
        actor: AdminId,
    ) -> Result<Order, RepositoryError> {
        let order = self
            .working
            .live_mut(id)
            .ok_or(RepositoryError::NotFound)?;
        order.status = status;
        order.updated_at = Some(Utc::now());
        order.updated_id = Some(actor);
        Ok(order.clone())
    }

    async fn soft_delete(
        &mut self,
        id: OrderId,
        actor: AdminId,
    ) -> Result<Option<Order>, RepositoryError> {
        Ok(self.working.live_mut(id).map(|order| {
            order.deleted_at = Some(Utc::now());
            order.deleted_id = Some(actor);
            order.clone()
        }))
    }

    async fn delete_items(&mut self, id: OrderId) -> Result<u64, RepositoryError> {
        let removed = self.working.items.remove(&id).map_or(0, |v| v.len());
        Ok(removed as u64)
    }

    async fn insert_items(
        &mut self,
        id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        if self.fail_item_insert.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }

        let inserted: Vec<OrderItem> = items.iter().cloned().map(|i| i.into_item(id)).collect();
        self.working
            .items
            .entry(id)
            .or_default()
            .extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        *self.shared.lock().unwrap() = self.working;
        Ok(())
    }
}
