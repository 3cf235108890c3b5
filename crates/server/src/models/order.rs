//! Order header and line item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use energy_maximum_core::{AdminId, CustomerId, OrderId, OrderStatus, ProductId};

/// An order header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub description: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Admin who last changed the order.
    pub updated_id: Option<AdminId>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_id: Option<AdminId>,
}

impl Order {
    /// Whether the order has been soft deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A stored line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub order_id: OrderId,
    pub price: Decimal,
    pub amount: i32,
    pub item_id: ProductId,
}

/// A line item as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub price: Decimal,
    pub amount: i32,
    pub item_id: ProductId,
}

impl NewOrderItem {
    /// Attach the item to an order.
    #[must_use]
    pub fn into_item(self, order_id: OrderId) -> OrderItem {
        OrderItem {
            order_id,
            price: self.price,
            amount: self.amount,
            item_id: self.item_id,
        }
    }
}

/// Everything needed to create an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub description: String,
    pub total: Decimal,
    pub items: Vec<NewOrderItem>,
}

/// Partial header update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPatch {
    pub customer_id: Option<CustomerId>,
    pub description: Option<String>,
    pub total: Option<Decimal>,
}

impl OrderPatch {
    /// Apply the present fields to `order`.
    pub fn apply(&self, order: &mut Order) {
        if let Some(customer_id) = self.customer_id {
            order.customer_id = customer_id;
        }
        if let Some(description) = &self.description {
            order.description.clone_from(description);
        }
        if let Some(total) = self.total {
            order.total = total;
        }
    }
}

/// A header together with its items, as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// One-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    pub const DEFAULT_SIZE: u32 = 10;
    pub const MAX_SIZE: u32 = 100;

    /// Absent or zero values fall back to the first page of [`Page::DEFAULT_SIZE`].
    /// The size is capped at [`Page::MAX_SIZE`].
    #[must_use]
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = page_size
            .filter(|s| *s > 0)
            .unwrap_or(Self::DEFAULT_SIZE)
            .min(Self::MAX_SIZE);
        Self { page, page_size }
    }

    /// Rows per page, as a SQL `LIMIT`.
    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.page_size)
    }

    /// Rows skipped before this page, as a SQL `OFFSET`.
    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Which live orders a listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub customer_id: Option<CustomerId>,
    pub status: Option<OrderStatus>,
    pub page: Page,
}

/// Number of live orders in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub active_count: i64,
    pub finished_count: i64,
    pub cancelled_count: i64,
    /// Sum of the three.
    pub count: i64,
}

impl StatusCounts {
    /// Add `n` orders in `status`.
    pub const fn record(&mut self, status: OrderStatus, n: i64) {
        match status {
            OrderStatus::Active => self.active_count += n,
            OrderStatus::Finished => self.finished_count += n,
            OrderStatus::Cancelled => self.cancelled_count += n,
        }
        self.count += n;
    }
}

/// A page of one customer's orders with the customer's per-status counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerOrders {
    #[serde(flatten)]
    pub page: Page,
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub orders: Vec<Order>,
}
