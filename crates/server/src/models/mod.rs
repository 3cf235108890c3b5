//! Domain models for the server.
//!
//! These are the records handed between repositories, services, and routes.
//! Row types used for decoding live next to their queries in [`crate::db`].

pub mod account;
pub mod order;

pub use account::LoginRecord;
pub use order::{
    CustomerOrders, NewOrder, NewOrderItem, Order, OrderFilter, OrderItem, OrderPatch,
    OrderWithItems, Page, StatusCounts,
};
