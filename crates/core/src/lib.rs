//! Energy Maximum Core - Shared domain types.
//!
//! This crate provides the types shared by the catalog backend components:
//! - `server` - HTTP API for administrators and customers
//! - `cli` - Command-line tools for migrations and operations
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. The order status state machine lives here so it can be
//! checked independently of storage.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, principals, capability keys, and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
