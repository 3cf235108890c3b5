//! Energy Maximum server library.
//!
//! HTTP API for the catalog backend, serving two audiences from one process:
//! administrators (back office) and customers (storefront). The binary in
//! `main.rs` only wires configuration, telemetry, and the listener; everything
//! else lives here so it can be tested and reused by the CLI.
//!
//! # Layers
//!
//! - [`services::token`] signs and verifies access tokens
//! - [`services::session`] turns a token into a [`energy_maximum_core::Principal`],
//!   cache first
//! - [`services::orders`] runs order writes as single transactions
//! - [`db`] holds the `PostgreSQL` repositories and stores
//! - [`routes`] and [`middleware`] expose it all over axum

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
