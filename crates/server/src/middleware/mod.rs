//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (`http_request` span)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. `TimeoutLayer` (whole-request deadline)
//!
//! Authentication is not a layer: handlers opt in with the
//! [`RequireAdmin`] / [`RequireCustomer`] extractors.

pub mod auth;
pub mod request_id;

pub use auth::{AuthRejection, RequireAdmin, RequireCustomer};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
