//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod token;

/// Read `DATABASE_URL`, loading `.env` first.
pub(crate) fn database_url() -> Option<String> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").ok()
}
