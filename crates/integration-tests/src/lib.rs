//! Integration test helpers for the Energy Maximum backend.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate the database and start the server
//! cargo run -p energy-maximum-cli -- migrate
//! cargo run -p energy-maximum-server
//!
//! # Run the ignored integration tests
//! cargo test -p energy-maximum-integration-tests -- --ignored
//! ```
//!
//! The tests seed their own accounts straight into `DATABASE_URL` (with
//! unique names) and then drive the running server over HTTP at
//! `SERVER_BASE_URL`.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use energy_maximum_core::{AdminId, CustomerId};
use energy_maximum_server::db::AdminRepository;
use energy_maximum_server::services::password::hash_password;

/// Password given to every seeded account.
pub const TEST_PASSWORD: &str = "integration-password";

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SERVER_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// A client plus a direct database connection for seeding.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub pool: PgPool,
}

impl TestContext {
    /// Connect to the database named by `DATABASE_URL`.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to database");

        Self {
            client: Client::new(),
            base_url: base_url(),
            pool,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Insert an active admin with a unique username.
    pub async fn seed_admin(&self, is_superuser: bool) -> (AdminId, String) {
        let username = format!("it-admin-{}", Uuid::new_v4().simple());
        let hash = hash_password(TEST_PASSWORD).unwrap();
        let id = AdminRepository::new(&self.pool)
            .create(&username, &hash, is_superuser, None)
            .await
            .expect("Failed to seed admin");
        (id, username)
    }

    /// Insert a customer with a unique phone number.
    pub async fn seed_customer(&self) -> (CustomerId, String) {
        let phone = format!("+998{:09}", Uuid::new_v4().as_u128() % 1_000_000_000);
        let hash = hash_password(TEST_PASSWORD).unwrap();
        let (id,): (CustomerId,) = sqlx::query_as(
            "INSERT INTO customers (name, phone, password) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind("Integration Customer")
        .bind(&phone)
        .bind(&hash)
        .fetch_one(&self.pool)
        .await
        .expect("Failed to seed customer");
        (id, phone)
    }

    /// Log in as an admin and return the access token.
    pub async fn admin_token(&self, username: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/admin/auth"))
            .json(&json!({ "username": username, "password": TEST_PASSWORD }))
            .send()
            .await
            .expect("Failed to send admin login");
        token_from(resp).await
    }

    /// Log in as a customer and return the access token.
    pub async fn customer_token(&self, phone: &str) -> String {
        let resp = self
            .client
            .post(self.url("/api/customer/login"))
            .json(&json!({ "phone": phone, "password": TEST_PASSWORD }))
            .send()
            .await
            .expect("Failed to send customer login");
        token_from(resp).await
    }
}

async fn token_from(resp: Response) -> String {
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    body["accessToken"].as_str().unwrap().to_string()
}
