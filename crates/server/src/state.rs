//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::{PgOrderStore, PgPrincipalStore};
use crate::services::orders::OrderProcessor;
use crate::services::principal_cache::PrincipalCache;
use crate::services::session::SessionResolver;
use crate::services::token::{TokenCodec, TokenError};

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    sessions: SessionResolver<PgPrincipalStore>,
    orders: OrderProcessor<PgOrderStore>,
}

impl AppState {
    /// Build the state, decoding the token keys from `config`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the configured keys do not decode.
    pub fn new(config: ServerConfig, pool: PgPool) -> Result<Self, TokenError> {
        let codec = config.access_token.codec()?;
        Ok(Self::with_codec(config, pool, codec))
    }

    /// Build the state around an existing codec.
    #[must_use]
    pub fn with_codec(config: ServerConfig, pool: PgPool, codec: TokenCodec) -> Self {
        let cache = PrincipalCache::new(config.principal_cache_ttl, config.principal_cache_capacity);
        let sessions = SessionResolver::new(codec, cache, PgPrincipalStore::new(pool.clone()));
        let orders = OrderProcessor::new(PgOrderStore::new(pool.clone()), config.order_deadline);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                sessions,
                orders,
            }),
        }
    }

    /// Server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Principal resolution for the auth extractors.
    #[must_use]
    pub fn sessions(&self) -> &SessionResolver<PgPrincipalStore> {
        &self.inner.sessions
    }

    /// Order processor.
    #[must_use]
    pub fn orders(&self) -> &OrderProcessor<PgOrderStore> {
        &self.inner.orders
    }

    /// Token codec used for login and verification.
    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        self.inner.sessions.codec()
    }
}
