//! In-memory principal store for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use energy_maximum_core::{Principal, PrincipalKey};

use super::PrincipalStore;
use crate::db::RepositoryError;

/// Rows present in `active` are live; everything else is treated as gone.
#[derive(Default)]
pub(crate) struct MemoryPrincipalStore {
    active: Mutex<HashMap<PrincipalKey, Principal>>,
    pub(crate) lookups: AtomicUsize,
    pub(crate) touches: AtomicUsize,
    pub(crate) fail_lookup: AtomicBool,
    pub(crate) fail_touch: AtomicBool,
}

impl MemoryPrincipalStore {
    pub(crate) fn insert(&self, principal: Principal) {
        self.active
            .lock()
            .unwrap()
            .insert(principal.key(), principal);
    }

    pub(crate) fn deactivate(&self, key: &PrincipalKey) {
        self.active.lock().unwrap().remove(key);
    }
}

impl PrincipalStore for MemoryPrincipalStore {
    async fn find_active(&self, key: PrincipalKey) -> Result<Option<Principal>, RepositoryError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.active.lock().unwrap().get(&key).cloned())
    }

    async fn touch_last_visit(&self, _key: PrincipalKey) -> Result<(), RepositoryError> {
        self.touches.fetch_add(1, Ordering::SeqCst);
        if self.fail_touch.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}
