//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::InventoryStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the storage backend chosen at startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn InventoryStore>,
}

impl AppState {
    /// Create a new application state around a storage backend
    /// (`PostgreSQL` or in-memory).
    #[must_use]
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store }),
        }
    }

    /// Get the storage backend.
    #[must_use]
    pub fn store(&self) -> &dyn InventoryStore {
        self.inner.store.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryInventoryStore;

    #[tokio::test]
    async fn test_clones_share_one_store() {
        let state = AppState::new(Arc::new(MemoryInventoryStore::new()));
        let clone = state.clone();

        state
            .store()
            .create_location(&stockbook_core::NewLocation {
                id: stockbook_core::LocationId::new("WH1"),
                name: "Main".to_owned(),
                address: None,
            })
            .await
            .unwrap();

        assert_eq!(clone.store().counts().await.unwrap().locations, 1);
    }
}
