use std::sync::Arc;

use crate::store::DocumentStore;

pub mod config;
pub mod error;
pub mod modules;
pub mod router;
pub mod services;
pub mod store;

#[derive(Clone)]
pub struct AppState {
    /// `None` when the database could not be reached at startup.
    pub store: Option<Arc<dyn DocumentStore>>,
}

impl AppState {
    pub fn connected(store: Arc<dyn DocumentStore>) -> Self {
        Self { store: Some(store) }
    }

    pub fn disconnected() -> Self {
        Self { store: None }
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&dyn DocumentStore> {
        self.store.as_deref()
    }
}
