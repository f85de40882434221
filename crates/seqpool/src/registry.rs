//! Named connection managers, for code that routes by database name.

use crate::manager::ConnectionManager;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe map from a name to a shared [`ConnectionManager`].
#[derive(Debug, Default)]
pub struct ConnectionManagerRegistry {
    managers: RwLock<HashMap<String, Arc<ConnectionManager>>>,
}

impl ConnectionManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `manager` under `name`, returning whatever it replaced.
    pub fn register(
        &self,
        name: impl Into<String>,
        manager: Arc<ConnectionManager>,
    ) -> Option<Arc<ConnectionManager>> {
        let name = name.into();
        tracing::debug!(name = %name, identifier = %manager.database_identifier(), "registered connection manager");
        self.managers.write().unwrap().insert(name, manager)
    }

    pub fn get(&self, name: &str) -> Option<Arc<ConnectionManager>> {
        self.managers.read().unwrap().get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<Arc<ConnectionManager>> {
        self.managers.write().unwrap().remove(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.managers.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.managers.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.managers.write().unwrap().clear();
    }
}
