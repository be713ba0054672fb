//! Per-module registry of published method settings.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::settings::InvocationSettings;

/// Registry of method settings published into one module.
///
/// Cloning yields another handle to the same registry. Entries are snapshots:
/// once a record is added it is no longer mutated through the registry.
#[derive(Debug, Clone, Default)]
pub struct ModuleConfigManager {
    methods: Arc<RwLock<HashMap<String, InvocationSettings>>>,
}

impl ModuleConfigManager {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish settings under `id`, returning whatever was registered there before.
    pub fn add_method_settings(
        &self,
        id: impl Into<String>,
        settings: InvocationSettings,
    ) -> Option<InvocationSettings> {
        let id = id.into();
        let previous = self.methods.write().insert(id.clone(), settings);
        if previous.is_some() {
            tracing::debug!(id = %id, "Replaced method settings");
        }
        previous
    }

    /// Look up the settings registered under `id`.
    #[must_use]
    pub fn method_settings(&self, id: &str) -> Option<InvocationSettings> {
        self.methods.read().get(id).cloned()
    }

    /// Remove the settings registered under `id`.
    pub fn remove_method_settings(&self, id: &str) -> Option<InvocationSettings> {
        self.methods.write().remove(id)
    }

    /// Registered ids, sorted.
    #[must_use]
    pub fn method_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.methods.read().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.read().is_empty()
    }

    pub(crate) fn clear(&self) {
        self.methods.write().clear();
    }
}
