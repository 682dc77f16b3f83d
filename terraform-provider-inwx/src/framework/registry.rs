//! Resource registry

use std::collections::HashMap;
use std::sync::Arc;

use crate::framework::{DynDataSource, DynResource};

/// Resource and data source registry
///
/// Indexed by Terraform type name. Filled once when the provider is
/// configured and read-only afterwards.
#[derive(Clone, Default)]
pub struct Registry {
    resources: HashMap<&'static str, Arc<dyn DynResource>>,
    data_sources: HashMap<&'static str, Arc<dyn DynDataSource>>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource under its own type name; a later registration replaces an earlier one
    pub fn register_resource(&mut self, resource: Arc<dyn DynResource>) {
        self.resources.insert(resource.type_name(), resource);
    }

    /// Register a data source under its own type name
    pub fn register_data_source(&mut self, data_source: Arc<dyn DynDataSource>) {
        self.data_sources.insert(data_source.type_name(), data_source);
    }

    /// Get resource instance
    pub fn resource(&self, type_name: &str) -> Option<Arc<dyn DynResource>> {
        self.resources.get(type_name).cloned()
    }

    /// Get data source instance
    pub fn data_source(&self, type_name: &str) -> Option<Arc<dyn DynDataSource>> {
        self.data_sources.get(type_name).cloned()
    }

    /// List all registered resource type names, sorted
    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.resources.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// List all registered data source type names, sorted
    pub fn data_source_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.data_sources.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
