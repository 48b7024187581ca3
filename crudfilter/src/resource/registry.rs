use std::collections::HashMap;
use std::sync::Arc;

use super::descriptor::ResourceDescriptor;

/// Descriptors by resource name. The record store resolves relation targets here.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: HashMap<String, Arc<ResourceDescriptor>>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of descriptors.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the document is not an array of descriptors.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let descriptors: Vec<ResourceDescriptor> = serde_json::from_str(json)?;
        Ok(descriptors.into_iter().collect())
    }

    /// Add or replace a descriptor and return the shared handle to it.
    pub fn register(&mut self, descriptor: ResourceDescriptor) -> Arc<ResourceDescriptor> {
        let descriptor = Arc::new(descriptor);
        if self
            .resources
            .insert(descriptor.name.clone(), descriptor.clone())
            .is_some()
        {
            tracing::debug!(resource = %descriptor.name, "Replaced resource descriptor");
        }
        descriptor
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<ResourceDescriptor>> {
        self.resources.get(name).cloned()
    }

    /// `resource.relation` pairs whose target is not registered
    #[must_use]
    pub fn dangling_relations(&self) -> Vec<String> {
        let mut dangling: Vec<String> = self
            .resources
            .values()
            .flat_map(|desc| {
                desc.relations
                    .iter()
                    .filter(|rel| !self.resources.contains_key(&rel.target))
                    .map(|rel| format!("{}.{}", desc.name, rel.name))
            })
            .collect();
        dangling.sort();
        dangling
    }
}

impl FromIterator<ResourceDescriptor> for ResourceRegistry {
    fn from_iter<I: IntoIterator<Item = ResourceDescriptor>>(iter: I) -> Self {
        let mut registry = Self::new();
        for descriptor in iter {
            registry.register(descriptor);
        }
        registry
    }
}
