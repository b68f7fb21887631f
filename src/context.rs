use crate::config::ComponentsConfiguration;
use crate::pool::ComponentsPools;
use std::sync::Arc;

/// Carries the pool registry and configuration through mounting.
///
/// Cheap to clone; clones share the same pools.
#[derive(Debug, Clone)]
pub struct ComponentContext {
    pools: Arc<ComponentsPools>,
    config: Arc<ComponentsConfiguration>,
}

impl ComponentContext {
    pub fn new() -> ComponentContext {
        ComponentContext::with_config(ComponentsConfiguration::default())
    }

    pub fn with_config(config: ComponentsConfiguration) -> ComponentContext {
        ComponentContext {
            pools: Arc::new(ComponentsPools::new(&config)),
            config: Arc::new(config),
        }
    }

    pub fn pools(&self) -> &ComponentsPools {
        &self.pools
    }

    pub fn config(&self) -> &ComponentsConfiguration {
        &self.config
    }

    /// Returns true if both contexts share the same pools.
    pub fn shares_pools_with(&self, other: &ComponentContext) -> bool {
        Arc::ptr_eq(&self.pools, &other.pools)
    }
}

impl Default for ComponentContext {
    fn default() -> Self {
        ComponentContext::new()
    }
}
