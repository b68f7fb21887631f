//! Mount engine configuration

use serde::{Deserialize, Serialize};

/// Pool sizes and debug switches for mounting.
///
/// Missing fields take their default values when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsConfiguration {
    /// Free mount items kept for reuse.
    pub mount_item_pool_size: usize,

    /// Free node infos kept for reuse.
    pub node_info_pool_size: usize,

    /// Free view node infos kept for reuse.
    pub view_node_info_pool_size: usize,

    /// Mount items created up front when a mount state is created.
    pub preallocated_mount_items: usize,

    /// Recycled content kept per component type when the component does not say otherwise.
    pub default_content_pool_size: usize,

    /// Verify host bookkeeping after every mount pass.
    pub debug_checks: bool,
}

impl Default for ComponentsConfiguration {
    fn default() -> Self {
        Self {
            mount_item_pool_size: 256,
            node_info_pool_size: 256,
            view_node_info_pool_size: 64,
            preallocated_mount_items: 0,
            default_content_pool_size: 3,
            debug_checks: cfg!(debug_assertions),
        }
    }
}

impl ComponentsConfiguration {
    /// A configuration that keeps nothing around between layouts.
    pub fn unpooled() -> Self {
        Self {
            mount_item_pool_size: 0,
            node_info_pool_size: 0,
            view_node_info_pool_size: 0,
            preallocated_mount_items: 0,
            default_content_pool_size: 0,
            ..Default::default()
        }
    }
}
