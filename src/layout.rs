//! Computed layouts, as handed to the mount engine.
//!
//! Layouts are computed elsewhere, possibly on a background thread. The mount engine only needs
//! the flattened output: one [`LayoutOutput`] per piece of mountable content, in drawing order,
//! with every host appearing before the outputs mounted into it.

use crate::component::Component;
use crate::mount_item::MountFlags;
use crate::node_info::{ImportantForAccessibility, NodeInfo, ViewNodeInfo};
use crate::rect::Rect;
use std::collections::HashMap;
use std::sync::Arc;

/// Stable identity of a layout output across layouts.
///
/// Outputs with the same id in consecutive layouts are matched up and their content is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutOutputId(pub u64);

/// The id the root host is registered under. Layout outputs may not use it.
pub const ROOT_HOST_ID: LayoutOutputId = LayoutOutputId(0);

/// What the layout computation knows about whether an output changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    /// Ask the component.
    Unknown,
    /// Known to be unchanged; the component is not remounted.
    Clean,
    /// Known to have changed; the component is always remounted.
    Dirty,
}

impl Default for UpdateState {
    fn default() -> Self {
        UpdateState::Unknown
    }
}

/// One piece of mountable content in a computed layout.
#[derive(Debug, Clone)]
pub struct LayoutOutput {
    pub id: LayoutOutputId,
    /// The output whose host this is mounted into.
    pub host_marker: LayoutOutputId,
    pub component: Arc<dyn Component>,
    /// Bounds relative to the host.
    pub bounds: Rect,
    pub node_info: Option<Arc<NodeInfo>>,
    pub view_node_info: Option<Arc<ViewNodeInfo>>,
    pub flags: MountFlags,
    pub important_for_accessibility: ImportantForAccessibility,
    pub transition_key: Option<Arc<str>>,
    pub update_state: UpdateState,
}

impl LayoutOutput {
    /// Creates an output mounted into the root host.
    pub fn new(id: LayoutOutputId, component: Arc<dyn Component>) -> LayoutOutput {
        LayoutOutput {
            id,
            host_marker: ROOT_HOST_ID,
            component,
            bounds: Rect::zero(),
            node_info: None,
            view_node_info: None,
            flags: MountFlags::default(),
            important_for_accessibility: ImportantForAccessibility::Auto,
            transition_key: None,
            update_state: UpdateState::Unknown,
        }
    }

    pub fn with_host(mut self, host_marker: LayoutOutputId) -> Self {
        self.host_marker = host_marker;
        self
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_node_info(mut self, node_info: NodeInfo) -> Self {
        self.node_info = Some(Arc::new(node_info));
        self
    }

    pub fn with_view_node_info(mut self, view_node_info: ViewNodeInfo) -> Self {
        self.view_node_info = Some(Arc::new(view_node_info));
        self
    }

    pub fn with_flags(mut self, flags: MountFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_importance(mut self, importance: ImportantForAccessibility) -> Self {
        self.important_for_accessibility = importance;
        self
    }

    pub fn with_transition_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.transition_key = Some(key.into());
        self
    }

    pub fn with_update_state(mut self, update_state: UpdateState) -> Self {
        self.update_state = update_state;
        self
    }
}

/// A complete computed layout.
///
/// Versions order layouts by when their computation started; the mount engine never applies a
/// layout older than the one it has mounted.
#[derive(Debug, Clone)]
pub struct LayoutState {
    pub version: u64,
    pub outputs: Vec<LayoutOutput>,
}

impl LayoutState {
    pub fn new(version: u64, outputs: Vec<LayoutOutput>) -> LayoutState {
        LayoutState { version, outputs }
    }

    /// Position of an output in drawing order.
    pub fn index_of(&self, id: LayoutOutputId) -> Option<usize> {
        self.outputs.iter().position(|output| output.id == id)
    }

    pub fn get(&self, id: LayoutOutputId) -> Option<&LayoutOutput> {
        self.outputs.iter().find(|output| output.id == id)
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Maps every id to its first position.
    pub(crate) fn id_index(&self) -> HashMap<LayoutOutputId, usize> {
        let mut map = HashMap::with_capacity(self.outputs.len());
        for (index, output) in self.outputs.iter().enumerate() {
            map.entry(output.id).or_insert(index);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::HostComponent;

    #[test]
    fn lookup() {
        let host: Arc<dyn Component> = Arc::new(HostComponent);
        let layout = LayoutState::new(
            1,
            vec![
                LayoutOutput::new(LayoutOutputId(4), Arc::clone(&host)),
                LayoutOutput::new(LayoutOutputId(9), Arc::clone(&host)).with_host(LayoutOutputId(4)),
                LayoutOutput::new(LayoutOutputId(4), host),
            ],
        );
        assert_eq!(layout.index_of(LayoutOutputId(9)), Some(1));
        assert_eq!(layout.get(LayoutOutputId(9)).unwrap().host_marker, LayoutOutputId(4));
        assert_eq!(layout.index_of(LayoutOutputId(2)), None);

        let index = layout.id_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&LayoutOutputId(4)], 0);
    }
}
