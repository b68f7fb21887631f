//! Mount items.
//!
//! A mount item binds one component to the content mounted for it on a host, together with the
//! metadata the host needs (node infos, flags, accessibility importance). Items are pooled: an
//! item is either active (between `init` and `release`) or released, in which case every field
//! holds its default.

use crate::component::Component;
use crate::component_host::ComponentHost;
use crate::content::Content;
use crate::context::ComponentContext;
use crate::error::{MountError, Result};
use crate::node_info::{ImportantForAccessibility, NodeInfo, ViewNodeInfo};
use crate::pool::Poolable;
use bitflags::bitflags;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

bitflags! {
    /// The flag bits as they appear at interop boundaries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FlagBits: u32 {
        const DUPLICATE_PARENT_STATE = 1 << 0;
        const DISABLE_TOUCHABLE = 1 << 1;
        const MATCH_HOST_BOUNDS = 1 << 2;
    }
}

/// Per-item flags.
///
/// Bits this crate does not know about are carried along untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MountFlags {
    /// Mirror the host’s pressed/selected/... state onto this item’s content.
    pub duplicate_parent_state: bool,
    /// The content must not receive touches.
    pub disable_touchable: bool,
    /// The content fills its host.
    pub match_host_bounds: bool,
    opaque: u32,
}

impl MountFlags {
    pub fn from_bits(bits: u32) -> MountFlags {
        let known = FlagBits::from_bits_truncate(bits);
        MountFlags {
            duplicate_parent_state: known.contains(FlagBits::DUPLICATE_PARENT_STATE),
            disable_touchable: known.contains(FlagBits::DISABLE_TOUCHABLE),
            match_host_bounds: known.contains(FlagBits::MATCH_HOST_BOUNDS),
            opaque: bits & !FlagBits::all().bits(),
        }
    }

    pub fn bits(&self) -> u32 {
        let mut known = FlagBits::empty();
        known.set(FlagBits::DUPLICATE_PARENT_STATE, self.duplicate_parent_state);
        known.set(FlagBits::DISABLE_TOUCHABLE, self.disable_touchable);
        known.set(FlagBits::MATCH_HOST_BOUNDS, self.match_host_bounds);
        known.bits() | self.opaque
    }

    /// Bits outside the ones named here.
    pub fn opaque_bits(&self) -> u32 {
        self.opaque
    }

    pub fn is_empty(&self) -> bool {
        self.bits() == 0
    }
}

/// Identity of one use of a pooled mount item.
///
/// `slot` names the instance; `generation` changes on every release, so keys held from before a
/// release never match the item again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    slot: u64,
    generation: u32,
}

impl ItemKey {
    pub fn slot(&self) -> u64 {
        self.slot
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

static NEXT_SLOT: AtomicU64 = AtomicU64::new(1);

/// Binds a component to its mounted content.
#[derive(Debug)]
pub struct MountItem {
    key: ItemKey,
    active: bool,
    component: Option<Arc<dyn Component>>,
    host: Option<Arc<ComponentHost>>,
    content: Option<Content>,
    node_info: Option<Box<NodeInfo>>,
    view_node_info: Option<Box<ViewNodeInfo>>,
    transition_key: Option<Arc<str>>,
    flags: MountFlags,
    important_for_accessibility: ImportantForAccessibility,
    is_bound: bool,
}

impl MountItem {
    /// Creates a released item. Prefer acquiring one from
    /// [`ComponentsPools`](crate::pool::ComponentsPools).
    pub fn new() -> MountItem {
        MountItem {
            key: ItemKey {
                slot: NEXT_SLOT.fetch_add(1, Ordering::Relaxed),
                generation: 0,
            },
            active: false,
            component: None,
            host: None,
            content: None,
            node_info: None,
            view_node_info: None,
            transition_key: None,
            flags: MountFlags::default(),
            important_for_accessibility: ImportantForAccessibility::Auto,
            is_bound: false,
        }
    }

    /// Populates a released item. The item starts out unbound.
    ///
    /// Calling this on an active item is a bug; it is logged and the item is overwritten. Node
    /// infos held by the item at that point are dropped rather than returned to their pools, since
    /// no context is at hand. Use [`MountItem::release`] first.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        component: Option<Arc<dyn Component>>,
        host: Arc<ComponentHost>,
        content: Content,
        node_info: Option<Box<NodeInfo>>,
        view_node_info: Option<Box<ViewNodeInfo>>,
        transition_key: Option<Arc<str>>,
        flags: MountFlags,
        important_for_accessibility: ImportantForAccessibility,
    ) {
        if self.active {
            log::error!("init called on active mount item {:?}", self.key);
        }
        self.active = true;
        self.component = component;
        self.host = Some(host);
        self.content = Some(content);
        self.node_info = node_info;
        self.view_node_info = view_node_info;
        self.transition_key = transition_key;
        self.flags = flags;
        self.important_for_accessibility = important_for_accessibility;
        self.is_bound = false;
    }

    /// Replaces the component and metadata of an active item, keeping its host, content and
    /// bound state. Replaced node infos go back to their pools.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn update(
        &mut self,
        context: &ComponentContext,
        component: Arc<dyn Component>,
        node_info: Option<Box<NodeInfo>>,
        view_node_info: Option<Box<ViewNodeInfo>>,
        transition_key: Option<Arc<str>>,
        flags: MountFlags,
        important_for_accessibility: ImportantForAccessibility,
    ) {
        let pools = context.pools();
        if let Some(old) = std::mem::replace(&mut self.node_info, node_info) {
            pools.release_node_info(old);
        }
        if let Some(old) = std::mem::replace(&mut self.view_node_info, view_node_info) {
            pools.release_view_node_info(old);
        }
        self.component = Some(component);
        self.transition_key = transition_key;
        self.flags = flags;
        self.important_for_accessibility = important_for_accessibility;
    }

    /// Clears every field and returns the node infos to the context’s pools.
    ///
    /// The item itself still has to be handed back to its pool by the caller.
    pub fn release(&mut self, context: &ComponentContext) -> Result<()> {
        if !self.active {
            return Err(MountError::AlreadyReleased(self.key));
        }
        let pools = context.pools();
        if let Some(info) = self.node_info.take() {
            pools.release_node_info(info);
        }
        if let Some(info) = self.view_node_info.take() {
            pools.release_view_node_info(info);
        }
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.active = false;
        self.component = None;
        self.host = None;
        self.content = None;
        self.node_info = None;
        self.view_node_info = None;
        self.transition_key = None;
        self.flags = MountFlags::default();
        self.important_for_accessibility = ImportantForAccessibility::Auto;
        self.is_bound = false;
        self.key.generation = self.key.generation.wrapping_add(1);
    }

    pub fn key(&self) -> ItemKey {
        self.key
    }

    /// True between `init` and `release`.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn component(&self) -> Option<&Arc<dyn Component>> {
        self.component.as_ref()
    }

    pub fn host(&self) -> Option<&Arc<ComponentHost>> {
        self.host.as_ref()
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn node_info(&self) -> Option<&NodeInfo> {
        self.node_info.as_deref()
    }

    pub fn view_node_info(&self) -> Option<&ViewNodeInfo> {
        self.view_node_info.as_deref()
    }

    pub fn transition_key(&self) -> Option<&Arc<str>> {
        self.transition_key.as_ref()
    }

    pub fn flags(&self) -> MountFlags {
        self.flags
    }

    pub fn important_for_accessibility(&self) -> ImportantForAccessibility {
        self.important_for_accessibility
    }

    pub fn is_bound(&self) -> bool {
        self.is_bound
    }

    pub fn set_is_bound(&mut self, is_bound: bool) {
        self.is_bound = is_bound;
    }

    /// Tests the duplicate-parent-state bit of an interop flag bitset.
    pub fn is_duplicate_parent_state(flags: u32) -> bool {
        flags & FlagBits::DUPLICATE_PARENT_STATE.bits() != 0
    }

    /// Whether accessibility services should see this item’s content.
    ///
    /// Never for items without a component or marked as not important. Otherwise, either any
    /// content description, view tag or handler on the node info, or a component that provides
    /// its own accessibility behavior, makes it accessible.
    pub fn is_accessible(&self) -> bool {
        let component = match &self.component {
            Some(component) => component,
            None => return false,
        };
        if self.important_for_accessibility == ImportantForAccessibility::No {
            return false;
        }
        let node_info_needs_it = self
            .node_info
            .as_ref()
            .map_or(false, |info| info.needs_accessibility());
        node_info_needs_it || component.implements_accessibility()
    }
}

impl Default for MountItem {
    fn default() -> Self {
        MountItem::new()
    }
}

impl Poolable for MountItem {
    fn create() -> Self {
        MountItem::new()
    }

    /// Clears the item without a context; node infos are dropped rather than pooled.
    fn reset(&mut self) {
        if self.active {
            self.clear();
        }
    }

    fn is_released(&self) -> bool {
        !self.active
            && self.component.is_none()
            && self.host.is_none()
            && self.content.is_none()
            && self.node_info.is_none()
            && self.view_node_info.is_none()
    }
}
