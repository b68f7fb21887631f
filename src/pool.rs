//! Object pools.
//!
//! Pools bound steady-state allocation; they never cap it. `acquire` always succeeds and creates
//! a new instance when the free list is empty. `release` takes ownership of the instance, so a
//! caller cannot keep using something it has handed back.

use crate::component::MountType;
use crate::config::ComponentsConfiguration;
use crate::content::Content;
use crate::mount_item::MountItem;
use crate::node_info::{NodeInfo, ViewNodeInfo};
use core::any::TypeId;
use core::fmt;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Types that can live in a [`Pool`].
pub trait Poolable: Sized {
    /// Creates a new, released instance.
    fn create() -> Self;

    /// Clears the instance back to its released state.
    fn reset(&mut self);

    /// Returns true if the instance is in its released state.
    fn is_released(&self) -> bool;
}

/// Pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances created because the free list was empty.
    pub created: usize,
    /// Calls to `acquire`.
    pub acquired: usize,
    /// Instances put back on the free list.
    pub released: usize,
    /// Instances rejected because they were still in use.
    pub refused: usize,
    /// Released instances dropped because the free list was full.
    pub dropped: usize,
    /// Current free list length.
    pub free: usize,
}

struct PoolInner<T> {
    free: Vec<T>,
    stats: PoolStats,
}

/// A free list of one pooled type, guarded by its own lock.
pub struct Pool<T> {
    name: &'static str,
    max_size: usize,
    inner: Mutex<PoolInner<T>>,
}

impl<T: Poolable> Pool<T> {
    /// Creates a pool that keeps at most `max_size` free instances.
    pub fn new(name: &'static str, max_size: usize) -> Pool<T> {
        Pool {
            name,
            max_size,
            inner: Mutex::new(PoolInner {
                free: Vec::new(),
                stats: PoolStats::default(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Takes an instance from the pool, creating one if none is free.
    pub fn acquire(&self) -> T {
        let mut inner = self.inner.lock();
        inner.stats.acquired += 1;
        match inner.free.pop() {
            Some(item) => item,
            None => {
                inner.stats.created += 1;
                T::create()
            }
        }
    }

    /// Returns an instance to the pool.
    ///
    /// Instances that are not released are refused and dropped; they would otherwise hand stale
    /// references to the next user. Returns true if the instance was kept.
    pub fn release(&self, item: T) -> bool {
        let mut inner = self.inner.lock();
        if !item.is_released() {
            inner.stats.refused += 1;
            log::error!("{} pool: refusing an instance that was not released", self.name);
            return false;
        }
        if inner.free.len() >= self.max_size {
            inner.stats.dropped += 1;
            return false;
        }
        inner.free.push(item);
        inner.stats.released += 1;
        true
    }

    /// Creates instances up front until `count` are free.
    pub fn preallocate(&self, count: usize) {
        let mut inner = self.inner.lock();
        let target = count.min(self.max_size);
        while inner.free.len() < target {
            inner.free.push(T::create());
            inner.stats.created += 1;
        }
    }

    /// Drops all free instances.
    pub fn clear(&self) {
        self.inner.lock().free.clear();
    }

    pub fn stats(&self) -> PoolStats {
        let inner = self.inner.lock();
        PoolStats {
            free: inner.free.len(),
            ..inner.stats
        }
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Pool")
            .field("name", &self.name)
            .field("max_size", &self.max_size)
            .field("free", &inner.free.len())
            .field("stats", &inner.stats)
            .finish()
    }
}

/// Recycles native content per component type and mount type.
///
/// A component type may ask for different kinds of content per instance, so the mount type is
/// part of the key.
#[derive(Debug, Default)]
pub struct MountContentPools {
    pools: Mutex<HashMap<(TypeId, MountType), Vec<Content>>>,
}

impl MountContentPools {
    pub fn new() -> MountContentPools {
        MountContentPools::default()
    }

    /// Takes recycled content of the given kind for a component type, if any.
    pub fn acquire(&self, component_type: TypeId, mount_type: MountType) -> Option<Content> {
        self.pools
            .lock()
            .get_mut(&(component_type, mount_type))
            .and_then(|pool| pool.pop())
    }

    /// Offers content for reuse. Content still attached to a host, or hosts that still have
    /// children, are not kept. Returns true if the content was kept.
    pub fn release(&self, component_type: TypeId, content: Content, max_size: usize) -> bool {
        let attached = match &content {
            Content::Drawable(drawable) => drawable.callback().is_some(),
            Content::View(view) => view.parent().is_some(),
            Content::Host(host) => host.view().parent().is_some() || host.child_count() > 0,
        };
        if attached {
            log::warn!("not recycling {:?}: still attached", content.id());
            return false;
        }

        let mut pools = self.pools.lock();
        let pool = pools
            .entry((component_type, content.mount_type()))
            .or_insert_with(Vec::new);
        if pool.len() >= max_size {
            return false;
        }
        pool.push(content);
        true
    }

    /// Number of recycled instances of one kind held for a component type.
    pub fn len(&self, component_type: TypeId, mount_type: MountType) -> usize {
        self.pools
            .lock()
            .get(&(component_type, mount_type))
            .map_or(0, |pool| pool.len())
    }

    pub fn clear(&self) {
        self.pools.lock().clear();
    }
}

/// All pools used while mounting.
#[derive(Debug)]
pub struct ComponentsPools {
    mount_items: Pool<MountItem>,
    node_infos: Pool<NodeInfo>,
    view_node_infos: Pool<ViewNodeInfo>,
    mount_content: MountContentPools,
}

impl ComponentsPools {
    pub fn new(config: &ComponentsConfiguration) -> ComponentsPools {
        ComponentsPools {
            mount_items: Pool::new("MountItem", config.mount_item_pool_size),
            node_infos: Pool::new("NodeInfo", config.node_info_pool_size),
            view_node_infos: Pool::new("ViewNodeInfo", config.view_node_info_pool_size),
            mount_content: MountContentPools::new(),
        }
    }

    pub fn mount_items(&self) -> &Pool<MountItem> {
        &self.mount_items
    }

    pub fn node_infos(&self) -> &Pool<NodeInfo> {
        &self.node_infos
    }

    pub fn view_node_infos(&self) -> &Pool<ViewNodeInfo> {
        &self.view_node_infos
    }

    pub fn mount_content(&self) -> &MountContentPools {
        &self.mount_content
    }

    pub fn acquire_mount_item(&self) -> MountItem {
        self.mount_items.acquire()
    }

    pub fn release_mount_item(&self, item: MountItem) -> bool {
        self.mount_items.release(item)
    }

    /// Acquires a node info holding a copy of `source`.
    pub fn acquire_node_info(&self, source: &NodeInfo) -> Box<NodeInfo> {
        let mut info = self.node_infos.acquire();
        info.copy_from(source);
        Box::new(info)
    }

    pub fn release_node_info(&self, mut info: Box<NodeInfo>) -> bool {
        info.reset();
        self.node_infos.release(*info)
    }

    /// Acquires a view node info holding a copy of `source`.
    pub fn acquire_view_node_info(&self, source: &ViewNodeInfo) -> Box<ViewNodeInfo> {
        let mut info = self.view_node_infos.acquire();
        info.copy_from(source);
        Box::new(info)
    }

    pub fn release_view_node_info(&self, mut info: Box<ViewNodeInfo>) -> bool {
        info.reset();
        self.view_node_infos.release(*info)
    }

    /// Drops every pooled instance.
    pub fn clear(&self) {
        self.mount_items.clear();
        self.node_infos.clear();
        self.view_node_infos.clear();
        self.mount_content.clear();
    }
}
