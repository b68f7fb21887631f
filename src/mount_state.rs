//! The mount reconciler.
//!
//! [`MountState`] remembers what is currently mounted and moves the host hierarchy from one
//! computed layout to the next. Content is matched by [`LayoutOutputId`]; whenever an id survives
//! with the same kind of component on the same host, its content is kept and only moved or
//! updated. A pass runs in this order:
//!
//! 1. layouts no newer than the mounted one are discarded;
//! 2. duplicate ids are reported and skipped;
//! 3. outputs that disappeared, or changed component type, mount type or host, are unmounted in
//!    reverse drawing order (children of removed hosts go with them);
//! 4. survivors that changed index are moved;
//! 5. survivors are updated in place;
//! 6. new outputs are mounted in drawing order.
//!
//! Failures of individual items are logged and counted; the pass always carries on.

use crate::component::{Component, MountType};
use crate::component_host::ComponentHost;
use crate::content::Content;
use crate::context::ComponentContext;
use crate::error::{MountError, Result};
use crate::layout::{LayoutOutput, LayoutOutputId, LayoutState, UpdateState, ROOT_HOST_ID};
use crate::mount_item::MountItem;
use crate::node_info::{NodeInfo, ViewNodeInfo};
use crate::view_attributes::{set_view_attributes, unset_view_attributes};
use core::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::ops;
use std::sync::Arc;

/// Counters for mount passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountStats {
    pub mounted: usize,
    pub unmounted: usize,
    pub moved: usize,
    /// Survivors whose component was remounted or whose metadata changed.
    pub updated: usize,
    /// Survivors that needed nothing beyond bounds.
    pub no_op: usize,
    pub discarded_layouts: usize,
    /// Host lookups that failed and similar bookkeeping errors.
    pub consistency_errors: usize,
}

impl ops::AddAssign for MountStats {
    fn add_assign(&mut self, rhs: MountStats) {
        self.mounted += rhs.mounted;
        self.unmounted += rhs.unmounted;
        self.moved += rhs.moved;
        self.updated += rhs.updated;
        self.no_op += rhs.no_op;
        self.discarded_layouts += rhs.discarded_layouts;
        self.consistency_errors += rhs.consistency_errors;
    }
}

#[derive(Debug)]
struct MountedEntry {
    item: MountItem,
    host_marker: LayoutOutputId,
    index: usize,
    component_type: TypeId,
    mount_type: MountType,
}

fn component_type(component: &dyn Component) -> TypeId {
    component.as_any().type_id()
}

fn report(stats: &mut MountStats, error: MountError) {
    log::error!("mount: {}", error);
    stats.consistency_errors += 1;
}

fn same_node_info(a: Option<&NodeInfo>, b: Option<&NodeInfo>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_as(b),
        (None, None) => true,
        _ => false,
    }
}

fn same_view_node_info(a: Option<&ViewNodeInfo>, b: Option<&ViewNodeInfo>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_as(b),
        (None, None) => true,
        _ => false,
    }
}

/// Mounted content of one root host.
///
/// Must only be used from the thread that owns the host hierarchy.
#[derive(Debug)]
pub struct MountState {
    context: ComponentContext,
    root: Arc<ComponentHost>,
    hosts: HashMap<LayoutOutputId, Arc<ComponentHost>>,
    entries: HashMap<LayoutOutputId, MountedEntry>,
    /// Mounted ids in drawing order.
    order: Vec<LayoutOutputId>,
    version: Option<u64>,
    attached: bool,
    stats: MountStats,
}

impl MountState {
    /// Creates an empty mount state for the given root host.
    ///
    /// The state starts out attached: new content is bound as soon as it is mounted.
    pub fn new(context: ComponentContext, root: Arc<ComponentHost>) -> MountState {
        context
            .pools()
            .mount_items()
            .preallocate(context.config().preallocated_mount_items);

        let mut hosts = HashMap::new();
        hosts.insert(ROOT_HOST_ID, Arc::clone(&root));

        MountState {
            context,
            root,
            hosts,
            entries: HashMap::new(),
            order: Vec::new(),
            version: None,
            attached: true,
            stats: MountStats::default(),
        }
    }

    pub fn context(&self) -> &ComponentContext {
        &self.context
    }

    pub fn root(&self) -> &Arc<ComponentHost> {
        &self.root
    }

    /// The host mounted for a layout output, or the root host for [`ROOT_HOST_ID`].
    pub fn host(&self, id: LayoutOutputId) -> Option<&Arc<ComponentHost>> {
        self.hosts.get(&id)
    }

    pub fn hosts(&self) -> impl Iterator<Item = (LayoutOutputId, &Arc<ComponentHost>)> {
        self.hosts.iter().map(|(id, host)| (*id, host))
    }

    pub fn mount_item(&self, id: LayoutOutputId) -> Option<&MountItem> {
        self.entries.get(&id).map(|entry| &entry.item)
    }

    /// Mounted ids in drawing order.
    pub fn mounted_ids(&self) -> &[LayoutOutputId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Version of the last mounted layout.
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Totals over every pass so far.
    pub fn stats(&self) -> MountStats {
        self.stats
    }

    /// Counts a layout that will never be mounted.
    pub(crate) fn discard(&mut self, version: u64) {
        log::warn!(
            "discarding layout {}; layout {:?} is already mounted",
            version,
            self.version
        );
        self.stats.discarded_layouts += 1;
    }

    /// Moves the mounted content to match `layout`. Returns the counters for this pass.
    ///
    /// Fails only if the layout is not newer than the mounted one; failures of individual items
    /// are logged and counted in [`MountStats::consistency_errors`].
    pub fn mount(&mut self, layout: &LayoutState) -> Result<MountStats> {
        if let Some(mounted) = self.version {
            if layout.version <= mounted {
                self.discard(layout.version);
                return Err(MountError::Superseded {
                    version: layout.version,
                    mounted,
                });
            }
        }

        let mut pass = MountStats::default();

        let first_index = layout.id_index();
        let mut outputs: Vec<(usize, &LayoutOutput)> = Vec::with_capacity(layout.len());
        for (index, output) in layout.outputs.iter().enumerate() {
            if output.id == ROOT_HOST_ID || first_index.get(&output.id) != Some(&index) {
                report(&mut pass, MountError::DuplicateId(output.id));
                continue;
            }
            if output.component.mount_type() == MountType::None {
                continue;
            }
            outputs.push((index, output));
        }
        let positions: HashMap<LayoutOutputId, usize> = outputs
            .iter()
            .enumerate()
            .map(|(position, (_, output))| (output.id, position))
            .collect();

        // hosts always precede their children, so one forward pass catches removed hosts
        let mut removed = HashSet::new();
        for id in &self.order {
            let entry = match self.entries.get(id) {
                Some(entry) => entry,
                None => continue,
            };
            let keep = positions.get(id).map_or(false, |&position| {
                let output = outputs[position].1;
                output.host_marker == entry.host_marker
                    && !removed.contains(&entry.host_marker)
                    && component_type(&*output.component) == entry.component_type
                    && output.component.mount_type() == entry.mount_type
            });
            if !keep {
                removed.insert(*id);
            }
        }

        let removals: Vec<LayoutOutputId> = self
            .order
            .iter()
            .rev()
            .filter(|id| removed.contains(*id))
            .copied()
            .collect();
        for id in removals {
            if let Some(entry) = self.entries.remove(&id) {
                self.unmount_entry(id, entry, &mut pass);
            }
        }

        for &(index, output) in &outputs {
            let entry = match self.entries.get_mut(&output.id) {
                Some(entry) => entry,
                None => continue,
            };
            if entry.index == index {
                continue;
            }
            let old_index = entry.index;
            entry.index = index;
            match entry.item.host() {
                Some(host) => match host.move_item(&entry.item, old_index, index) {
                    Ok(()) => pass.moved += 1,
                    Err(error) => report(&mut pass, error),
                },
                None => report(&mut pass, MountError::NotInitialized(entry.item.key())),
            }
        }

        for &(index, output) in &outputs {
            if let Some(entry) = self.entries.get_mut(&output.id) {
                update_entry(&self.context, entry, index, output, &mut pass);
            }
        }

        for &(index, output) in &outputs {
            if self.entries.contains_key(&output.id) {
                continue;
            }
            match self.mount_output(index, output) {
                Ok(()) => pass.mounted += 1,
                Err(error) => report(&mut pass, error),
            }
        }

        let order: Vec<LayoutOutputId> = outputs
            .iter()
            .map(|(_, output)| output.id)
            .filter(|id| self.entries.contains_key(id))
            .collect();
        self.order = order;

        if self.context.config().debug_checks {
            for (id, host) in &self.hosts {
                if host.has_scrap() {
                    log::error!("mount: host {:?} still has scrapped children", id);
                    pass.consistency_errors += 1;
                }
            }
        }

        self.version = Some(layout.version);
        self.stats += pass;
        log::debug!("mounted layout {}: {:?}", layout.version, pass);
        Ok(pass)
    }

    fn mount_output(&mut self, index: usize, output: &LayoutOutput) -> Result<()> {
        let host = self
            .hosts
            .get(&output.host_marker)
            .cloned()
            .ok_or(MountError::MissingHost(output.host_marker))?;
        let component = Arc::clone(&output.component);
        let component_type = component_type(&*component);
        let pools = self.context.pools();

        let content = match pools
            .mount_content()
            .acquire(component_type, component.mount_type())
        {
            Some(content) => content,
            None => component
                .create_mount_content()
                .ok_or(MountError::NoContent(output.id))?,
        };
        component.on_mount(&content);
        content.set_bounds(output.bounds);

        let node_info = output
            .node_info
            .as_deref()
            .map(|info| pools.acquire_node_info(info));
        let view_node_info = output
            .view_node_info
            .as_deref()
            .map(|info| pools.acquire_view_node_info(info));

        let mut item = pools.acquire_mount_item();
        item.init(
            Some(Arc::clone(&component)),
            Arc::clone(&host),
            content.clone(),
            node_info,
            view_node_info,
            output.transition_key.clone(),
            output.flags,
            output.important_for_accessibility,
        );

        if let Err(error) = host.mount(index, &item) {
            component.on_unmount(&content);
            if let Err(release_error) = item.release(&self.context) {
                log::error!("mount: {}", release_error);
            }
            self.context.pools().release_mount_item(item);
            return Err(error);
        }
        set_view_attributes(&item);

        if let Content::Host(nested) = &content {
            self.hosts.insert(output.id, Arc::clone(nested));
        }

        if self.attached {
            component.on_bind(&content);
            item.set_is_bound(true);
        }

        self.entries.insert(
            output.id,
            MountedEntry {
                item,
                host_marker: output.host_marker,
                index,
                component_type,
                mount_type: component.mount_type(),
            },
        );
        Ok(())
    }

    fn unmount_entry(&mut self, id: LayoutOutputId, entry: MountedEntry, pass: &mut MountStats) {
        let MountedEntry {
            mut item,
            component_type,
            ..
        } = entry;
        let component = item.component().cloned();
        let content = item.content().cloned();

        if let (Some(component), Some(content)) = (&component, &content) {
            if item.is_bound() {
                component.on_unbind(content);
                item.set_is_bound(false);
            }
        }

        match item.host() {
            Some(host) => {
                if let Err(error) = host.unmount(&item) {
                    report(pass, error);
                }
            }
            None => report(pass, MountError::NotInitialized(item.key())),
        }

        if let (Some(component), Some(content)) = (&component, &content) {
            component.on_unmount(content);
        }
        unset_view_attributes(&item);

        if let Some(Content::Host(_)) = &content {
            self.hosts.remove(&id);
        }

        if let (Some(component), Some(content)) = (component, content) {
            let pool_size = component
                .pool_size()
                .unwrap_or(self.context.config().default_content_pool_size);
            self.context
                .pools()
                .mount_content()
                .release(component_type, content, pool_size);
        }

        if let Err(error) = item.release(&self.context) {
            report(pass, error);
        }
        self.context.pools().release_mount_item(item);
        pass.unmounted += 1;
    }

    /// Unbinds all content, as when the root goes off screen. Content stays mounted.
    pub fn unbind_all(&mut self) {
        self.attached = false;
        for id in &self.order {
            let entry = match self.entries.get_mut(id) {
                Some(entry) => entry,
                None => continue,
            };
            if !entry.item.is_bound() {
                continue;
            }
            if let (Some(component), Some(content)) = (entry.item.component(), entry.item.content())
            {
                component.on_unbind(content);
            }
            entry.item.set_is_bound(false);
        }
    }

    /// Binds all content again, as when the root comes back on screen.
    pub fn bind_all(&mut self) {
        self.attached = true;
        for id in &self.order {
            let entry = match self.entries.get_mut(id) {
                Some(entry) => entry,
                None => continue,
            };
            if entry.item.is_bound() {
                continue;
            }
            if let (Some(component), Some(content)) = (entry.item.component(), entry.item.content())
            {
                component.on_bind(content);
            }
            entry.item.set_is_bound(true);
        }
    }

    /// Unmounts everything. The next layout is mounted regardless of its version.
    pub fn unmount_all(&mut self) -> MountStats {
        let mut pass = MountStats::default();
        let ids: Vec<LayoutOutputId> = self.order.drain(..).rev().collect();
        for id in ids {
            if let Some(entry) = self.entries.remove(&id) {
                self.unmount_entry(id, entry, &mut pass);
            }
        }
        self.version = None;
        self.stats += pass;
        pass
    }
}

fn update_entry(
    context: &ComponentContext,
    entry: &mut MountedEntry,
    index: usize,
    output: &LayoutOutput,
    pass: &mut MountStats,
) {
    let item = &mut entry.item;
    let content = match item.content().cloned() {
        Some(content) => content,
        None => {
            report(pass, MountError::NotInitialized(item.key()));
            return;
        }
    };
    let previous = item.component().cloned();
    let next = &output.component;

    let component_changed = previous
        .as_ref()
        .map_or(true, |previous| !Arc::ptr_eq(previous, next));
    let remount = match output.update_state {
        UpdateState::Dirty => true,
        UpdateState::Clean => false,
        UpdateState::Unknown => match &previous {
            Some(previous) => component_changed && next.should_update(&**previous),
            None => true,
        },
    };
    let metadata_changed = !same_node_info(item.node_info(), output.node_info.as_deref())
        || !same_view_node_info(item.view_node_info(), output.view_node_info.as_deref())
        || item.flags() != output.flags
        || item.important_for_accessibility() != output.important_for_accessibility;
    let transition_changed = item.transition_key() != output.transition_key.as_ref();

    let was_bound = item.is_bound();
    if remount {
        if let Some(previous) = &previous {
            if was_bound {
                previous.on_unbind(&content);
            }
            previous.on_unmount(&content);
        }
        next.on_mount(&content);
    }

    if remount || metadata_changed {
        unset_view_attributes(item);
    }
    if component_changed || metadata_changed || transition_changed {
        let pools = context.pools();
        let node_info = output
            .node_info
            .as_deref()
            .map(|info| pools.acquire_node_info(info));
        let view_node_info = output
            .view_node_info
            .as_deref()
            .map(|info| pools.acquire_view_node_info(info));
        item.update(
            context,
            Arc::clone(next),
            node_info,
            view_node_info,
            output.transition_key.clone(),
            output.flags,
            output.important_for_accessibility,
        );
    }
    if remount || metadata_changed {
        set_view_attributes(item);
    }
    // a new component may answer implements_accessibility differently
    if remount || metadata_changed || component_changed {
        if let Some(host) = item.host() {
            if let Err(error) = host.update_item(index, item) {
                report(pass, error);
            }
        }
    }

    if remount && was_bound {
        next.on_bind(&content);
    }

    if content.bounds() != output.bounds {
        content.set_bounds(output.bounds);
    }

    if remount || metadata_changed {
        pass.updated += 1;
    } else {
        pass.no_op += 1;
    }
}
