//! Host views.
//!
//! A [`ComponentHost`] is a view that mounted content is placed into. Children are kept by their
//! layout index, which is also their drawing order, and are identified by the [`ItemKey`] of the
//! mount item they were mounted for.

use crate::content::{Content, NativeView, ViewId, ViewState};
use crate::error::{MountError, Result};
use crate::mount_item::{ItemKey, MountFlags, MountItem};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// A mounted child.
#[derive(Debug, Clone)]
struct HostChild {
    key: ItemKey,
    content: Content,
    flags: MountFlags,
    accessible: bool,
}

impl HostChild {
    fn is_accessible_drawable(&self) -> bool {
        self.accessible && matches!(self.content, Content::Drawable(_))
    }
}

#[derive(Debug, Default)]
struct HostInner {
    items: BTreeMap<usize, HostChild>,
    /// Children pushed out of their index by a move, waiting for their own move.
    scrap: BTreeMap<usize, HostChild>,
    implements_virtual_views: bool,
    child_drawing_order_dirty: bool,
}

impl HostInner {
    fn refresh_virtual_views(&mut self) {
        self.implements_virtual_views = self
            .items
            .values()
            .chain(self.scrap.values())
            .any(HostChild::is_accessible_drawable);
    }

    fn remove_by_key(&mut self, key: ItemKey) -> Option<(usize, HostChild)> {
        let index = self
            .items
            .iter()
            .find(|(_, child)| child.key == key)
            .map(|(index, _)| *index);
        if let Some(index) = index {
            return self.items.remove(&index).map(|child| (index, child));
        }
        let index = self
            .scrap
            .iter()
            .find(|(_, child)| child.key == key)
            .map(|(index, _)| *index)?;
        self.scrap.remove(&index).map(|child| (index, child))
    }
}

/// A view that hosts mounted views and drawables.
#[derive(Debug)]
pub struct ComponentHost {
    view: NativeView,
    inner: Mutex<HostInner>,
}

impl ComponentHost {
    pub fn new() -> ComponentHost {
        ComponentHost {
            view: NativeView::new(),
            inner: Mutex::new(HostInner::default()),
        }
    }

    pub fn id(&self) -> ViewId {
        self.view.id()
    }

    /// The view backing this host.
    pub fn view(&self) -> &NativeView {
        &self.view
    }

    /// Mounts the item’s content at `index`.
    ///
    /// If `index` is taken, that child and every child after it shift up by one.
    pub fn mount(&self, index: usize, item: &MountItem) -> Result<()> {
        let content = item
            .content()
            .cloned()
            .ok_or(MountError::NotInitialized(item.key()))?;
        let child = HostChild {
            key: item.key(),
            content,
            flags: item.flags(),
            accessible: item.is_accessible(),
        };

        self.attach(&child);

        let mut inner = self.inner.lock();
        if inner.items.contains_key(&index) {
            let shifted: Vec<usize> = inner.items.range(index..).map(|(i, _)| *i).rev().collect();
            for i in shifted {
                if let Some(moved) = inner.items.remove(&i) {
                    inner.items.insert(i + 1, moved);
                }
            }
            inner.child_drawing_order_dirty = true;
        }
        inner.items.insert(index, child);
        inner.refresh_virtual_views();
        Ok(())
    }

    /// Unmounts the item’s content, wherever it is. Returns the index it was at.
    pub fn unmount(&self, item: &MountItem) -> Result<usize> {
        let removed = {
            let mut inner = self.inner.lock();
            let removed = inner.remove_by_key(item.key());
            if removed.is_some() {
                inner.refresh_virtual_views();
            }
            removed
        };
        match removed {
            Some((index, child)) => {
                self.detach(&child);
                Ok(index)
            }
            None => Err(MountError::NotMounted {
                item: item.key(),
                host: self.id(),
            }),
        }
    }

    /// Unmounts the item’s content from `index`.
    pub fn unmount_at(&self, index: usize, item: &MountItem) -> Result<()> {
        let removed = {
            let mut inner = self.inner.lock();
            let removed = match inner.items.get(&index) {
                Some(child) if child.key == item.key() => inner.items.remove(&index),
                _ => None,
            };
            if removed.is_some() {
                inner.refresh_virtual_views();
            }
            removed
        };
        match removed {
            Some(child) => {
                self.detach(&child);
                Ok(())
            }
            None => Err(MountError::NotMounted {
                item: item.key(),
                host: self.id(),
            }),
        }
    }

    /// Moves the item’s content from `old_index` to `new_index` without detaching it.
    ///
    /// Whatever occupies `new_index` is put aside until it is moved itself.
    pub fn move_item(&self, item: &MountItem, old_index: usize, new_index: usize) -> Result<()> {
        if old_index == new_index {
            return Ok(());
        }
        let key = item.key();
        let mut inner = self.inner.lock();

        let child = if inner.scrap.get(&old_index).map_or(false, |c| c.key == key) {
            inner.scrap.remove(&old_index)
        } else if inner.items.get(&old_index).map_or(false, |c| c.key == key) {
            inner.items.remove(&old_index)
        } else {
            None
        };
        let child = child.ok_or(MountError::NothingToMove {
            index: old_index,
            host: self.id(),
        })?;

        if let Some(occupant) = inner.items.remove(&new_index) {
            if let Some(lost) = inner.scrap.insert(new_index, occupant) {
                log::error!("host {:?}: scrap at {} already held {:?}", self.id(), new_index, lost.key);
            }
        }
        if child.content.as_view().is_some() {
            inner.child_drawing_order_dirty = true;
        }
        inner.items.insert(new_index, child);
        Ok(())
    }

    /// Refreshes what the host knows about an item after it was updated in place.
    pub fn update_item(&self, index: usize, item: &MountItem) -> Result<()> {
        let child = {
            let mut inner = self.inner.lock();
            let child = inner
                .items
                .get_mut(&index)
                .filter(|child| child.key == item.key())
                .ok_or(MountError::NotMounted {
                    item: item.key(),
                    host: self.view.id(),
                })?;
            child.flags = item.flags();
            child.accessible = item.is_accessible();
            let child = child.clone();
            inner.refresh_virtual_views();
            child
        };
        self.sync_duplicate_parent_state(&child);
        Ok(())
    }

    fn attach(&self, child: &HostChild) {
        match &child.content {
            Content::Drawable(drawable) => {
                drawable.set_callback(Some(self.id()));
                drawable.set_visible(true);
            }
            content => {
                if let Some(view) = content.as_view() {
                    let mut props = view.props();
                    if let Some(parent) = props.parent {
                        log::warn!("view {:?} is still attached to {:?}", view.id(), parent);
                    }
                    props.parent = Some(self.id());
                }
            }
        }
        self.sync_duplicate_parent_state(child);
    }

    fn detach(&self, child: &HostChild) {
        match &child.content {
            Content::Drawable(drawable) => drawable.set_callback(None),
            content => {
                if let Some(view) = content.as_view() {
                    let mut props = view.props();
                    props.parent = None;
                    props.duplicate_parent_state = false;
                }
            }
        }
    }

    fn sync_duplicate_parent_state(&self, child: &HostChild) {
        let duplicate = child.flags.duplicate_parent_state;
        if let Some(view) = child.content.as_view() {
            view.props().duplicate_parent_state = duplicate;
        }
        if duplicate {
            apply_state(&child.content, self.view.state());
        }
    }

    pub fn state(&self) -> ViewState {
        self.view.state()
    }

    /// Changes the host’s state and copies it to every child that duplicates its parent’s state.
    pub fn set_state(&self, state: ViewState) {
        self.view.set_state(state);
        let duplicating: Vec<Content> = {
            let inner = self.inner.lock();
            inner
                .items
                .values()
                .filter(|child| child.flags.duplicate_parent_state)
                .map(|child| child.content.clone())
                .collect()
        };
        for content in &duplicating {
            apply_state(content, state);
        }
    }

    fn set_state_flag(&self, flag: ViewState, value: bool) {
        let mut state = self.view.state();
        state.set(flag, value);
        self.set_state(state);
    }

    pub fn set_pressed(&self, pressed: bool) {
        self.set_state_flag(ViewState::PRESSED, pressed);
    }

    pub fn set_selected(&self, selected: bool) {
        self.set_state_flag(ViewState::SELECTED, selected);
    }

    pub fn set_activated(&self, activated: bool) {
        self.set_state_flag(ViewState::ACTIVATED, activated);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.set_state_flag(ViewState::ENABLED, enabled);
    }

    /// Number of mounted children, including ones waiting in scrap.
    pub fn child_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.items.len() + inner.scrap.len()
    }

    /// Keys of the mounted children in drawing order.
    pub fn mounted_keys(&self) -> Vec<ItemKey> {
        self.inner.lock().items.values().map(|child| child.key).collect()
    }

    /// Indices of the mounted children in drawing order.
    pub fn mounted_indices(&self) -> Vec<usize> {
        self.inner.lock().items.keys().copied().collect()
    }

    pub fn content_at(&self, index: usize) -> Option<Content> {
        self.inner
            .lock()
            .items
            .get(&index)
            .map(|child| child.content.clone())
    }

    pub fn index_of(&self, key: ItemKey) -> Option<usize> {
        self.inner
            .lock()
            .items
            .iter()
            .find(|(_, child)| child.key == key)
            .map(|(index, _)| *index)
    }

    pub fn has_scrap(&self) -> bool {
        !self.inner.lock().scrap.is_empty()
    }

    /// True while at least one mounted drawable is accessible; such a host has to expose its
    /// drawables to accessibility services as virtual views.
    pub fn implements_virtual_views(&self) -> bool {
        self.inner.lock().implements_virtual_views
    }

    pub fn is_child_drawing_order_dirty(&self) -> bool {
        self.inner.lock().child_drawing_order_dirty
    }

    /// Child views in drawing order. Clears the dirty flag.
    pub fn child_drawing_order(&self) -> Vec<ViewId> {
        let mut inner = self.inner.lock();
        inner.child_drawing_order_dirty = false;
        inner
            .items
            .values()
            .filter_map(|child| child.content.as_view().map(NativeView::id))
            .collect()
    }
}

impl Default for ComponentHost {
    fn default() -> Self {
        ComponentHost::new()
    }
}

fn apply_state(content: &Content, state: ViewState) {
    match content {
        Content::Drawable(drawable) => {
            drawable.set_state(state);
        }
        Content::View(view) => {
            view.set_state(state);
        }
        Content::Host(host) => host.set_state(state),
    }
}
