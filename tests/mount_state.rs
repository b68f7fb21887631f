//! End-to-end mount passes against a root host.

use litho::content::{Content, ViewState};
use litho::events::{ClickEvent, EventHandler};
use litho::layout::{LayoutOutput, LayoutOutputId, LayoutState, UpdateState};
use litho::node_info::{ImportantForAccessibility, NodeInfo};
use litho::pool::Poolable;
use litho::{
    impl_component, Component, ComponentContext, ComponentHost, FlagBits, HostComponent,
    MountFlags, MountState, MountType,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Journal = Arc<Mutex<Vec<String>>>;

#[derive(Debug)]
struct Recorded {
    name: &'static str,
    mount_type: MountType,
    journal: Journal,
}

impl PartialEq for Recorded {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.mount_type == other.mount_type
    }
}

impl_component! {
    Recorded;
    fn mount_type(&self) -> MountType {
        self.mount_type
    }
    fn on_mount(&self, _: &Content) {
        self.journal.lock().push(format!("mount {}", self.name));
    }
    fn on_unmount(&self, _: &Content) {
        self.journal.lock().push(format!("unmount {}", self.name));
    }
    fn on_bind(&self, _: &Content) {
        self.journal.lock().push(format!("bind {}", self.name));
    }
    fn on_unbind(&self, _: &Content) {
        self.journal.lock().push(format!("unbind {}", self.name));
    }
}

#[derive(Debug, PartialEq)]
struct Announced(bool);

impl_component! {
    Announced;
    fn mount_type(&self) -> MountType {
        MountType::Drawable
    }
    fn implements_accessibility(&self) -> bool {
        self.0
    }
}

struct Harness {
    journal: Journal,
    state: MountState,
    version: u64,
}

impl Harness {
    fn new() -> Harness {
        Harness {
            journal: Journal::default(),
            state: MountState::new(ComponentContext::new(), Arc::new(ComponentHost::new())),
            version: 0,
        }
    }

    fn component(&self, name: &'static str, mount_type: MountType) -> Arc<dyn Component> {
        Arc::new(Recorded {
            name,
            mount_type,
            journal: Arc::clone(&self.journal),
        })
    }

    fn mount(&mut self, outputs: Vec<LayoutOutput>) -> litho::MountStats {
        self.version += 1;
        self.state
            .mount(&LayoutState::new(self.version, outputs))
            .unwrap()
    }

    fn take_journal(&self) -> Vec<String> {
        std::mem::take(&mut *self.journal.lock())
    }

    fn root(&self) -> &Arc<ComponentHost> {
        self.state.root()
    }
}

fn id(n: u64) -> LayoutOutputId {
    LayoutOutputId(n)
}

#[test]
fn swap_moves_without_remounting() {
    let mut h = Harness::new();
    let a = h.component("a", MountType::View);
    let b = h.component("b", MountType::Drawable);

    h.mount(vec![
        LayoutOutput::new(id(1), Arc::clone(&a)),
        LayoutOutput::new(id(2), Arc::clone(&b)),
    ]);
    let key_a = h.state.mount_item(id(1)).unwrap().key();
    let key_b = h.state.mount_item(id(2)).unwrap().key();
    h.take_journal();

    let stats = h.mount(vec![
        LayoutOutput::new(id(2), Arc::clone(&b)),
        LayoutOutput::new(id(1), Arc::clone(&a)),
    ]);

    assert_eq!(stats.moved, 2);
    assert_eq!(stats.mounted, 0);
    assert_eq!(stats.unmounted, 0);
    assert_eq!(stats.no_op, 2);
    assert_eq!(stats.consistency_errors, 0);
    assert!(h.take_journal().is_empty());

    assert_eq!(h.root().mounted_keys(), vec![key_b, key_a]);
    assert!(!h.root().has_scrap());
    assert!(h.state.mount_item(id(1)).unwrap().is_bound());
    assert!(h.state.mount_item(id(2)).unwrap().is_bound());
    assert_eq!(h.state.mounted_ids(), &[id(2), id(1)]);
}

#[test]
fn removal_unbinds_unmounts_and_releases() {
    let mut h = Harness::new();
    let mut info = NodeInfo::new();
    info.set_content_description(Arc::<str>::from("a"));
    h.mount(vec![
        LayoutOutput::new(id(1), h.component("a", MountType::View)).with_node_info(info),
    ]);
    let item = h.state.mount_item(id(1)).unwrap();
    assert!(item.is_accessible());
    let key = item.key();
    let content = item.content().cloned().unwrap();
    let released_before = h.state.context().pools().mount_items().stats().released;
    h.take_journal();

    let stats = h.mount(vec![]);

    assert_eq!(stats.unmounted, 1);
    assert_eq!(h.take_journal(), vec!["unbind a", "unmount a"]);
    assert_eq!(h.root().child_count(), 0);
    assert!(h.state.mount_item(id(1)).is_none());
    assert_eq!(content.as_view().unwrap().parent(), None);
    assert!(content.as_view().unwrap().content_description().is_none());

    let pools = h.state.context().pools();
    assert_eq!(pools.mount_items().stats().released, released_before + 1);
    assert_eq!(pools.node_infos().stats().released, 1);

    let reused = pools.acquire_mount_item();
    assert_eq!(reused.key().slot(), key.slot());
    assert_ne!(reused.key(), key);
    assert!(reused.is_released());
    assert!(!reused.is_accessible());
}

#[test]
fn first_mount_acquires_inits_and_binds() {
    let mut h = Harness::new();
    let c = h.component("c", MountType::Drawable);

    let stats = h.mount(vec![LayoutOutput::new(id(3), Arc::clone(&c))]);

    assert_eq!(stats.mounted, 1);
    assert_eq!(h.state.context().pools().mount_items().stats().acquired, 1);
    assert_eq!(h.take_journal(), vec!["mount c", "bind c"]);

    let item = h.state.mount_item(id(3)).unwrap();
    assert!(item.is_bound());
    assert!(Arc::ptr_eq(item.component().unwrap(), &c));
    assert!(Arc::ptr_eq(item.host().unwrap(), h.root()));
    assert!(h.root().content_at(0).unwrap().ptr_eq(item.content().unwrap()));
    assert_eq!(h.root().mounted_keys(), vec![item.key()]);
}

#[test]
fn nested_hosts() {
    let mut h = Harness::new();
    let host: Arc<dyn Component> = Arc::new(HostComponent);
    let x = h.component("x", MountType::Drawable);
    let y = h.component("y", MountType::View);

    let stats = h.mount(vec![
        LayoutOutput::new(id(1), Arc::clone(&host)),
        LayoutOutput::new(id(2), Arc::clone(&x)).with_host(id(1)),
        LayoutOutput::new(id(3), Arc::clone(&y)),
    ]);
    assert_eq!(stats.mounted, 3);

    let nested = Arc::clone(h.state.host(id(1)).unwrap());
    assert_eq!(nested.child_count(), 1);
    assert_eq!(nested.view().parent(), Some(h.root().id()));
    assert_eq!(h.root().mounted_indices(), vec![0, 2]);
    h.take_journal();

    // removing the host takes its children along
    let stats = h.mount(vec![LayoutOutput::new(id(3), Arc::clone(&y))]);
    assert_eq!(stats.unmounted, 2);
    assert_eq!(stats.moved, 1);
    assert_eq!(h.take_journal(), vec!["unbind x", "unmount x"]);
    assert!(h.state.host(id(1)).is_none());
    assert_eq!(nested.child_count(), 0);
    assert_eq!(h.root().mounted_indices(), vec![0]);
    assert_eq!(
        h.state
            .context()
            .pools()
            .mount_content()
            .len(host.as_any().type_id(), MountType::Host),
        1
    );
}

#[test]
fn changing_host_remounts() {
    let mut h = Harness::new();
    let host: Arc<dyn Component> = Arc::new(HostComponent);
    let x = h.component("x", MountType::Drawable);

    h.mount(vec![
        LayoutOutput::new(id(1), Arc::clone(&host)),
        LayoutOutput::new(id(2), Arc::clone(&x)).with_host(id(1)),
    ]);
    h.take_journal();

    let stats = h.mount(vec![
        LayoutOutput::new(id(1), Arc::clone(&host)),
        LayoutOutput::new(id(2), Arc::clone(&x)),
    ]);
    assert_eq!(stats.unmounted, 1);
    assert_eq!(stats.mounted, 1);
    assert_eq!(h.take_journal(), vec!["unbind x", "unmount x", "mount x", "bind x"]);
    assert_eq!(h.state.host(id(1)).unwrap().child_count(), 0);
    assert_eq!(h.root().child_count(), 2);
}

#[test]
fn missing_host_is_reported() {
    let mut h = Harness::new();
    let stats = h.mount(vec![
        LayoutOutput::new(id(2), h.component("x", MountType::View)).with_host(id(99)),
        LayoutOutput::new(id(3), h.component("y", MountType::View)),
    ]);
    assert_eq!(stats.consistency_errors, 1);
    assert_eq!(stats.mounted, 1);
    assert!(h.state.mount_item(id(2)).is_none());
    assert!(h.state.mount_item(id(3)).is_some());
}

#[test]
fn missing_host_during_unmount_is_reported() {
    let mut h = Harness::new();
    h.mount(vec![
        LayoutOutput::new(id(1), h.component("x", MountType::View)),
        LayoutOutput::new(id(2), h.component("y", MountType::Drawable)),
    ]);
    let item = h.state.mount_item(id(1)).unwrap();
    h.root().unmount(item).unwrap();
    assert_eq!(h.root().child_count(), 1);
    h.take_journal();

    let stats = h.mount(vec![]);
    assert_eq!(stats.unmounted, 2);
    assert_eq!(stats.consistency_errors, 1);
    assert_eq!(
        h.take_journal(),
        vec!["unbind y", "unmount y", "unbind x", "unmount x"]
    );
    assert_eq!(h.root().child_count(), 0);
    assert!(h.state.is_empty());
}

#[test]
fn recycled_content_matches_the_requested_kind() {
    let mut h = Harness::new();
    h.mount(vec![LayoutOutput::new(id(1), h.component("shape", MountType::View))]);
    let view = h.state.mount_item(id(1)).unwrap().content().cloned().unwrap();
    h.mount(vec![]);

    let stats = h.mount(vec![
        LayoutOutput::new(id(2), h.component("shape", MountType::Host)),
        LayoutOutput::new(id(3), h.component("dot", MountType::Drawable)).with_host(id(2)),
    ]);
    assert_eq!(stats.mounted, 2);
    assert_eq!(stats.consistency_errors, 0);

    let content = h.state.mount_item(id(2)).unwrap().content().cloned().unwrap();
    assert_eq!(content.mount_type(), MountType::Host);
    assert!(!content.ptr_eq(&view));
    assert_eq!(h.state.host(id(2)).unwrap().child_count(), 1);

    // the pooled view is still there for the next view of the same type
    h.mount(vec![LayoutOutput::new(id(4), h.component("shape", MountType::View))]);
    let reused = h.state.mount_item(id(4)).unwrap().content().cloned().unwrap();
    assert!(reused.ptr_eq(&view));
}

#[test]
fn clean_component_swap_refreshes_host_accessibility() {
    let mut h = Harness::new();
    h.mount(vec![LayoutOutput::new(id(1), Arc::new(Announced(false)))]);
    assert!(!h.root().implements_virtual_views());

    let stats = h.mount(vec![LayoutOutput::new(id(1), Arc::new(Announced(true)))
        .with_update_state(UpdateState::Clean)]);
    assert_eq!(stats.no_op, 1);
    assert!(h.state.mount_item(id(1)).unwrap().is_accessible());
    assert!(h.root().implements_virtual_views());

    h.mount(vec![LayoutOutput::new(id(1), Arc::new(Announced(false)))
        .with_update_state(UpdateState::Clean)]);
    assert!(!h.root().implements_virtual_views());
}

#[test]
fn click_handlers_follow_updates() {
    let clicks = Arc::new(AtomicUsize::new(0));
    let clicks2 = Arc::clone(&clicks);
    let mut info = NodeInfo::new();
    info.set_click_handler(EventHandler::new(move |_: &ClickEvent| {
        clicks2.fetch_add(1, Ordering::SeqCst);
        true
    }));

    let mut h = Harness::new();
    let button = h.component("button", MountType::View);
    h.mount(vec![LayoutOutput::new(id(1), Arc::clone(&button)).with_node_info(info)]);
    let content = h.state.mount_item(id(1)).unwrap().content().cloned().unwrap();
    let view = content.as_view().unwrap();

    assert!(view.perform_click());
    assert_eq!(clicks.load(Ordering::SeqCst), 1);

    let stats = h.mount(vec![LayoutOutput::new(id(1), Arc::clone(&button))]);
    assert_eq!(stats.updated, 1);
    assert!(!view.perform_click());
    assert!(!view.props().clickable);
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
}

#[test]
fn duplicate_parent_state_in_nested_host() {
    let mut h = Harness::new();
    h.mount(vec![
        LayoutOutput::new(id(1), Arc::new(HostComponent)),
        LayoutOutput::new(id(2), h.component("x", MountType::Drawable))
            .with_host(id(1))
            .with_flags(MountFlags::from_bits(FlagBits::DUPLICATE_PARENT_STATE.bits())),
        LayoutOutput::new(id(3), h.component("y", MountType::Drawable)).with_host(id(1)),
    ]);
    let host = Arc::clone(h.state.host(id(1)).unwrap());
    let x = h.state.mount_item(id(2)).unwrap().content().cloned().unwrap();
    let y = h.state.mount_item(id(3)).unwrap().content().cloned().unwrap();

    host.set_pressed(true);
    assert!(x.as_drawable().unwrap().state().contains(ViewState::PRESSED));
    assert!(!y.as_drawable().unwrap().state().contains(ViewState::PRESSED));
}

#[test]
fn accessible_drawables_turn_on_virtual_views() {
    let mut h = Harness::new();
    let icon = h.component("icon", MountType::Drawable);
    let mut info = NodeInfo::new();
    info.set_content_description(Arc::<str>::from("Settings"));

    h.mount(vec![LayoutOutput::new(id(1), Arc::clone(&icon))]);
    assert!(!h.root().implements_virtual_views());

    h.mount(vec![LayoutOutput::new(id(1), Arc::clone(&icon)).with_node_info(info.clone())]);
    assert!(h.root().implements_virtual_views());

    h.mount(vec![LayoutOutput::new(id(1), Arc::clone(&icon))
        .with_node_info(info)
        .with_importance(ImportantForAccessibility::No)]);
    assert!(!h.root().implements_virtual_views());
}

#[test]
fn unmount_all_returns_everything() {
    let mut h = Harness::new();
    h.mount(vec![
        LayoutOutput::new(id(1), Arc::new(HostComponent)),
        LayoutOutput::new(id(2), h.component("x", MountType::View)).with_host(id(1)),
        LayoutOutput::new(id(3), h.component("y", MountType::Drawable)),
    ]);
    h.take_journal();

    let stats = h.state.unmount_all();
    assert_eq!(stats.unmounted, 3);
    assert_eq!(h.take_journal(), vec!["unbind y", "unmount y", "unbind x", "unmount x"]);
    assert!(h.state.is_empty());
    assert_eq!(h.root().child_count(), 0);
    assert_eq!(h.state.version(), None);
    assert_eq!(h.state.hosts().count(), 1);
}
