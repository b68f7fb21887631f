//! Property-based invariant tests for mounting.
//!
//! 1. After every pass the root host holds exactly the mounted items, in layout order
//! 2. Every pass leaves no scrapped children and no consistency errors
//! 3. Mounted content stays bound while attached
//! 4. Content is reused for every id that keeps its component type
//! 5. Flag bitsets round-trip, including bits this crate does not know
//! 6. Accessibility never survives a missing component or importance `No`

use litho::content::Content;
use litho::layout::{LayoutOutput, LayoutOutputId, LayoutState};
use litho::node_info::{ImportantForAccessibility, NodeInfo};
use litho::{
    impl_component, Component, ComponentContext, ComponentHost, FlagBits, MountFlags, MountItem,
    MountState, MountType,
};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, PartialEq)]
struct Label(u8);
impl_component! {
    Label;
    fn mount_type(&self) -> MountType {
        MountType::View
    }
}

#[derive(Debug, PartialEq)]
struct Icon(u8);
impl_component! {
    Icon;
    fn mount_type(&self) -> MountType {
        MountType::Drawable
    }
}

const IDS: u64 = 10;

fn component(kind: u8) -> Arc<dyn Component> {
    match kind % 4 {
        0 => Arc::new(Label(0)),
        1 => Arc::new(Label(1)),
        2 => Arc::new(Icon(0)),
        _ => Arc::new(Icon(1)),
    }
}

fn is_label(kind: u8) -> bool {
    kind % 4 < 2
}

/// A layout: a shuffled subset of ids, each with a component kind.
fn arb_layout() -> impl Strategy<Value = Vec<(u64, u8)>> {
    (
        Just((1..=IDS).collect::<Vec<u64>>()).prop_shuffle(),
        0..=IDS as usize,
        proptest::collection::vec(any::<u8>(), IDS as usize),
    )
        .prop_map(|(ids, len, kinds)| {
            ids.into_iter()
                .take(len)
                .map(|id| (id, kinds[(id - 1) as usize]))
                .collect()
        })
}

fn build(version: u64, layout: &[(u64, u8)]) -> LayoutState {
    LayoutState::new(
        version,
        layout
            .iter()
            .map(|&(id, kind)| LayoutOutput::new(LayoutOutputId(id), component(kind)))
            .collect(),
    )
}

proptest! {
    #[test]
    fn host_matches_layout(layouts in proptest::collection::vec(arb_layout(), 1..8)) {
        let mut state = MountState::new(ComponentContext::new(), Arc::new(ComponentHost::new()));
        let mut previous: HashMap<u64, (u8, Content)> = HashMap::new();

        for (i, layout) in layouts.iter().enumerate() {
            let stats = state.mount(&build(i as u64 + 1, layout)).unwrap();
            prop_assert_eq!(stats.consistency_errors, 0);

            let root = state.root();
            prop_assert!(!root.has_scrap());
            prop_assert_eq!(root.child_count(), layout.len());

            let expected: Vec<_> = layout
                .iter()
                .map(|&(id, _)| state.mount_item(LayoutOutputId(id)).unwrap().key())
                .collect();
            prop_assert_eq!(root.mounted_keys(), expected);

            let mut current = HashMap::new();
            for &(id, kind) in layout {
                let item = state.mount_item(LayoutOutputId(id)).unwrap();
                prop_assert!(item.is_bound());
                let content = item.content().cloned().unwrap();
                prop_assert_eq!(content.mount_type(), component(kind).mount_type());
                if let Some((old_kind, old_content)) = previous.get(&id) {
                    if is_label(*old_kind) == is_label(kind) {
                        prop_assert!(old_content.ptr_eq(&content));
                    }
                }
                current.insert(id, (kind, content));
            }
            previous = current;
        }
    }

    #[test]
    fn flags_round_trip(bits in any::<u32>()) {
        let flags = MountFlags::from_bits(bits);
        prop_assert_eq!(flags.bits(), bits);
        prop_assert_eq!(
            flags.duplicate_parent_state,
            MountItem::is_duplicate_parent_state(bits)
        );
        prop_assert_eq!(
            MountItem::is_duplicate_parent_state(bits),
            bits & FlagBits::DUPLICATE_PARENT_STATE.bits() != 0
        );
    }

    #[test]
    fn accessibility_overrides(
        has_component in any::<bool>(),
        has_description in any::<bool>(),
        importance in 0..3i32,
    ) {
        let importance = ImportantForAccessibility::from_raw(importance);
        let mut info = NodeInfo::new();
        if has_description {
            info.set_content_description(Arc::<str>::from("description"));
        }
        let host = Arc::new(ComponentHost::new());
        let mut item = MountItem::new();
        item.init(
            has_component.then(|| component(0)),
            host,
            Content::create(MountType::View).unwrap(),
            Some(Box::new(info)),
            None,
            None,
            MountFlags::default(),
            importance,
        );

        let expected = has_component
            && has_description
            && importance != ImportantForAccessibility::No;
        prop_assert_eq!(item.is_accessible(), expected);
        prop_assert_eq!(item.is_accessible(), item.is_accessible());

        item.release(&ComponentContext::new()).unwrap();
        prop_assert!(!item.is_accessible());
        prop_assert_eq!(item.flags().bits(), 0);
        prop_assert_eq!(item.important_for_accessibility(), ImportantForAccessibility::Auto);
    }
}
