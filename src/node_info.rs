//! Interaction and view metadata attached to mount items.
//!
//! A [`NodeInfo`] is filled in while the layout is computed and is only read once it is
//! attached to a mount item; the mount engine hands out shared references only. Both kinds are
//! pooled and come back empty.

use crate::content::{Background, Drawable, LayoutDirection};
use crate::events::{
    same_handler, AccessibilityCallback, AccessibilityEvent, ClickEvent, EventHandler,
    FocusChangedEvent, InterceptTouchEvent, LongClickEvent, TouchEvent,
};
use crate::pool::Poolable;
use crate::rect::Edges;
use core::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

/// An opaque view tag.
pub type Tag = Arc<dyn Any + Send + Sync>;

/// Keyed view tags.
pub type ViewTags = Arc<BTreeMap<i32, Tag>>;

/// Whether content should be reported to accessibility services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportantForAccessibility {
    /// Let the platform decide.
    Auto,
    Yes,
    No,
}

impl ImportantForAccessibility {
    /// Converts from the platform integer. Unknown values fall back to `Auto`.
    pub fn from_raw(raw: i32) -> ImportantForAccessibility {
        match raw {
            1 => ImportantForAccessibility::Yes,
            2 => ImportantForAccessibility::No,
            _ => ImportantForAccessibility::Auto,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            ImportantForAccessibility::Auto => 0,
            ImportantForAccessibility::Yes => 1,
            ImportantForAccessibility::No => 2,
        }
    }
}

impl Default for ImportantForAccessibility {
    fn default() -> Self {
        ImportantForAccessibility::Auto
    }
}

/// Handlers for the platform accessibility delegate callbacks.
#[derive(Debug, Clone, Default)]
pub struct AccessibilityHandlers {
    pub dispatch_populate_event: Option<EventHandler<AccessibilityEvent>>,
    pub initialize_event: Option<EventHandler<AccessibilityEvent>>,
    pub initialize_node_info: Option<EventHandler<AccessibilityEvent>>,
    pub populate_event: Option<EventHandler<AccessibilityEvent>>,
    pub request_send_event: Option<EventHandler<AccessibilityEvent>>,
    pub perform_action: Option<EventHandler<AccessibilityEvent>>,
    pub send_event: Option<EventHandler<AccessibilityEvent>>,
    pub send_event_unchecked: Option<EventHandler<AccessibilityEvent>>,
}

impl AccessibilityHandlers {
    fn slot(&self, callback: AccessibilityCallback) -> &Option<EventHandler<AccessibilityEvent>> {
        match callback {
            AccessibilityCallback::DispatchPopulateEvent => &self.dispatch_populate_event,
            AccessibilityCallback::InitializeEvent => &self.initialize_event,
            AccessibilityCallback::InitializeNodeInfo => &self.initialize_node_info,
            AccessibilityCallback::PopulateEvent => &self.populate_event,
            AccessibilityCallback::RequestSendEvent => &self.request_send_event,
            AccessibilityCallback::PerformAction => &self.perform_action,
            AccessibilityCallback::SendEvent => &self.send_event,
            AccessibilityCallback::SendEventUnchecked => &self.send_event_unchecked,
        }
    }

    fn slot_mut(
        &mut self,
        callback: AccessibilityCallback,
    ) -> &mut Option<EventHandler<AccessibilityEvent>> {
        match callback {
            AccessibilityCallback::DispatchPopulateEvent => &mut self.dispatch_populate_event,
            AccessibilityCallback::InitializeEvent => &mut self.initialize_event,
            AccessibilityCallback::InitializeNodeInfo => &mut self.initialize_node_info,
            AccessibilityCallback::PopulateEvent => &mut self.populate_event,
            AccessibilityCallback::RequestSendEvent => &mut self.request_send_event,
            AccessibilityCallback::PerformAction => &mut self.perform_action,
            AccessibilityCallback::SendEvent => &mut self.send_event,
            AccessibilityCallback::SendEventUnchecked => &mut self.send_event_unchecked,
        }
    }

    const ALL: [AccessibilityCallback; 8] = [
        AccessibilityCallback::DispatchPopulateEvent,
        AccessibilityCallback::InitializeEvent,
        AccessibilityCallback::InitializeNodeInfo,
        AccessibilityCallback::PopulateEvent,
        AccessibilityCallback::RequestSendEvent,
        AccessibilityCallback::PerformAction,
        AccessibilityCallback::SendEvent,
        AccessibilityCallback::SendEventUnchecked,
    ];

    pub fn get(&self, callback: AccessibilityCallback) -> Option<&EventHandler<AccessibilityEvent>> {
        self.slot(callback).as_ref()
    }

    pub fn set(
        &mut self,
        callback: AccessibilityCallback,
        handler: Option<EventHandler<AccessibilityEvent>>,
    ) {
        *self.slot_mut(callback) = handler;
    }

    pub fn is_empty(&self) -> bool {
        Self::ALL.iter().all(|&c| self.slot(c).is_none())
    }

    pub fn same_as(&self, other: &AccessibilityHandlers) -> bool {
        Self::ALL
            .iter()
            .all(|&c| same_handler(self.slot(c), other.slot(c)))
    }
}

/// Interaction metadata for a component: handlers, content description and view tags.
#[derive(Debug, Clone, Default)]
pub struct NodeInfo {
    content_description: Option<Arc<str>>,
    view_tag: Option<Tag>,
    view_tags: Option<ViewTags>,
    click_handler: Option<EventHandler<ClickEvent>>,
    long_click_handler: Option<EventHandler<LongClickEvent>>,
    focus_change_handler: Option<EventHandler<FocusChangedEvent>>,
    touch_handler: Option<EventHandler<TouchEvent>>,
    intercept_touch_handler: Option<EventHandler<InterceptTouchEvent>>,
    accessibility_handlers: AccessibilityHandlers,
    accessibility_role: Option<Arc<str>>,
    focusable: Option<bool>,
    enabled: Option<bool>,
    selected: Option<bool>,
}

macro_rules! node_info_accessors {
    ($($field:ident, $setter:ident: $ty:ty;)+) => {
        $(
            pub fn $field(&self) -> Option<&$ty> {
                self.$field.as_ref()
            }

            pub fn $setter(&mut self, value: impl Into<Option<$ty>>) -> &mut Self {
                self.$field = value.into();
                self
            }
        )+
    };
}

impl NodeInfo {
    pub fn new() -> NodeInfo {
        NodeInfo::default()
    }

    node_info_accessors! {
        content_description, set_content_description: Arc<str>;
        view_tag, set_view_tag: Tag;
        view_tags, set_view_tags: ViewTags;
        click_handler, set_click_handler: EventHandler<ClickEvent>;
        long_click_handler, set_long_click_handler: EventHandler<LongClickEvent>;
        focus_change_handler, set_focus_change_handler: EventHandler<FocusChangedEvent>;
        touch_handler, set_touch_handler: EventHandler<TouchEvent>;
        intercept_touch_handler, set_intercept_touch_handler: EventHandler<InterceptTouchEvent>;
        accessibility_role, set_accessibility_role: Arc<str>;
    }

    pub fn accessibility_handlers(&self) -> &AccessibilityHandlers {
        &self.accessibility_handlers
    }

    pub fn set_accessibility_handler(
        &mut self,
        callback: AccessibilityCallback,
        handler: impl Into<Option<EventHandler<AccessibilityEvent>>>,
    ) -> &mut Self {
        self.accessibility_handlers.set(callback, handler.into());
        self
    }

    pub fn focusable(&self) -> Option<bool> {
        self.focusable
    }

    pub fn set_focusable(&mut self, focusable: bool) -> &mut Self {
        self.focusable = Some(focusable);
        self
    }

    pub fn enabled(&self) -> Option<bool> {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn selected(&self) -> Option<bool> {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) -> &mut Self {
        self.selected = Some(selected);
        self
    }

    pub fn has_accessibility_handlers(&self) -> bool {
        !self.accessibility_handlers.is_empty()
    }

    /// True if any click, long-click, focus-change, touch or intercept-touch handler is set.
    pub fn has_interaction_handlers(&self) -> bool {
        self.click_handler.is_some()
            || self.long_click_handler.is_some()
            || self.focus_change_handler.is_some()
            || self.touch_handler.is_some()
            || self.intercept_touch_handler.is_some()
    }

    /// True if this info alone makes its content interesting to accessibility services.
    pub fn needs_accessibility(&self) -> bool {
        self.content_description.is_some()
            || self.view_tag.is_some()
            || self.view_tags.as_ref().map_or(false, |tags| !tags.is_empty())
            || self.has_interaction_handlers()
            || self.has_accessibility_handlers()
    }

    /// Compares by identity of every handler, tag and string.
    pub fn same_as(&self, other: &NodeInfo) -> bool {
        fn same_arc<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
        }

        same_arc(&self.content_description, &other.content_description)
            && same_arc(&self.view_tag, &other.view_tag)
            && same_arc(&self.view_tags, &other.view_tags)
            && same_handler(&self.click_handler, &other.click_handler)
            && same_handler(&self.long_click_handler, &other.long_click_handler)
            && same_handler(&self.focus_change_handler, &other.focus_change_handler)
            && same_handler(&self.touch_handler, &other.touch_handler)
            && same_handler(&self.intercept_touch_handler, &other.intercept_touch_handler)
            && self.accessibility_handlers.same_as(&other.accessibility_handlers)
            && same_arc(&self.accessibility_role, &other.accessibility_role)
            && self.focusable == other.focusable
            && self.enabled == other.enabled
            && self.selected == other.selected
    }

    /// Copies `source` into `self`, sharing the handlers and tags.
    pub fn copy_from(&mut self, source: &NodeInfo) {
        self.clone_from(source);
    }
}

impl Poolable for NodeInfo {
    fn create() -> Self {
        NodeInfo::default()
    }

    fn reset(&mut self) {
        *self = NodeInfo::default();
    }

    fn is_released(&self) -> bool {
        !self.needs_accessibility()
            && self.accessibility_role.is_none()
            && self.focusable.is_none()
            && self.enabled.is_none()
            && self.selected.is_none()
    }
}

/// Properties that only apply to view content: background, foreground, padding and layout
/// direction.
#[derive(Debug, Clone, Default)]
pub struct ViewNodeInfo {
    background: Option<Background>,
    foreground: Option<Arc<Drawable>>,
    padding: Option<Edges>,
    layout_direction: Option<LayoutDirection>,
}

impl ViewNodeInfo {
    pub fn new() -> ViewNodeInfo {
        ViewNodeInfo::default()
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    pub fn set_background(&mut self, background: impl Into<Option<Background>>) -> &mut Self {
        self.background = background.into();
        self
    }

    pub fn foreground(&self) -> Option<&Arc<Drawable>> {
        self.foreground.as_ref()
    }

    pub fn set_foreground(&mut self, foreground: impl Into<Option<Arc<Drawable>>>) -> &mut Self {
        self.foreground = foreground.into();
        self
    }

    pub fn padding(&self) -> Option<Edges> {
        self.padding
    }

    pub fn set_padding(&mut self, padding: impl Into<Option<Edges>>) -> &mut Self {
        self.padding = padding.into();
        self
    }

    pub fn layout_direction(&self) -> Option<LayoutDirection> {
        self.layout_direction
    }

    pub fn set_layout_direction(&mut self, direction: LayoutDirection) -> &mut Self {
        self.layout_direction = Some(direction);
        self
    }

    pub fn same_as(&self, other: &ViewNodeInfo) -> bool {
        let same_background = match (&self.background, &other.background) {
            (Some(a), Some(b)) => a.same_as(b),
            (None, None) => true,
            _ => false,
        };
        let same_foreground = match (&self.foreground, &other.foreground) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_background
            && same_foreground
            && self.padding == other.padding
            && self.layout_direction == other.layout_direction
    }

    pub fn copy_from(&mut self, source: &ViewNodeInfo) {
        self.clone_from(source);
    }
}

impl Poolable for ViewNodeInfo {
    fn create() -> Self {
        ViewNodeInfo::default()
    }

    fn reset(&mut self) {
        *self = ViewNodeInfo::default();
    }

    fn is_released(&self) -> bool {
        self.background.is_none()
            && self.foreground.is_none()
            && self.padding.is_none()
            && self.layout_direction.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessibility_triggers() {
        let mut info = NodeInfo::new();
        assert!(!info.needs_accessibility());

        info.set_content_description(Arc::<str>::from("title"));
        assert!(info.needs_accessibility());
        info.set_content_description(None);

        info.set_view_tag(Arc::new(3_u32) as Tag);
        assert!(info.needs_accessibility());
        info.set_view_tag(None);

        info.set_view_tags(Arc::new(BTreeMap::<i32, Tag>::new()));
        assert!(!info.needs_accessibility(), "an empty tag map adds nothing");
        let mut tags = BTreeMap::new();
        tags.insert(1, Arc::new("one") as Tag);
        info.set_view_tags(Arc::new(tags));
        assert!(info.needs_accessibility());
        info.set_view_tags(None);

        info.set_accessibility_handler(
            AccessibilityCallback::PerformAction,
            EventHandler::new(|_: &AccessibilityEvent| true),
        );
        assert!(info.has_accessibility_handlers());
        assert!(!info.has_interaction_handlers());
        assert!(info.needs_accessibility());
    }

    #[test]
    fn copy_preserves_identity() {
        let click = EventHandler::new(|_: &ClickEvent| true);
        let mut source = NodeInfo::new();
        source
            .set_click_handler(click.clone())
            .set_content_description(Arc::<str>::from("hello"))
            .set_enabled(false);

        let mut copy = NodeInfo::create();
        copy.copy_from(&source);
        assert!(copy.same_as(&source));
        assert!(copy.click_handler().unwrap().ptr_eq(&click));

        let mut other = NodeInfo::new();
        other.set_click_handler(EventHandler::new(|_: &ClickEvent| true));
        assert!(!other.same_as(&source));
    }

    #[test]
    fn reset_is_released() {
        let mut info = NodeInfo::new();
        info.set_selected(true);
        assert!(!info.is_released());
        info.reset();
        assert!(info.is_released());

        let mut view_info = ViewNodeInfo::new();
        view_info.set_padding(Edges::uniform(2.));
        assert!(!view_info.is_released());
        view_info.reset();
        assert!(view_info.is_released());
    }

    #[test]
    fn importance_raw() {
        for value in [
            ImportantForAccessibility::Auto,
            ImportantForAccessibility::Yes,
            ImportantForAccessibility::No,
        ] {
            assert_eq!(ImportantForAccessibility::from_raw(value.raw()), value);
        }
        assert_eq!(ImportantForAccessibility::from_raw(42), ImportantForAccessibility::Auto);
    }
}
