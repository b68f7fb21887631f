//! Native content that mount items place into hosts.
//!
//! The mount engine treats content as opaque apart from the handful of properties it has to
//! keep in sync: bounds, parent/callback attachment, view state and view attributes. Each kind
//! keeps those behind its own lock so content can be handed between threads, but it is only
//! ever mutated from the mounting thread.

use crate::color::Color;
use crate::component::MountType;
use crate::component_host::ComponentHost;
use crate::events::{
    AccessibilityCallback, AccessibilityEvent, ClickEvent, EventHandler, FocusChangedEvent,
    InterceptTouchEvent, LongClickEvent, TouchAction, TouchEvent,
};
use crate::node_info::{AccessibilityHandlers, ImportantForAccessibility, Tag};
use crate::rect::{Edges, Rect};
use bitflags::bitflags;
use cgmath::Point2;
use core::fmt;
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// A unique identifier for a piece of native content.
///
/// (this is just a UUID)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u32, u16, u16, [u8; 8]);

impl ViewId {
    pub fn new() -> ViewId {
        let uuid = Uuid::new_v4();
        let (a, b, c, d) = uuid.as_fields();
        ViewId(a, b, c, *d)
    }
}

bitflags! {
    /// Drawable state of a view or drawable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ViewState: u8 {
        const ENABLED = 1 << 0;
        const PRESSED = 1 << 1;
        const SELECTED = 1 << 2;
        const FOCUSED = 1 << 3;
        const ACTIVATED = 1 << 4;
        const CHECKED = 1 << 5;
    }
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::ENABLED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutDirection {
    Inherit,
    Ltr,
    Rtl,
}

impl Default for LayoutDirection {
    fn default() -> Self {
        LayoutDirection::Inherit
    }
}

/// A view background or foreground.
#[derive(Debug, Clone)]
pub enum Background {
    Color(Color),
    Drawable(Arc<Drawable>),
}

impl Background {
    /// Identity comparison; drawables compare by reference.
    pub fn same_as(&self, other: &Background) -> bool {
        match (self, other) {
            (Background::Color(a), Background::Color(b)) => a == b,
            (Background::Drawable(a), Background::Drawable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Mutable properties of a native view.
pub struct ViewProps {
    pub bounds: Rect,
    /// The host this view is attached to.
    pub parent: Option<ViewId>,
    pub state: ViewState,
    pub duplicate_parent_state: bool,

    pub click_handler: Option<EventHandler<ClickEvent>>,
    pub long_click_handler: Option<EventHandler<LongClickEvent>>,
    pub focus_change_handler: Option<EventHandler<FocusChangedEvent>>,
    pub touch_handler: Option<EventHandler<TouchEvent>>,
    pub intercept_touch_handler: Option<EventHandler<InterceptTouchEvent>>,
    /// Accessibility delegate handlers.
    pub accessibility_handlers: Option<AccessibilityHandlers>,

    pub clickable: bool,
    pub long_clickable: bool,
    pub focusable: bool,

    pub content_description: Option<Arc<str>>,
    pub tag: Option<Tag>,
    pub tags: BTreeMap<i32, Tag>,

    pub padding: Edges,
    pub background: Option<Background>,
    pub foreground: Option<Arc<Drawable>>,
    pub layout_direction: LayoutDirection,
    pub important_for_accessibility: ImportantForAccessibility,
}

impl Default for ViewProps {
    fn default() -> Self {
        ViewProps {
            bounds: Rect::zero(),
            parent: None,
            state: ViewState::default(),
            duplicate_parent_state: false,
            click_handler: None,
            long_click_handler: None,
            focus_change_handler: None,
            touch_handler: None,
            intercept_touch_handler: None,
            accessibility_handlers: None,
            clickable: false,
            long_clickable: false,
            focusable: false,
            content_description: None,
            tag: None,
            tags: BTreeMap::new(),
            padding: Edges::default(),
            background: None,
            foreground: None,
            layout_direction: LayoutDirection::default(),
            important_for_accessibility: ImportantForAccessibility::Auto,
        }
    }
}

struct DebugifyOption<'a, T>(&'a Option<T>);
impl<'a, T> fmt::Debug for DebugifyOption<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0.is_some() {
            write!(f, "Some(..)")
        } else {
            write!(f, "None")
        }
    }
}

impl fmt::Debug for ViewProps {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ViewProps")
            .field("bounds", &self.bounds)
            .field("parent", &self.parent)
            .field("state", &self.state)
            .field("duplicate_parent_state", &self.duplicate_parent_state)
            .field("click_handler", &self.click_handler)
            .field("long_click_handler", &self.long_click_handler)
            .field("focus_change_handler", &self.focus_change_handler)
            .field("touch_handler", &self.touch_handler)
            .field("intercept_touch_handler", &self.intercept_touch_handler)
            .field("accessibility_handlers", &self.accessibility_handlers)
            .field("content_description", &self.content_description)
            .field("tag", &DebugifyOption(&self.tag))
            .field("tags", &self.tags.keys().collect::<Vec<_>>())
            .field("padding", &self.padding)
            .field("background", &self.background)
            .field("layout_direction", &self.layout_direction)
            .field("important_for_accessibility", &self.important_for_accessibility)
            .finish()
    }
}

/// A native view.
#[derive(Debug)]
pub struct NativeView {
    id: ViewId,
    props: Mutex<ViewProps>,
}

impl NativeView {
    pub fn new() -> NativeView {
        NativeView {
            id: ViewId::new(),
            props: Mutex::new(ViewProps::default()),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Locks the view properties.
    ///
    /// Do not dispatch events while holding the guard; handlers may touch the view.
    pub fn props(&self) -> MutexGuard<'_, ViewProps> {
        self.props.lock()
    }

    pub fn bounds(&self) -> Rect {
        self.props.lock().bounds
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.props.lock().bounds = bounds;
    }

    pub fn parent(&self) -> Option<ViewId> {
        self.props.lock().parent
    }

    pub fn state(&self) -> ViewState {
        self.props.lock().state
    }

    /// Returns true if the state changed.
    pub fn set_state(&self, state: ViewState) -> bool {
        let mut props = self.props.lock();
        let changed = props.state != state;
        props.state = state;
        changed
    }

    pub fn is_duplicate_parent_state_enabled(&self) -> bool {
        self.props.lock().duplicate_parent_state
    }

    pub fn content_description(&self) -> Option<Arc<str>> {
        self.props.lock().content_description.clone()
    }

    pub fn important_for_accessibility(&self) -> ImportantForAccessibility {
        self.props.lock().important_for_accessibility
    }

    /// Clicks the view, as a tap on screen would.
    pub fn perform_click(&self) -> bool {
        let (handler, enabled) = {
            let props = self.props.lock();
            (props.click_handler.clone(), props.state.contains(ViewState::ENABLED))
        };
        match handler {
            Some(handler) if enabled => handler.dispatch(&ClickEvent { view: self.id }),
            _ => false,
        }
    }

    pub fn perform_long_click(&self) -> bool {
        let handler = self.props.lock().long_click_handler.clone();
        match handler {
            Some(handler) => handler.dispatch(&LongClickEvent { view: self.id }),
            None => false,
        }
    }

    /// Moves focus to or away from this view and notifies the focus-change handler.
    pub fn set_focused(&self, has_focus: bool) {
        let handler = {
            let mut props = self.props.lock();
            props.state.set(ViewState::FOCUSED, has_focus);
            props.focus_change_handler.clone()
        };
        if let Some(handler) = handler {
            handler.dispatch(&FocusChangedEvent {
                view: self.id,
                has_focus,
            });
        }
    }

    /// Delivers a touch. The intercept handler sees it first.
    pub fn dispatch_touch(&self, action: TouchAction, location: Point2<f64>) -> bool {
        let (intercept, touch) = {
            let props = self.props.lock();
            (
                props.intercept_touch_handler.clone(),
                props.touch_handler.clone(),
            )
        };
        if let Some(intercept) = intercept {
            let event = InterceptTouchEvent {
                view: self.id,
                action,
                location,
            };
            if intercept.dispatch(&event) {
                return true;
            }
        }
        match touch {
            Some(touch) => touch.dispatch(&TouchEvent {
                view: self.id,
                action,
                location,
            }),
            None => false,
        }
    }

    /// Routes an accessibility callback to the view’s delegate, if it has one.
    pub fn dispatch_accessibility(&self, callback: AccessibilityCallback, code: i32) -> bool {
        let handler = self
            .props
            .lock()
            .accessibility_handlers
            .as_ref()
            .and_then(|handlers| handlers.get(callback).cloned());
        match handler {
            Some(handler) => handler.dispatch(&AccessibilityEvent {
                view: self.id,
                callback,
                code,
            }),
            None => false,
        }
    }
}

impl Default for NativeView {
    fn default() -> Self {
        NativeView::new()
    }
}

/// Mutable properties of a drawable.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableProps {
    pub bounds: Rect,
    pub state: ViewState,
    pub visible: bool,
    /// The host that invalidates and draws this drawable.
    pub callback: Option<ViewId>,
}

/// A drawable; lighter than a view and drawn directly by its host.
#[derive(Debug)]
pub struct Drawable {
    id: ViewId,
    stateful: bool,
    props: Mutex<DrawableProps>,
}

impl Drawable {
    /// Creates a drawable. Only stateful drawables react to state changes.
    pub fn new(stateful: bool) -> Drawable {
        Drawable {
            id: ViewId::new(),
            stateful,
            props: Mutex::new(DrawableProps {
                bounds: Rect::zero(),
                state: ViewState::default(),
                visible: true,
                callback: None,
            }),
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn is_stateful(&self) -> bool {
        self.stateful
    }

    pub fn props(&self) -> DrawableProps {
        self.props.lock().clone()
    }

    pub fn bounds(&self) -> Rect {
        self.props.lock().bounds
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.props.lock().bounds = bounds;
    }

    pub fn state(&self) -> ViewState {
        self.props.lock().state
    }

    /// Returns true if the state changed. Stateless drawables ignore this.
    pub fn set_state(&self, state: ViewState) -> bool {
        if !self.stateful {
            return false;
        }
        let mut props = self.props.lock();
        let changed = props.state != state;
        props.state = state;
        changed
    }

    pub fn set_visible(&self, visible: bool) {
        self.props.lock().visible = visible;
    }

    pub fn callback(&self) -> Option<ViewId> {
        self.props.lock().callback
    }

    pub(crate) fn set_callback(&self, callback: Option<ViewId>) {
        self.props.lock().callback = callback;
    }
}

/// Content mounted for one mount item.
#[derive(Debug, Clone)]
pub enum Content {
    View(Arc<NativeView>),
    Drawable(Arc<Drawable>),
    /// A nested host; it is a view that can have mounted children of its own.
    Host(Arc<ComponentHost>),
}

impl Content {
    /// Creates fresh content of the given type.
    ///
    /// Returns `None` for [`MountType::None`].
    pub fn create(mount_type: MountType) -> Option<Content> {
        match mount_type {
            MountType::View => Some(Content::View(Arc::new(NativeView::new()))),
            MountType::Drawable => Some(Content::Drawable(Arc::new(Drawable::new(true)))),
            MountType::Host => Some(Content::Host(Arc::new(ComponentHost::new()))),
            MountType::None => None,
        }
    }

    pub fn id(&self) -> ViewId {
        match self {
            Content::View(view) => view.id(),
            Content::Drawable(drawable) => drawable.id(),
            Content::Host(host) => host.id(),
        }
    }

    pub fn mount_type(&self) -> MountType {
        match self {
            Content::View(_) => MountType::View,
            Content::Drawable(_) => MountType::Drawable,
            Content::Host(_) => MountType::Host,
        }
    }

    /// Returns true if both are the same piece of content.
    pub fn ptr_eq(&self, other: &Content) -> bool {
        match (self, other) {
            (Content::View(a), Content::View(b)) => Arc::ptr_eq(a, b),
            (Content::Drawable(a), Content::Drawable(b)) => Arc::ptr_eq(a, b),
            (Content::Host(a), Content::Host(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The view backing this content; hosts are views too.
    pub fn as_view(&self) -> Option<&NativeView> {
        match self {
            Content::View(view) => Some(view),
            Content::Host(host) => Some(host.view()),
            Content::Drawable(_) => None,
        }
    }

    pub fn as_drawable(&self) -> Option<&Arc<Drawable>> {
        match self {
            Content::Drawable(drawable) => Some(drawable),
            _ => None,
        }
    }

    pub fn as_host(&self) -> Option<&Arc<ComponentHost>> {
        match self {
            Content::Host(host) => Some(host),
            _ => None,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Content::Drawable(drawable) => drawable.bounds(),
            _ => self.as_view().map(NativeView::bounds).unwrap_or_default(),
        }
    }

    pub fn set_bounds(&self, bounds: Rect) {
        match self {
            Content::Drawable(drawable) => drawable.set_bounds(bounds),
            Content::View(view) => view.set_bounds(bounds),
            Content::Host(host) => host.view().set_bounds(bounds),
        }
    }
}
