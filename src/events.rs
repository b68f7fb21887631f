//! Events dispatched from native content back to components.

use crate::content::ViewId;
use cgmath::Point2;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// List of event types.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventTypeId {
    Click = 0,
    LongClick = 1,
    FocusChanged = 2,
    Touch = 3,
    InterceptTouch = 4,
    Accessibility = 5,
}

pub trait EventType: fmt::Debug {
    fn type_id() -> EventTypeId;
}

/// A view was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub view: ViewId,
}

/// A view was long-pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongClickEvent {
    pub view: ViewId,
}

/// A view gained or lost focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusChangedEvent {
    pub view: ViewId,
    pub has_focus: bool,
}

/// Phases of a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// A touch on a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub view: ViewId,
    pub action: TouchAction,
    /// Location in the view’s coordinate system.
    pub location: Point2<f64>,
}

/// A touch a host may steal from its children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterceptTouchEvent {
    pub view: ViewId,
    pub action: TouchAction,
    pub location: Point2<f64>,
}

/// Which accessibility callback is being dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessibilityCallback {
    DispatchPopulateEvent,
    InitializeEvent,
    InitializeNodeInfo,
    PopulateEvent,
    RequestSendEvent,
    PerformAction,
    SendEvent,
    SendEventUnchecked,
}

/// An accessibility callback from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessibilityEvent {
    pub view: ViewId,
    pub callback: AccessibilityCallback,
    /// Platform event type or action id; opaque to this crate.
    pub code: i32,
}

macro_rules! impl_event_type {
    ($($t:ident => $id:ident),+ $(,)?) => {
        $(
            impl EventType for $t {
                fn type_id() -> EventTypeId {
                    EventTypeId::$id
                }
            }
        )+
    }
}
impl_event_type!(
    ClickEvent => Click,
    LongClickEvent => LongClick,
    FocusChangedEvent => FocusChanged,
    TouchEvent => Touch,
    InterceptTouchEvent => InterceptTouch,
    AccessibilityEvent => Accessibility,
);

/// A handler bound to native content.
///
/// Handlers are shared: cloning one yields the same handler, which is what the mount engine
/// relies on when it compares handlers by identity.
pub struct EventHandler<Type>(Arc<Mutex<dyn FnMut(&Type) -> bool + Send>>);

impl<T> Clone for EventHandler<T> {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl<T: EventType + 'static> EventHandler<T> {
    /// Creates a handler. The closure returns whether it consumed the event.
    pub fn new<F: 'static + FnMut(&T) -> bool + Send>(handler: F) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    /// Dispatches an event and returns whether it was handled.
    pub fn dispatch(&self, event: &T) -> bool {
        let mut handler = self.0.lock();
        (&mut *handler)(event)
    }
}

impl<T> EventHandler<T> {
    /// Returns true if both refer to the same handler.
    pub fn ptr_eq(&self, other: &EventHandler<T>) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: EventType> fmt::Debug for EventHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler<{:?}>", T::type_id())
    }
}

/// Compares two optional handlers by identity.
pub(crate) fn same_handler<T>(a: &Option<EventHandler<T>>, b: &Option<EventHandler<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.ptr_eq(b),
        (None, None) => true,
        _ => false,
    }
}
