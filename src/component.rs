use crate::content::Content;
use core::any::Any;
use core::fmt;

/// Implements the `Component` trait for a given struct.
///
/// Assumes that `PartialEq` is implemented; equal components are not re-mounted.
///
/// Syntax:
///
/// ```text
/// impl_component! {
///     StructName;
///     (put extra items like mount_type() here, using normal rust syntax)
/// }
/// ```
#[macro_export]
macro_rules! impl_component {
    (
        $(#[$attr:meta])*
        $struct:ty;
        $($extra:tt)*
    ) => {
        $(#[$attr])*
        impl $crate::Component for $struct {
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn is_equivalent_to(&self, other: &dyn $crate::Component) -> bool {
                if let Some(other) = other.as_any().downcast_ref::<$struct>() {
                    self == other
                } else {
                    false
                }
            }

            $($extra)*
        }
    };
}

/// What kind of content a component mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MountType {
    /// Layout-only; nothing is mounted.
    None,
    View,
    Drawable,
    /// A host view that other items are mounted into.
    Host,
}

/// Components are immutable descriptions of a piece of UI; the mount engine binds each one to a
/// piece of native content.
///
/// Content goes through `on_mount` → `on_bind` when it is attached, and `on_unbind` →
/// `on_unmount` when it is detached. Bind/unbind can also toggle on their own when the whole
/// tree goes off or on screen.
///
/// This trait should probably be implemented using the [`impl_component`] macro.
pub trait Component: Any + fmt::Debug + Send + Sync {
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Compares this component to another of possibly different type.
    fn is_equivalent_to(&self, other: &dyn Component) -> bool;

    fn simple_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    fn mount_type(&self) -> MountType {
        MountType::None
    }

    /// Creates content for this component when none can be recycled.
    fn create_mount_content(&self) -> Option<Content> {
        Content::create(self.mount_type())
    }

    /// How many pieces of recycled content to keep for this component type; `None` uses the
    /// configured default.
    fn pool_size(&self) -> Option<usize> {
        None
    }

    /// True if the component provides its own accessibility behavior.
    fn implements_accessibility(&self) -> bool {
        false
    }

    /// Whether mounted content must be refreshed when `previous` is replaced by `self`.
    fn should_update(&self, previous: &dyn Component) -> bool {
        !self.is_equivalent_to(previous)
    }

    fn on_mount(&self, content: &Content) {
        let _ = content;
    }

    fn on_unmount(&self, content: &Content) {
        let _ = content;
    }

    fn on_bind(&self, content: &Content) {
        let _ = content;
    }

    fn on_unbind(&self, content: &Content) {
        let _ = content;
    }
}

/// The component behind every nested [`ComponentHost`](crate::ComponentHost).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostComponent;

impl_component! {
    HostComponent;
    fn simple_name(&self) -> &'static str {
        "HostComponent"
    }
    fn mount_type(&self) -> MountType {
        MountType::Host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Label(&'static str);
    impl_component! {
        Label;
        fn mount_type(&self) -> MountType {
            MountType::Drawable
        }
    }

    #[test]
    fn equivalence() {
        let a = Label("a");
        assert!(a.is_equivalent_to(&Label("a")));
        assert!(!a.is_equivalent_to(&Label("b")));
        assert!(!a.is_equivalent_to(&HostComponent));
        assert!(a.should_update(&Label("b")));
        assert!(!a.should_update(&Label("a")));
    }

    #[test]
    fn content_creation() {
        assert!(Label("a").create_mount_content().unwrap().as_drawable().is_some());
        assert!(HostComponent.create_mount_content().unwrap().as_host().is_some());
        assert_eq!(HostComponent.simple_name(), "HostComponent");
    }
}
