//! Mounts computed component layouts into a hierarchy of native host views.
//!
//! Layouts are computed elsewhere (possibly on background threads) and handed to a
//! [`LithoView`], which reconciles them against what is already mounted: content is reused by
//! layout output id, moved when its index changes and recycled through pools when it goes away.

#[macro_use]
mod component;
pub mod color;
mod component_host;
mod config;
pub mod content;
mod context;
mod error;
pub mod events;
pub mod layout;
mod litho_view;
mod mount_item;
mod mount_state;
pub mod node_info;
pub mod pool;
pub mod rect;
pub mod view_attributes;

pub use component::{Component, HostComponent, MountType};
pub use component_host::ComponentHost;
pub use config::ComponentsConfiguration;
pub use context::ComponentContext;
pub use error::{MountError, Result};
pub use litho_view::{LayoutSender, LithoView};
pub use mount_item::{FlagBits, ItemKey, MountFlags, MountItem};
pub use mount_state::{MountState, MountStats};
