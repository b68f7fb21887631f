//! Error types for mounting.
//!
//! None of these reach end users. Host operations return them so the reconciler can report them
//! and carry on with the remaining items.

use crate::content::ViewId;
use crate::layout::LayoutOutputId;
use crate::mount_item::ItemKey;
use thiserror::Error;

/// Result type for mount operations.
pub type Result<T> = std::result::Result<T, MountError>;

/// Errors raised while mounting, unmounting or recycling items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    /// The item is not mounted on the host it was asked to be removed from.
    #[error("mount item {item:?} is not mounted on host {host:?}")]
    NotMounted { item: ItemKey, host: ViewId },

    /// `release` was called on an item that is already released.
    #[error("mount item {0:?} was already released")]
    AlreadyReleased(ItemKey),

    /// The item has no content to mount.
    #[error("mount item {0:?} has not been initialized")]
    NotInitialized(ItemKey),

    /// There is nothing at the source index of a move.
    #[error("nothing to move at index {index} on host {host:?}")]
    NothingToMove { index: usize, host: ViewId },

    /// A layout output names a host that is not mounted.
    #[error("no host is mounted for layout output {0:?}")]
    MissingHost(LayoutOutputId),

    /// The component of a layout output did not produce any content to mount.
    #[error("component of layout output {0:?} created no content")]
    NoContent(LayoutOutputId),

    /// A layout output id appears more than once in the same layout.
    #[error("layout output {0:?} appears more than once")]
    DuplicateId(LayoutOutputId),

    /// A layout arrived after a newer one had already been mounted.
    #[error("layout {version} was superseded by layout {mounted}")]
    Superseded { version: u64, mounted: u64 },

    /// The layout hand-off channel has no receiver anymore.
    #[error("layout channel disconnected")]
    Disconnected,
}
