use crate::component_host::ComponentHost;
use crate::context::ComponentContext;
use crate::error::{MountError, Result};
use crate::layout::LayoutState;
use crate::mount_state::{MountState, MountStats};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hands computed layouts to a [`LithoView`] from any thread.
#[derive(Debug, Clone)]
pub struct LayoutSender {
    sender: Sender<LayoutState>,
    versions: Arc<AtomicU64>,
}

impl LayoutSender {
    /// Reserves the version for a layout computation that is about to start.
    ///
    /// Versions increase monotonically across every sender of the same view, so a computation
    /// started later always wins over one started earlier, whichever finishes first.
    pub fn next_version(&self) -> u64 {
        self.versions.fetch_add(1, Ordering::SeqCst)
    }

    /// Queues a computed layout. It is mounted by the next [`LithoView::poll`].
    pub fn submit(&self, layout: LayoutState) -> Result<()> {
        self.sender
            .send(layout)
            .map_err(|_| MountError::Disconnected)
    }
}

/// The root of a mounted component hierarchy.
///
/// Layouts may be computed on any thread and submitted through a [`LayoutSender`]; they are only
/// mounted when the owning thread calls `poll`.
pub struct LithoView {
    mount_state: MountState,
    sender: Sender<LayoutState>,
    layout_recv: Receiver<LayoutState>,
    versions: Arc<AtomicU64>,
}

impl LithoView {
    pub fn new(context: ComponentContext) -> LithoView {
        let (sender, layout_recv) = channel::unbounded();

        LithoView {
            mount_state: MountState::new(context, Arc::new(ComponentHost::new())),
            sender,
            layout_recv,
            versions: Arc::new(AtomicU64::new(1)),
        }
    }

    /// The root host.
    pub fn host(&self) -> &Arc<ComponentHost> {
        self.mount_state.root()
    }

    pub fn mount_state(&self) -> &MountState {
        &self.mount_state
    }

    pub fn layout_sender(&self) -> LayoutSender {
        LayoutSender {
            sender: self.sender.clone(),
            versions: Arc::clone(&self.versions),
        }
    }

    /// Receives all queued layouts and mounts the newest one.
    ///
    /// Older layouts, and layouts no newer than the mounted one, are discarded. Returns the
    /// counters of the mount pass, if there was one.
    pub fn poll(&mut self) -> Option<MountStats> {
        let mut newest: Option<LayoutState> = None;
        loop {
            match self.layout_recv.try_recv() {
                Ok(layout) => {
                    let is_newer = newest
                        .as_ref()
                        .map_or(true, |current| layout.version > current.version);
                    if !is_newer {
                        self.mount_state.discard(layout.version);
                    } else if let Some(older) = newest.replace(layout) {
                        self.mount_state.discard(older.version);
                    }
                }
                Err(TryRecvError::Empty) => break,
                // we hold a sender ourselves
                Err(TryRecvError::Disconnected) => break,
            }
        }

        let layout = newest?;
        self.mount_state.mount(&layout).ok()
    }

    /// Mounts a layout right away.
    pub fn set_layout(&mut self, layout: &LayoutState) -> Result<MountStats> {
        self.mount_state.mount(layout)
    }

    /// The view went on screen.
    pub fn on_attached(&mut self) {
        self.mount_state.bind_all();
    }

    /// The view went off screen.
    pub fn on_detached(&mut self) {
        self.mount_state.unbind_all();
    }

    /// Unmounts everything; pooled content and items go back to their pools.
    pub fn release(&mut self) -> MountStats {
        self.mount_state.unmount_all()
    }
}
