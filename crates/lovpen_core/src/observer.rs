//! Synchronous change notification for views reading a [`Workspace`].
//!
//! Observers run right after the mutation that produced the change, with
//! read access to the updated workspace. Nothing is batched.

use crate::panels::PanelId;
use crate::sidebar::SidebarMode;
use crate::workspace::Workspace;
use crossbeam_channel::Sender;
use serde::Serialize;

/// What a mutation changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum WorkspaceChange {
    PanelAdded {
        panel_id: PanelId,
        platform_id: String,
    },
    PanelRemoved {
        panel_id: PanelId,
    },
    PanelsReordered,
    SelectionChanged {
        mode: SidebarMode,
        selected: usize,
    },
    GlobalSettingsChanged,
    PlatformSettingsChanged {
        platform_id: String,
    },
    ContentChanged {
        characters: usize,
    },
}

/// Receives workspace change notifications.
///
/// Observers are `Send` so a workspace can live behind a mutex on a host
/// that serializes access from several threads.
pub trait WorkspaceObserver: Send {
    fn on_change(&mut self, change: &WorkspaceChange, workspace: &Workspace);
}

impl<F> WorkspaceObserver for F
where
    F: FnMut(&WorkspaceChange, &Workspace) + Send,
{
    fn on_change(&mut self, change: &WorkspaceChange, workspace: &Workspace) {
        self(change, workspace)
    }
}

/// Forwards changes into a channel for hosts that poll on their own loop.
///
/// A disconnected receiver is ignored; the workspace keeps running.
pub struct ChannelObserver {
    tx: Sender<WorkspaceChange>,
}

impl ChannelObserver {
    pub fn new(tx: Sender<WorkspaceChange>) -> Self {
        Self { tx }
    }
}

impl WorkspaceObserver for ChannelObserver {
    fn on_change(&mut self, change: &WorkspaceChange, _workspace: &Workspace) {
        let _ = self.tx.send(change.clone());
    }
}

/// Handle returned by [`Workspace::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct ObserverList {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn WorkspaceObserver>)>,
}

impl ObserverList {
    pub(crate) fn add(&mut self, observer: Box<dyn WorkspaceObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&mut self, change: &WorkspaceChange, workspace: &Workspace) {
        for (_, observer) in &mut self.entries {
            observer.on_change(change, workspace);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("subscribers", &self.entries.len())
            .finish()
    }
}
