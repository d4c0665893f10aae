//! Core library for the LovPen create workspace: platform catalog, preview
//! panels, panel selection, and sidebar settings resolution.

/// Platform catalog and publishing constraints.
pub mod catalog;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Workspace error types.
pub mod error;
/// Change notification for views subscribed to a workspace.
pub mod observer;
/// Ordered preview panel registry.
pub mod panels;
/// Index moves produced by drag-and-drop reordering.
pub mod reorder;
/// Mode-dependent settings views and write targets.
pub mod resolver;
/// Selection sets and interaction interpretation.
pub mod selection;
/// Global and per-platform generation settings.
pub mod settings;
/// Sidebar context state machine.
pub mod sidebar;
/// Character counting and length checks.
pub mod text;
/// Single-owner workspace session tying the pieces together.
pub mod workspace;

pub use catalog::{Platform, PlatformCatalog};
pub use config::Config;
pub use constants::*;
pub use error::WorkspaceError;
pub use observer::{ChannelObserver, SubscriptionId, WorkspaceChange, WorkspaceObserver};
pub use panels::{PanelId, PanelRegistry, PreviewPanel};
pub use selection::{Interaction, SelectionSet};
pub use sidebar::{SidebarContext, SidebarMode};
pub use workspace::{BroadcastReport, GenerationTarget, RemovalReport, Workspace, WorkspaceSnapshot};
