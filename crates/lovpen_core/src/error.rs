//! Workspace error types.
//!
//! Every variant is a local, recoverable condition: the failing operation
//! leaves workspace state untouched.
use crate::panels::PanelId;
use thiserror::Error;

/// Error returned by fallible workspace operations.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("The last remaining panel cannot be removed")]
    LastPanelProtected,

    #[error("Reorder ids do not match live panels: {0}")]
    PermutationMismatch(String),

    #[error("Panel not found: {0}")]
    PanelNotFound(PanelId),

    #[error("Index {index} out of range for {len} panels")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No platform panel is selected")]
    NoPlatformSelected,

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Catalog parse error: {0}")]
    CatalogParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
