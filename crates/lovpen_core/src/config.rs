//! Configuration loading from environment variables.

use crate::catalog::PlatformCatalog;
use crate::constants::{
    DEFAULT_INITIAL_PLATFORM, ENV_CATALOG_PATH, ENV_INITIAL_PLATFORM, ENV_SEED_PLATFORM_DEFAULTS,
};
use crate::error::WorkspaceError;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for a workspace session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub initial_platform: String,
    pub catalog_path: Option<PathBuf>,
    pub seed_platform_defaults: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_platform: DEFAULT_INITIAL_PLATFORM.to_string(),
            catalog_path: None,
            seed_platform_defaults: true,
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: String) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn resolve_home_dir() -> Option<PathBuf> {
    // Unix, and some Windows shells
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    None
}

/// Trimmed value of a set, non-blank variable.
fn non_blank(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reads `LOVPEN_SEED_PLATFORM_DEFAULTS`. An unset or blank variable keeps
/// seeding on; unrecognized words are ignored.
fn seed_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Unknown flag values fall back to the default rather than failing.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            initial_platform: non_blank(lookup(ENV_INITIAL_PLATFORM))
                .unwrap_or(defaults.initial_platform),
            catalog_path: non_blank(lookup(ENV_CATALOG_PATH)).map(expand_tilde),
            seed_platform_defaults: lookup(ENV_SEED_PLATFORM_DEFAULTS)
                .and_then(|value| seed_flag(&value))
                .unwrap_or(defaults.seed_platform_defaults),
        }
    }

    /// Load the configured catalog, or the built-in one when no path is set.
    ///
    /// # Errors
    /// Propagates read/parse/validation errors from
    /// [`PlatformCatalog::from_path`].
    pub fn load_catalog(&self) -> Result<PlatformCatalog, WorkspaceError> {
        match self.catalog_path.as_deref() {
            Some(path) => PlatformCatalog::from_path(path),
            None => Ok(PlatformCatalog::builtin()),
        }
    }
}
