//! Sidebar context: selection, global settings, and per-platform overrides.
//!
//! The mode is never stored. It is computed from the selection size on every
//! read, so a mode that disagrees with the selection cannot be represented.

use crate::catalog::PlatformCatalog;
use crate::selection::SelectionSet;
use crate::settings::{EffectiveSettings, GlobalSettings, GlobalSettingsPatch, PlatformSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Settings scope shown by the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SidebarMode {
    /// Nothing selected: document-level defaults.
    Global,
    /// Exactly one panel selected: that platform's overrides.
    Platform,
    /// Several panels selected: broadcast edits.
    MultiSelect,
}

impl SidebarMode {
    /// Mode implied by a selection of `len` panels.
    pub fn for_selection_len(len: usize) -> Self {
        match len {
            0 => Self::Global,
            1 => Self::Platform,
            _ => Self::MultiSelect,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Platform => "platform",
            Self::MultiSelect => "multi-select",
        }
    }
}

impl std::fmt::Display for SidebarMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a selection write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChange {
    pub mode: SidebarMode,
    pub changed: bool,
}

/// Session state behind the settings sidebar.
#[derive(Debug, Clone, Default)]
pub struct SidebarContext {
    selected: SelectionSet,
    global_settings: GlobalSettings,
    platform_overrides: BTreeMap<String, PlatformSettings>,
}

impl SidebarContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose overrides start from each platform's catalog defaults.
    pub fn seeded(catalog: &PlatformCatalog) -> Self {
        let platform_overrides = catalog
            .iter()
            .filter(|platform| !platform.default_settings.is_empty())
            .map(|platform| (platform.id.clone(), platform.default_settings.clone()))
            .collect();
        Self {
            platform_overrides,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SidebarMode {
        SidebarMode::for_selection_len(self.selected.len())
    }

    pub fn selected_panels(&self) -> &SelectionSet {
        &self.selected
    }

    pub fn global_settings(&self) -> &GlobalSettings {
        &self.global_settings
    }

    pub fn platform_overrides(&self) -> &BTreeMap<String, PlatformSettings> {
        &self.platform_overrides
    }

    pub fn platform_settings(&self, platform_id: &str) -> Option<&PlatformSettings> {
        self.platform_overrides.get(platform_id)
    }

    /// Replace the selection.
    ///
    /// An empty `ids` is the same as [`SidebarContext::return_to_global`].
    /// Callers are responsible for passing only live panel ids.
    pub fn set_selection(&mut self, ids: SelectionSet) -> SelectionChange {
        let previous_mode = self.mode();
        if ids.is_empty() {
            return self.clear_with(previous_mode);
        }
        let changed = !self.selected.same_members(&ids);
        self.selected = ids;
        let mode = self.mode();
        if changed {
            debug!(
                from = %previous_mode,
                to = %mode,
                selected = self.selected.len(),
                "sidebar selection changed"
            );
        }
        SelectionChange { mode, changed }
    }

    /// Clear the selection, entering global mode.
    pub fn return_to_global(&mut self) -> SelectionChange {
        let previous_mode = self.mode();
        self.clear_with(previous_mode)
    }

    fn clear_with(&mut self, previous_mode: SidebarMode) -> SelectionChange {
        let changed = !self.selected.is_empty();
        self.selected = SelectionSet::new();
        if changed {
            debug!(from = %previous_mode, "sidebar returned to global");
        }
        SelectionChange {
            mode: SidebarMode::Global,
            changed,
        }
    }

    /// Merge `patch` into the global settings. Legal in every mode.
    ///
    /// # Returns
    /// `true` when a value changed.
    pub fn update_global_settings(&mut self, patch: &GlobalSettingsPatch) -> bool {
        self.global_settings.apply(patch)
    }

    /// Merge `patch` into `platform_id`'s override record, creating it if
    /// absent. Legal in every mode.
    ///
    /// # Returns
    /// `true` when the record was created or a value changed.
    pub fn update_platform_settings(&mut self, platform_id: &str, patch: &PlatformSettings) -> bool {
        match self.platform_overrides.get_mut(platform_id) {
            Some(record) => record.merge(patch),
            None => {
                self.platform_overrides
                    .insert(platform_id.to_string(), patch.clone());
                true
            }
        }
    }

    /// Global settings merged with `platform_id`'s overrides and defaults.
    ///
    /// With no platform, the platform half is the plain defaults.
    pub fn effective_settings(&self, platform_id: Option<&str>) -> EffectiveSettings {
        let platform = platform_id
            .and_then(|id| self.platform_overrides.get(id))
            .map(PlatformSettings::resolve)
            .unwrap_or_default();
        EffectiveSettings {
            platform_id: platform_id.map(str::to_string),
            global: self.global_settings.clone(),
            platform,
        }
    }
}
