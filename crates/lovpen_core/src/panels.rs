//! Ordered registry of preview panels, one per target platform slot.

use crate::catalog::PlatformCatalog;
use crate::constants::{PANEL_ID_PREFIX, PANEL_TITLE_SUFFIX};
use crate::error::WorkspaceError;
use crate::selection::SelectionSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::info;
use uuid::Uuid;

/// Opaque, stable panel identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    /// Generate a fresh `preview-<uuid>` id.
    pub fn generate() -> Self {
        Self(format!("{}{}", PANEL_ID_PREFIX, Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PanelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One preview slot bound to a single platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPanel {
    id: PanelId,
    platform_id: String,
    title: String,
    selected: bool,
    created_at: DateTime<Utc>,
}

impl PreviewPanel {
    pub fn id(&self) -> &PanelId {
        &self.id
    }

    pub fn platform_id(&self) -> &str {
        &self.platform_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Mirror of the sidebar selection; only the workspace writes it.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Ordered panel list. Never empty once constructed.
#[derive(Debug, Clone)]
pub struct PanelRegistry {
    panels: Vec<PreviewPanel>,
}

impl PanelRegistry {
    /// Create a registry holding one panel for `platform_id`.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::UnknownPlatform`] when the platform is not in
    /// `catalog`.
    pub fn with_initial(
        catalog: &PlatformCatalog,
        platform_id: &str,
    ) -> Result<Self, WorkspaceError> {
        let panel = Self::build_panel(catalog, platform_id)?;
        Ok(Self {
            panels: vec![panel],
        })
    }

    fn build_panel(
        catalog: &PlatformCatalog,
        platform_id: &str,
    ) -> Result<PreviewPanel, WorkspaceError> {
        let platform = catalog.lookup(platform_id)?;
        Ok(PreviewPanel {
            id: PanelId::generate(),
            platform_id: platform.id.clone(),
            title: format!("{}{}", platform.full_name, PANEL_TITLE_SUFFIX),
            selected: false,
            created_at: Utc::now(),
        })
    }

    /// Append an unselected panel for `platform_id`.
    ///
    /// # Returns
    /// The new panel's id.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::UnknownPlatform`] without creating a panel
    /// when the platform is not in `catalog`.
    pub fn add(
        &mut self,
        catalog: &PlatformCatalog,
        platform_id: &str,
    ) -> Result<PanelId, WorkspaceError> {
        let panel = Self::build_panel(catalog, platform_id)?;
        let id = panel.id.clone();
        info!(panel = %id, platform = platform_id, "added preview panel");
        self.panels.push(panel);
        Ok(id)
    }

    /// Remove a panel.
    ///
    /// # Returns
    /// The removed panel.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::PanelNotFound`] for unknown ids and
    /// [`WorkspaceError::LastPanelProtected`] when `id` is the only panel.
    pub fn remove(&mut self, id: &PanelId) -> Result<PreviewPanel, WorkspaceError> {
        let index = self
            .position(id)
            .ok_or_else(|| WorkspaceError::PanelNotFound(id.clone()))?;
        if self.panels.len() == 1 {
            return Err(WorkspaceError::LastPanelProtected);
        }
        let panel = self.panels.remove(index);
        info!(panel = %panel.id, platform = %panel.platform_id, "removed preview panel");
        Ok(panel)
    }

    /// Replace the panel order with `new_order`, a permutation of live ids.
    ///
    /// Panels move with their selection flags, so reordering never changes
    /// which panels are selected.
    ///
    /// # Returns
    /// `true` when the order actually changed.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::PermutationMismatch`] when `new_order` has a
    /// different length, duplicates, or ids that are not live.
    pub fn reorder(&mut self, new_order: &[PanelId]) -> Result<bool, WorkspaceError> {
        self.validate_permutation(new_order)?;
        if self
            .panels
            .iter()
            .map(|panel| &panel.id)
            .eq(new_order.iter())
        {
            return Ok(false);
        }

        let mut by_id: HashMap<PanelId, PreviewPanel> = self
            .panels
            .drain(..)
            .map(|panel| (panel.id.clone(), panel))
            .collect();
        for id in new_order {
            if let Some(panel) = by_id.remove(id) {
                self.panels.push(panel);
            }
        }
        info!(panels = self.panels.len(), "reordered preview panels");
        Ok(true)
    }

    fn validate_permutation(&self, new_order: &[PanelId]) -> Result<(), WorkspaceError> {
        if new_order.len() != self.panels.len() {
            return Err(WorkspaceError::PermutationMismatch(format!(
                "expected {} ids, got {}",
                self.panels.len(),
                new_order.len()
            )));
        }
        let mut seen = HashSet::with_capacity(new_order.len());
        for id in new_order {
            if !seen.insert(id) {
                return Err(WorkspaceError::PermutationMismatch(format!(
                    "duplicate id '{}'",
                    id
                )));
            }
            if !self.contains(id) {
                return Err(WorkspaceError::PermutationMismatch(format!(
                    "unknown id '{}'",
                    id
                )));
            }
        }
        Ok(())
    }

    /// Recompute every panel's `selected` flag from `selection`.
    pub(crate) fn sync_selection(&mut self, selection: &SelectionSet) {
        for panel in &mut self.panels {
            panel.selected = selection.contains(&panel.id);
        }
    }

    pub fn get(&self, id: &PanelId) -> Option<&PreviewPanel> {
        self.panels.iter().find(|panel| &panel.id == id)
    }

    pub fn position(&self, id: &PanelId) -> Option<usize> {
        self.panels.iter().position(|panel| &panel.id == id)
    }

    pub fn contains(&self, id: &PanelId) -> bool {
        self.position(id).is_some()
    }

    /// Panel ids in display order.
    pub fn ids(&self) -> Vec<PanelId> {
        self.panels.iter().map(|panel| panel.id.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PreviewPanel> {
        self.panels.iter()
    }

    pub fn as_slice(&self) -> &[PreviewPanel] {
        &self.panels
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (PlatformCatalog, PanelRegistry) {
        let catalog = PlatformCatalog::builtin();
        let registry = PanelRegistry::with_initial(&catalog, "wechat").expect("registry");
        (catalog, registry)
    }

    #[test]
    fn add_appends_unselected_panel_with_catalog_title() {
        let (catalog, mut registry) = registry();
        let id = registry.add(&catalog, "zhihu").expect("add");

        assert_eq!(registry.len(), 2);
        let panel = registry.get(&id).expect("panel");
        assert_eq!(panel.platform_id(), "zhihu");
        assert_eq!(panel.title(), "Zhihu Column Preview");
        assert!(!panel.is_selected());
        assert!(panel.id().as_str().starts_with(PANEL_ID_PREFIX));
        assert_eq!(registry.position(&id), Some(1));
    }

    #[test]
    fn add_unknown_platform_leaves_registry_unchanged() {
        let (catalog, mut registry) = registry();
        let before = registry.ids();
        assert!(matches!(
            registry.add(&catalog, "unknown-platform"),
            Err(WorkspaceError::UnknownPlatform(_))
        ));
        assert_eq!(registry.ids(), before);
    }

    #[test]
    fn last_panel_cannot_be_removed() {
        let (_catalog, mut registry) = registry();
        let only = registry.ids().remove(0);
        assert!(matches!(
            registry.remove(&only),
            Err(WorkspaceError::LastPanelProtected)
        ));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&only));
    }

    #[test]
    fn remove_unknown_panel_is_not_found() {
        let (catalog, mut registry) = registry();
        registry.add(&catalog, "twitter").expect("add");
        assert!(matches!(
            registry.remove(&PanelId::from("preview-missing")),
            Err(WorkspaceError::PanelNotFound(_))
        ));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn reorder_moves_selection_flags_with_panels() {
        let (catalog, mut registry) = registry();
        let second = registry.add(&catalog, "zhihu").expect("add");
        let third = registry.add(&catalog, "twitter").expect("add");
        registry.sync_selection(&SelectionSet::single(second.clone()));

        let mut order = registry.ids();
        order.reverse();
        assert!(registry.reorder(&order).expect("reorder"));

        assert_eq!(registry.ids(), order);
        assert_eq!(registry.position(&third), Some(0));
        let selected: Vec<&PanelId> = registry
            .iter()
            .filter(|panel| panel.is_selected())
            .map(PreviewPanel::id)
            .collect();
        assert_eq!(selected, vec![&second]);
    }

    #[test]
    fn reorder_rejects_non_permutations() {
        let (catalog, mut registry) = registry();
        let second = registry.add(&catalog, "zhihu").expect("add");
        let before = registry.ids();

        let short = vec![second.clone()];
        let duplicated = vec![second.clone(), second.clone()];
        let foreign = vec![second, PanelId::from("preview-ghost")];
        for order in [short, duplicated, foreign] {
            assert!(matches!(
                registry.reorder(&order),
                Err(WorkspaceError::PermutationMismatch(_))
            ));
            assert_eq!(registry.ids(), before);
        }
    }

    #[test]
    fn reorder_with_current_order_reports_no_change() {
        let (catalog, mut registry) = registry();
        registry.add(&catalog, "zhihu").expect("add");
        let current = registry.ids();
        assert!(!registry.reorder(&current).expect("reorder"));
        assert_eq!(registry.ids(), current);
    }
}
