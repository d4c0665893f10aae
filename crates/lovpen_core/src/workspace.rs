//! Single-owner workspace session.
//!
//! [`Workspace`] owns the catalog, the panel registry, and the sidebar
//! context, and is the only writer of panel `selected` flags. Every
//! selection change updates the context first and then re-syncs the panel
//! flags before any observer runs, so no observer ever sees the two disagree.

use crate::catalog::PlatformCatalog;
use crate::config::Config;
use crate::error::WorkspaceError;
use crate::observer::{ObserverList, SubscriptionId, WorkspaceChange, WorkspaceObserver};
use crate::panels::{PanelId, PanelRegistry, PreviewPanel};
use crate::reorder;
use crate::resolver::{self, ResolvedSettings, SettingsTarget, SettingsView, SidebarHeader};
use crate::selection::{self, Interaction, SelectionSet};
use crate::settings::{EffectiveSettings, GlobalSettings, GlobalSettingsPatch, PlatformSettings};
use crate::sidebar::{SidebarContext, SidebarMode};
use crate::text::{character_count, LengthCheck};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Per-platform outcome of a broadcast write.
///
/// Writes are independent: one platform failing does not undo or block the
/// others.
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub applied: Vec<String>,
    pub failed: Vec<(String, WorkspaceError)>,
}

impl BroadcastReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Per-panel outcome of removing every selected panel.
#[derive(Debug, Default)]
pub struct RemovalReport {
    pub removed: Vec<PanelId>,
    pub failed: Vec<(PanelId, WorkspaceError)>,
}

/// What the generation pipeline needs for one panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationTarget {
    pub panel_id: PanelId,
    pub platform_id: String,
    pub settings: EffectiveSettings,
    pub length: LengthCheck,
}

/// Serializable view of the whole session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    pub mode: SidebarMode,
    pub selected_panels: Vec<PanelId>,
    pub panels: Vec<PreviewPanel>,
    pub global_settings: GlobalSettings,
    pub platform_overrides: BTreeMap<String, PlatformSettings>,
    pub content_characters: usize,
}

/// The create workspace: panels, selection, and sidebar settings.
#[derive(Debug)]
pub struct Workspace {
    catalog: PlatformCatalog,
    panels: PanelRegistry,
    context: SidebarContext,
    generated_content: String,
    observers: ObserverList,
}

impl Workspace {
    /// Start a session with one panel for `initial_platform` and overrides
    /// seeded from catalog defaults.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::UnknownPlatform`] when `initial_platform` is
    /// not in `catalog`.
    pub fn new(catalog: PlatformCatalog, initial_platform: &str) -> Result<Self, WorkspaceError> {
        let context = SidebarContext::seeded(&catalog);
        Self::with_context(catalog, initial_platform, context)
    }

    /// Start a session with an explicit sidebar context.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::UnknownPlatform`] when `initial_platform` is
    /// not in `catalog`.
    pub fn with_context(
        catalog: PlatformCatalog,
        initial_platform: &str,
        mut context: SidebarContext,
    ) -> Result<Self, WorkspaceError> {
        let panels = PanelRegistry::with_initial(&catalog, initial_platform)?;
        context.return_to_global();
        info!(
            platforms = catalog.len(),
            initial_platform, "workspace session started"
        );
        Ok(Self {
            catalog,
            panels,
            context,
            generated_content: String::new(),
            observers: ObserverList::default(),
        })
    }

    /// Start a session from [`Config`].
    ///
    /// # Errors
    /// Propagates catalog loading errors and unknown initial platforms.
    pub fn from_config(config: &Config) -> Result<Self, WorkspaceError> {
        let catalog = config.load_catalog()?;
        let context = if config.seed_platform_defaults {
            SidebarContext::seeded(&catalog)
        } else {
            SidebarContext::new()
        };
        Self::with_context(catalog, &config.initial_platform, context)
    }

    pub fn catalog(&self) -> &PlatformCatalog {
        &self.catalog
    }

    pub fn panels(&self) -> &PanelRegistry {
        &self.panels
    }

    pub fn context(&self) -> &SidebarContext {
        &self.context
    }

    pub fn selection(&self) -> &SelectionSet {
        self.context.selected_panels()
    }

    pub fn mode(&self) -> SidebarMode {
        self.context.mode()
    }

    pub fn generated_content(&self) -> &str {
        &self.generated_content
    }

    /// Register `observer`; it runs synchronously after every mutation.
    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: WorkspaceObserver + 'static,
    {
        self.observers.add(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    fn notify(&mut self, change: WorkspaceChange) {
        let mut observers = std::mem::take(&mut self.observers);
        observers.notify(&change, self);
        self.observers = observers;
    }

    /// Write `next` to the context and mirror it onto panel flags.
    ///
    /// Dead ids are dropped first: selection is best-effort UI state, so a
    /// stale reference is corrected rather than reported.
    fn commit_selection(&mut self, mut next: SelectionSet) -> Option<WorkspaceChange> {
        let requested = next.len();
        next.retain(|id| self.panels.contains(id));
        if next.len() != requested {
            debug!(
                dropped = requested - next.len(),
                "filtered stale panel ids from selection"
            );
        }
        let change = self.context.set_selection(next);
        self.panels.sync_selection(self.context.selected_panels());
        debug_assert!(self.selection_flags_consistent());
        change.changed.then(|| WorkspaceChange::SelectionChanged {
            mode: change.mode,
            selected: self.context.selected_panels().len(),
        })
    }

    fn apply_selection(&mut self, next: SelectionSet) -> bool {
        match self.commit_selection(next) {
            Some(change) => {
                self.notify(change);
                true
            }
            None => false,
        }
    }

    /// `true` when every panel's flag matches selection membership.
    pub fn selection_flags_consistent(&self) -> bool {
        self.panels
            .iter()
            .all(|panel| panel.is_selected() == self.selection().contains(panel.id()))
    }

    /// Feed one UI interaction through the selection controller.
    ///
    /// # Returns
    /// `true` when the selection changed.
    pub fn handle_interaction(&mut self, interaction: &Interaction) -> bool {
        let Some(next) = selection::next_selection(self.selection(), interaction) else {
            return false;
        };
        self.apply_selection(next)
    }

    /// Click (or keyboard-activate) a panel; `modifier_held` is ctrl/meta.
    pub fn on_panel_interact(&mut self, panel_id: &PanelId, modifier_held: bool) -> bool {
        let next = selection::panel_interact(self.selection(), panel_id, modifier_held);
        self.apply_selection(next)
    }

    pub fn on_background_interact(&mut self) -> bool {
        self.apply_selection(selection::clear())
    }

    pub fn on_escape(&mut self) -> bool {
        self.apply_selection(selection::clear())
    }

    /// Replace the selection outright. Unknown ids are ignored.
    pub fn set_selection<I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = PanelId>,
    {
        self.apply_selection(SelectionSet::from_ids(ids))
    }

    /// The sidebar's explicit "back" action: clear selection, global mode.
    pub fn return_to_global(&mut self) -> bool {
        self.apply_selection(SelectionSet::new())
    }

    /// Append a panel for `platform_id`. Selection is unchanged.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::UnknownPlatform`] without mutating anything
    /// when the platform is not in the catalog.
    pub fn add_panel(&mut self, platform_id: &str) -> Result<PanelId, WorkspaceError> {
        let panel_id = self
            .panels
            .add(&self.catalog, platform_id)
            .map_err(|err| {
                warn!(platform = platform_id, error = %err, "add panel rejected");
                err
            })?;
        self.notify(WorkspaceChange::PanelAdded {
            panel_id: panel_id.clone(),
            platform_id: platform_id.to_string(),
        });
        Ok(panel_id)
    }

    /// Remove a panel, dropping it from the selection if it was selected.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::PanelNotFound`] or
    /// [`WorkspaceError::LastPanelProtected`]; state is unchanged on error.
    pub fn remove_panel(&mut self, panel_id: &PanelId) -> Result<(), WorkspaceError> {
        let removed = self.panels.remove(panel_id).map_err(|err| {
            warn!(panel = %panel_id, error = %err, "remove panel rejected");
            err
        })?;
        let selection_change = if self.selection().contains(removed.id()) {
            let mut next = self.selection().clone();
            next.remove(removed.id());
            self.commit_selection(next)
        } else {
            None
        };
        self.notify(WorkspaceChange::PanelRemoved {
            panel_id: removed.id().clone(),
        });
        if let Some(change) = selection_change {
            self.notify(change);
        }
        Ok(())
    }

    /// Remove every selected panel, one at a time.
    ///
    /// The last remaining panel is protected, so removing a selection that
    /// covers every panel leaves one behind and reports it as failed.
    pub fn remove_selected_panels(&mut self) -> RemovalReport {
        let targets: Vec<PanelId> = self.selection().iter().cloned().collect();
        let mut report = RemovalReport::default();
        for panel_id in targets {
            match self.remove_panel(&panel_id) {
                Ok(()) => report.removed.push(panel_id),
                Err(err) => report.failed.push((panel_id, err)),
            }
        }
        report
    }

    /// Replace the panel order with a permutation of the live ids.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::PermutationMismatch`] when `order` is not a
    /// permutation of the current panel ids.
    pub fn reorder(&mut self, order: &[PanelId]) -> Result<(), WorkspaceError> {
        let changed = self.panels.reorder(order).map_err(|err| {
            warn!(error = %err, "reorder rejected");
            err
        })?;
        if changed {
            self.notify(WorkspaceChange::PanelsReordered);
        }
        Ok(())
    }

    /// Apply a drag capability's "moved from index A to index B" report.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::IndexOutOfRange`] for indexes past the end.
    pub fn move_panel(&mut self, from: usize, to: usize) -> Result<(), WorkspaceError> {
        match reorder::move_index(&self.panels.ids(), from, to)? {
            Some(order) => self.reorder(&order),
            None => Ok(()),
        }
    }

    /// Apply a drag-end report naming the dragged panel and the drop target.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::PanelNotFound`] when either id is not live.
    pub fn drag_end(
        &mut self,
        active: &PanelId,
        over: Option<&PanelId>,
    ) -> Result<(), WorkspaceError> {
        match reorder::drag_end_order(&self.panels.ids(), active, over)? {
            Some(order) => self.reorder(&order),
            None => Ok(()),
        }
    }

    /// Merge `patch` into the global settings.
    pub fn update_global_settings(&mut self, patch: &GlobalSettingsPatch) -> bool {
        let changed = self.context.update_global_settings(patch);
        if changed {
            self.notify(WorkspaceChange::GlobalSettingsChanged);
        }
        changed
    }

    /// Merge `patch` into one platform's override record, in any mode.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::UnknownPlatform`] when `platform_id` is not in
    /// the catalog.
    pub fn update_platform_settings(
        &mut self,
        platform_id: &str,
        patch: &PlatformSettings,
    ) -> Result<bool, WorkspaceError> {
        self.catalog.lookup(platform_id)?;
        let changed = self.context.update_platform_settings(platform_id, patch);
        if changed {
            self.notify(WorkspaceChange::PlatformSettingsChanged {
                platform_id: platform_id.to_string(),
            });
        }
        Ok(changed)
    }

    /// Write `patch` to every selected platform, one independent call each.
    pub fn broadcast_platform_settings(&mut self, patch: &PlatformSettings) -> BroadcastReport {
        let platforms = self.selected_platforms();
        self.write_each(platforms, patch)
    }

    fn write_each(&mut self, platforms: Vec<String>, patch: &PlatformSettings) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        for platform_id in platforms {
            match self.update_platform_settings(&platform_id, patch) {
                Ok(_) => report.applied.push(platform_id),
                Err(err) => {
                    warn!(platform = %platform_id, error = %err, "broadcast write failed");
                    report.failed.push((platform_id, err));
                }
            }
        }
        report
    }

    /// Route a platform-settings edit from the sidebar to the current target:
    /// the one selected platform, or every selected platform.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::NoPlatformSelected`] in global mode.
    pub fn edit_platform_settings(
        &mut self,
        patch: &PlatformSettings,
    ) -> Result<BroadcastReport, WorkspaceError> {
        match self.write_target() {
            SettingsTarget::Global => Err(WorkspaceError::NoPlatformSelected),
            SettingsTarget::Platform(platform_id) => Ok(self.write_each(vec![platform_id], patch)),
            SettingsTarget::Broadcast(platforms) => Ok(self.write_each(platforms, patch)),
        }
    }

    /// Replace the generated content. Over-limit platforms are logged, and
    /// the content is kept as-is.
    pub fn set_generated_content(&mut self, content: impl Into<String>) {
        self.generated_content = content.into();
        let characters = character_count(&self.generated_content);
        for target in self.generation_plan() {
            if target.length.is_over_limit() {
                warn!(
                    panel = %target.panel_id,
                    platform = %target.platform_id,
                    used = target.length.used,
                    limit = target.length.limit,
                    excess = target.length.excess(),
                    "generated content exceeds platform limit"
                );
            }
        }
        self.notify(WorkspaceChange::ContentChanged { characters });
    }

    /// Platform ids of the selected panels, deduplicated, selection order.
    pub fn selected_platforms(&self) -> Vec<String> {
        resolver::selected_platforms(&self.panels, &self.context)
    }

    pub fn write_target(&self) -> SettingsTarget {
        resolver::write_target(&self.panels, &self.context)
    }

    /// The one settings view for the current mode.
    pub fn settings_view(&self) -> SettingsView<'_> {
        resolver::resolve_view(
            &self.catalog,
            &self.panels,
            &self.context,
            &self.generated_content,
        )
    }

    pub fn resolved_settings(&self) -> ResolvedSettings {
        resolver::resolved_settings(&self.panels, &self.context)
    }

    pub fn header(&self) -> SidebarHeader {
        resolver::header(&self.context)
    }

    /// Effective settings the pipeline should use for `panel_id`.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::PanelNotFound`] for ids that are not live.
    pub fn effective_settings(&self, panel_id: &PanelId) -> Result<EffectiveSettings, WorkspaceError> {
        let panel = self
            .panels
            .get(panel_id)
            .ok_or_else(|| WorkspaceError::PanelNotFound(panel_id.clone()))?;
        Ok(self.context.effective_settings(Some(panel.platform_id())))
    }

    /// One entry per panel, in display order.
    pub fn generation_plan(&self) -> Vec<GenerationTarget> {
        let characters = character_count(&self.generated_content);
        self.panels
            .iter()
            .filter_map(|panel| {
                let platform = self.catalog.get(panel.platform_id())?;
                let settings = self.context.effective_settings(Some(panel.platform_id()));
                let length = resolver::length_check(platform, &settings.platform, characters);
                Some(GenerationTarget {
                    panel_id: panel.id().clone(),
                    platform_id: panel.platform_id().to_string(),
                    settings,
                    length,
                })
            })
            .collect()
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            mode: self.mode(),
            selected_panels: self.selection().as_slice().to_vec(),
            panels: self.panels.as_slice().to_vec(),
            global_settings: self.context.global_settings().clone(),
            platform_overrides: self.context.platform_overrides().clone(),
            content_characters: character_count(&self.generated_content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::WritingStyle;
    use std::sync::{Arc, Mutex};

    fn workspace() -> Workspace {
        Workspace::new(PlatformCatalog::builtin(), "wechat").expect("workspace")
    }

    #[test]
    fn new_session_starts_in_global_mode_with_one_panel() {
        let ws = workspace();
        assert_eq!(ws.panels().len(), 1);
        assert_eq!(ws.mode(), SidebarMode::Global);
        assert!(ws.selection().is_empty());
        assert!(matches!(
            Workspace::new(PlatformCatalog::builtin(), "myspace"),
            Err(WorkspaceError::UnknownPlatform(_))
        ));
    }

    #[test]
    fn removing_selected_panel_updates_selection_and_flags() {
        let mut ws = workspace();
        let first = ws.panels().ids().remove(0);
        let zhihu = ws.add_panel("zhihu").expect("zhihu");
        let twitter = ws.add_panel("twitter").expect("twitter");
        ws.set_selection([zhihu.clone(), twitter.clone()]);
        assert_eq!(ws.mode(), SidebarMode::MultiSelect);

        ws.remove_panel(&zhihu).expect("remove");
        assert_eq!(ws.selection().as_slice(), &[twitter.clone()]);
        assert_eq!(ws.mode(), SidebarMode::Platform);
        assert!(ws.selection_flags_consistent());

        ws.remove_panel(&twitter).expect("remove");
        assert_eq!(ws.mode(), SidebarMode::Global);
        assert!(matches!(
            ws.remove_panel(&first),
            Err(WorkspaceError::LastPanelProtected)
        ));
    }

    #[test]
    fn stale_ids_are_filtered_from_selection() {
        let mut ws = workspace();
        let first = ws.panels().ids().remove(0);
        ws.set_selection([first.clone(), PanelId::from("preview-gone")]);
        assert_eq!(ws.selection().as_slice(), &[first]);
        assert_eq!(ws.mode(), SidebarMode::Platform);

        assert!(ws.on_panel_interact(&PanelId::from("preview-gone"), false));
        assert!(ws.selection().is_empty());
        assert_eq!(ws.mode(), SidebarMode::Global);
    }

    #[test]
    fn edit_platform_settings_routes_by_mode() {
        let mut ws = workspace();
        let patch = PlatformSettings {
            writing_style: Some(WritingStyle::Warm),
            ..PlatformSettings::default()
        };
        assert!(matches!(
            ws.edit_platform_settings(&patch),
            Err(WorkspaceError::NoPlatformSelected)
        ));

        let first = ws.panels().ids().remove(0);
        ws.on_panel_interact(&first, false);
        let report = ws.edit_platform_settings(&patch).expect("edit");
        assert_eq!(report.applied, vec!["wechat".to_string()]);
        assert_eq!(
            ws.context()
                .platform_settings("wechat")
                .and_then(|settings| settings.writing_style),
            Some(WritingStyle::Warm)
        );
    }

    #[test]
    fn observers_see_consistent_state_after_each_change() {
        let mut ws = workspace();
        let seen: Arc<Mutex<Vec<(WorkspaceChange, bool)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let id = ws.subscribe(move |change: &WorkspaceChange, ws: &Workspace| {
            sink.lock()
                .expect("observer lock")
                .push((change.clone(), ws.selection_flags_consistent()));
        });

        let zhihu = ws.add_panel("zhihu").expect("zhihu");
        ws.on_panel_interact(&zhihu, false);
        ws.remove_panel(&zhihu).expect("remove");
        assert!(ws.unsubscribe(id));
        ws.on_background_interact();

        let seen = seen.lock().expect("observer lock");
        let changes: Vec<&WorkspaceChange> = seen.iter().map(|(change, _)| change).collect();
        assert_eq!(changes.len(), 4);
        assert!(matches!(changes[0], WorkspaceChange::PanelAdded { .. }));
        assert_eq!(
            changes[1],
            &WorkspaceChange::SelectionChanged {
                mode: SidebarMode::Platform,
                selected: 1,
            }
        );
        assert!(matches!(changes[2], WorkspaceChange::PanelRemoved { .. }));
        assert_eq!(
            changes[3],
            &WorkspaceChange::SelectionChanged {
                mode: SidebarMode::Global,
                selected: 0,
            }
        );
        assert!(seen.iter().all(|(_, consistent)| *consistent));
    }

    #[test]
    fn generation_plan_follows_panel_order() {
        let mut ws = workspace();
        ws.add_panel("twitter").expect("twitter");
        ws.set_generated_content("z".repeat(300));

        let plan = ws.generation_plan();
        let platforms: Vec<&str> = plan.iter().map(|t| t.platform_id.as_str()).collect();
        assert_eq!(platforms, ["wechat", "twitter"]);
        assert!(!plan[0].length.is_over_limit());
        assert!(plan[1].length.is_over_limit());
        assert_eq!(ws.generated_content().len(), 300, "content is never truncated");
    }
}
