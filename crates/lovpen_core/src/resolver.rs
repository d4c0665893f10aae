//! Mode-dependent settings views and their write targets.
//!
//! Exactly one view is active at a time:
//! - global mode shows and writes [`GlobalSettings`];
//! - platform mode shows the selected panel's platform overrides, resolved
//!   against defaults, plus a length check against the platform limit;
//! - multi-select mode is a write-only broadcast surface. It holds no merged
//!   value; every edit is copied into each selected platform's record.

use crate::catalog::{Platform, PlatformCatalog};
use crate::panels::{PanelId, PanelRegistry};
use crate::settings::{GlobalSettings, PlatformSettings, ResolvedPlatformSettings};
use crate::sidebar::{SidebarContext, SidebarMode};
use crate::text::{character_count, LengthCheck};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Platform ids of the selected panels, in selection order, without repeats.
///
/// Ids that no longer resolve to a live panel are skipped.
pub fn selected_platforms(registry: &PanelRegistry, context: &SidebarContext) -> Vec<String> {
    let mut platforms: Vec<String> = Vec::new();
    for panel_id in context.selected_panels().iter() {
        let Some(panel) = registry.get(panel_id) else {
            continue;
        };
        if !platforms.iter().any(|existing| existing == panel.platform_id()) {
            platforms.push(panel.platform_id().to_string());
        }
    }
    platforms
}

/// Where sidebar edits are written for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsTarget {
    Global,
    Platform(String),
    Broadcast(Vec<String>),
}

/// Compute the write target for the current mode.
pub fn write_target(registry: &PanelRegistry, context: &SidebarContext) -> SettingsTarget {
    match context.mode() {
        SidebarMode::Global => SettingsTarget::Global,
        SidebarMode::Platform | SidebarMode::MultiSelect => {
            let mut platforms = selected_platforms(registry, context);
            if context.mode() == SidebarMode::Platform && platforms.len() == 1 {
                SettingsTarget::Platform(platforms.remove(0))
            } else {
                SettingsTarget::Broadcast(platforms)
            }
        }
    }
}

/// Feature switch a platform may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlatformFeature {
    UseHashtags,
    IncludeCallToAction,
}

/// A feature switch shown in the platform view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureToggle {
    pub feature: PlatformFeature,
    pub enabled: bool,
}

impl FeatureToggle {
    /// Patch that flips this toggle.
    pub fn flip_patch(&self) -> PlatformSettings {
        let mut patch = PlatformSettings::default();
        match self.feature {
            PlatformFeature::UseHashtags => patch.use_hashtags = Some(!self.enabled),
            PlatformFeature::IncludeCallToAction => {
                patch.include_call_to_action = Some(!self.enabled)
            }
        }
        patch
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalView<'a> {
    pub settings: &'a GlobalSettings,
    pub panel_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformView<'a> {
    pub panel_id: PanelId,
    pub platform: &'a Platform,
    pub settings: ResolvedPlatformSettings,
    pub length: LengthCheck,
    /// Only toggles the override record defines.
    pub toggles: Vec<FeatureToggle>,
}

impl PlatformView<'_> {
    /// Human summary of image requirements, if the platform declares any.
    pub fn image_summary(&self) -> Option<String> {
        self.platform
            .constraints
            .image_requirements
            .as_ref()
            .map(|requirements| requirements.summary())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSelectView<'a> {
    pub platforms: Vec<&'a Platform>,
    pub panel_count: usize,
}

/// The one settings view the sidebar renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsView<'a> {
    Global(GlobalView<'a>),
    Platform(PlatformView<'a>),
    MultiSelect(MultiSelectView<'a>),
}

impl SettingsView<'_> {
    pub fn mode(&self) -> SidebarMode {
        match self {
            Self::Global(_) => SidebarMode::Global,
            Self::Platform(_) => SidebarMode::Platform,
            Self::MultiSelect(_) => SidebarMode::MultiSelect,
        }
    }
}

/// Length check for `platform` using an explicit per-platform limit when set.
pub fn length_check(
    platform: &Platform,
    settings: &ResolvedPlatformSettings,
    characters: usize,
) -> LengthCheck {
    let limit = settings
        .character_limit
        .unwrap_or(platform.constraints.max_characters);
    LengthCheck::from_count(characters, limit)
}

fn feature_toggles(settings: &ResolvedPlatformSettings) -> Vec<FeatureToggle> {
    let mut toggles = Vec::new();
    if let Some(enabled) = settings.use_hashtags {
        toggles.push(FeatureToggle {
            feature: PlatformFeature::UseHashtags,
            enabled,
        });
    }
    if let Some(enabled) = settings.include_call_to_action {
        toggles.push(FeatureToggle {
            feature: PlatformFeature::IncludeCallToAction,
            enabled,
        });
    }
    toggles
}

fn resolved_for(context: &SidebarContext, platform_id: &str) -> ResolvedPlatformSettings {
    context
        .platform_settings(platform_id)
        .map(PlatformSettings::resolve)
        .unwrap_or_default()
}

/// Build the view for the current context.
///
/// `content` is the generated text whose length the platform view checks.
pub fn resolve_view<'a>(
    catalog: &'a PlatformCatalog,
    registry: &PanelRegistry,
    context: &'a SidebarContext,
    content: &str,
) -> SettingsView<'a> {
    let global = move || {
        SettingsView::Global(GlobalView {
            settings: context.global_settings(),
            panel_count: registry.len(),
        })
    };
    match context.mode() {
        SidebarMode::Global => global(),
        SidebarMode::Platform => {
            let Some(panel) = context
                .selected_panels()
                .first()
                .and_then(|id| registry.get(id))
            else {
                return global();
            };
            let Some(platform) = catalog.get(panel.platform_id()) else {
                warn!(platform = panel.platform_id(), "selected panel platform missing from catalog");
                return global();
            };
            let settings = resolved_for(context, &platform.id);
            let length = length_check(platform, &settings, character_count(content));
            let toggles = feature_toggles(&settings);
            SettingsView::Platform(PlatformView {
                panel_id: panel.id().clone(),
                platform,
                settings,
                length,
                toggles,
            })
        }
        SidebarMode::MultiSelect => {
            let platforms = selected_platforms(registry, context)
                .iter()
                .filter_map(|platform_id| catalog.get(platform_id))
                .collect();
            SettingsView::MultiSelect(MultiSelectView {
                platforms,
                panel_count: context.selected_panels().len(),
            })
        }
    }
}

/// Settings values for the current mode, as read by hosts and pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ResolvedSettings {
    Global {
        settings: GlobalSettings,
    },
    Platform {
        platform_id: String,
        settings: ResolvedPlatformSettings,
    },
    /// Independent per-platform values; there is no aggregate.
    MultiSelect {
        settings: BTreeMap<String, ResolvedPlatformSettings>,
    },
}

/// Resolve settings values for the current mode.
pub fn resolved_settings(registry: &PanelRegistry, context: &SidebarContext) -> ResolvedSettings {
    match write_target(registry, context) {
        SettingsTarget::Global => ResolvedSettings::Global {
            settings: context.global_settings().clone(),
        },
        SettingsTarget::Platform(platform_id) => ResolvedSettings::Platform {
            settings: resolved_for(context, &platform_id),
            platform_id,
        },
        SettingsTarget::Broadcast(platforms) => ResolvedSettings::MultiSelect {
            settings: platforms
                .into_iter()
                .map(|platform_id| {
                    let settings = resolved_for(context, &platform_id);
                    (platform_id, settings)
                })
                .collect(),
        },
    }
}

/// Sidebar header copy and controls for the current mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarHeader {
    pub mode: SidebarMode,
    pub title: &'static str,
    pub hint: String,
    pub selected_count: usize,
    /// The "back to global" control is offered only while something is selected.
    pub show_back: bool,
}

pub fn header(context: &SidebarContext) -> SidebarHeader {
    let selected_count = context.selected_panels().len();
    let mode = context.mode();
    let (title, hint) = match mode {
        SidebarMode::Global => (
            "Creation settings",
            "Click a panel for platform-specific settings".to_string(),
        ),
        SidebarMode::Platform => (
            "Platform settings",
            "Optimized for this platform".to_string(),
        ),
        SidebarMode::MultiSelect => (
            "Batch adjustments",
            format!("Adjusting {} platforms at once", selected_count),
        ),
    };
    SidebarHeader {
        mode,
        title,
        hint,
        selected_count,
        show_back: selected_count > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SelectionSet;
    use crate::settings::WritingStyle;

    struct Fixture {
        catalog: PlatformCatalog,
        registry: PanelRegistry,
        context: SidebarContext,
        wechat: PanelId,
        zhihu: PanelId,
    }

    fn fixture() -> Fixture {
        let catalog = PlatformCatalog::builtin();
        let mut registry = PanelRegistry::with_initial(&catalog, "wechat").expect("registry");
        let wechat = registry.ids().remove(0);
        let zhihu = registry.add(&catalog, "zhihu").expect("zhihu");
        let context = SidebarContext::new();
        Fixture {
            catalog,
            registry,
            context,
            wechat,
            zhihu,
        }
    }

    #[test]
    fn global_mode_targets_global_settings() {
        let fx = fixture();
        assert_eq!(write_target(&fx.registry, &fx.context), SettingsTarget::Global);
        match resolve_view(&fx.catalog, &fx.registry, &fx.context, "") {
            SettingsView::Global(view) => assert_eq!(view.panel_count, 2),
            other => panic!("expected global view, got {:?}", other.mode()),
        }
    }

    #[test]
    fn platform_view_defaults_missing_fields_and_checks_length() {
        let mut fx = fixture();
        fx.context
            .set_selection(SelectionSet::single(fx.zhihu.clone()));
        let content = "x".repeat(5200);

        let SettingsView::Platform(view) =
            resolve_view(&fx.catalog, &fx.registry, &fx.context, &content)
        else {
            panic!("expected platform view");
        };
        assert_eq!(view.platform.id, "zhihu");
        assert_eq!(view.settings.writing_style, WritingStyle::Professional);
        assert_eq!(view.length, LengthCheck::from_count(5200, 5000));
        assert!(view.length.is_over_limit());
        assert!(view.toggles.is_empty());
        assert_eq!(view.image_summary().as_deref(), Some("5MB JPG/PNG/GIF"));
    }

    #[test]
    fn explicit_character_limit_overrides_catalog_limit() {
        let mut fx = fixture();
        fx.context.update_platform_settings(
            "wechat",
            &PlatformSettings {
                character_limit: Some(100),
                use_hashtags: Some(false),
                ..PlatformSettings::default()
            },
        );
        fx.context
            .set_selection(SelectionSet::single(fx.wechat.clone()));

        let SettingsView::Platform(view) =
            resolve_view(&fx.catalog, &fx.registry, &fx.context, &"y".repeat(150))
        else {
            panic!("expected platform view");
        };
        assert_eq!(view.length.limit, 100);
        assert_eq!(
            view.toggles,
            vec![FeatureToggle {
                feature: PlatformFeature::UseHashtags,
                enabled: false,
            }]
        );
        assert_eq!(view.toggles[0].flip_patch().use_hashtags, Some(true));
    }

    #[test]
    fn multi_select_lists_distinct_platforms_in_selection_order() {
        let mut fx = fixture();
        let second_zhihu = fx.registry.add(&fx.catalog, "zhihu").expect("zhihu");
        fx.context.set_selection(SelectionSet::from_ids([
            fx.zhihu.clone(),
            fx.wechat.clone(),
            second_zhihu,
        ]));

        assert_eq!(
            write_target(&fx.registry, &fx.context),
            SettingsTarget::Broadcast(vec!["zhihu".to_string(), "wechat".to_string()])
        );
        let SettingsView::MultiSelect(view) =
            resolve_view(&fx.catalog, &fx.registry, &fx.context, "")
        else {
            panic!("expected multi-select view");
        };
        assert_eq!(view.panel_count, 3);
        let ids: Vec<&str> = view.platforms.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["zhihu", "wechat"]);

        match resolved_settings(&fx.registry, &fx.context) {
            ResolvedSettings::MultiSelect { settings } => assert_eq!(settings.len(), 2),
            other => panic!("expected multi-select settings, got {:?}", other),
        }
    }

    #[test]
    fn header_offers_back_control_only_with_selection() {
        let mut fx = fixture();
        let global = header(&fx.context);
        assert_eq!(global.mode, SidebarMode::Global);
        assert!(!global.show_back);

        fx.context.set_selection(SelectionSet::from_ids([
            fx.wechat.clone(),
            fx.zhihu.clone(),
        ]));
        let multi = header(&fx.context);
        assert!(multi.show_back);
        assert_eq!(multi.selected_count, 2);
        assert_eq!(multi.hint, "Adjusting 2 platforms at once");
    }
}
