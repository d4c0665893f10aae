//! Generation settings: document-level globals and per-platform overrides.
//!
//! Override records keep every field optional so a record only states what
//! differs; [`PlatformSettings::resolve`] fills the gaps with defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

macro_rules! settings_choice {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// Wire label used in JSON and CLI output.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

settings_choice! {
    /// Document template driving generated structure.
    ContentTemplate {
        Custom => "custom",
        Blog => "blog",
        News => "news",
        Tutorial => "tutorial",
        Review => "review",
    }
}

settings_choice! {
    /// Intended readership.
    TargetAudience {
        General => "general",
        Professional => "professional",
        Academic => "academic",
        Casual => "casual",
    }
}

settings_choice! {
    /// Target length of a platform's article.
    ArticleLength {
        Short => "short",
        Medium => "medium",
        Long => "long",
    }
}

settings_choice! {
    /// Tone used when adapting content to a platform.
    WritingStyle {
        Professional => "professional",
        Casual => "casual",
        Thoughtful => "thoughtful",
        Warm => "warm",
    }
}

settings_choice! {
    /// Image compression level applied before publishing.
    ImageCompression {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

settings_choice! {
    /// How outbound links are rendered.
    LinkHandling {
        Preserve => "preserve",
        ConvertToText => "convert-to-text",
        Footnote => "footnote",
    }
}

impl Default for ContentTemplate {
    fn default() -> Self {
        Self::Blog
    }
}

impl Default for TargetAudience {
    fn default() -> Self {
        Self::General
    }
}

impl Default for ArticleLength {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for WritingStyle {
    fn default() -> Self {
        Self::Professional
    }
}

impl Default for ImageCompression {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for LinkHandling {
    fn default() -> Self {
        Self::Preserve
    }
}

/// Document-level settings shown while no panel is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub content_template: ContentTemplate,
    pub target_audience: TargetAudience,
    pub auto_image: bool,
    pub seo_optimization: bool,
    pub scheduled_publishing: bool,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            content_template: ContentTemplate::Blog,
            target_audience: TargetAudience::General,
            auto_image: true,
            seo_optimization: false,
            scheduled_publishing: false,
        }
    }
}

/// Partial update for [`GlobalSettings`]; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettingsPatch {
    pub content_template: Option<ContentTemplate>,
    pub target_audience: Option<TargetAudience>,
    pub auto_image: Option<bool>,
    pub seo_optimization: Option<bool>,
    pub scheduled_publishing: Option<bool>,
}

impl GlobalSettingsPatch {
    /// Returns `true` when the patch sets no field.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn merge_field<T: PartialEq + Clone>(slot: &mut T, value: Option<&T>) -> bool {
    match value {
        Some(value) if slot != value => {
            *slot = value.clone();
            true
        }
        _ => false,
    }
}

fn merge_optional<T: PartialEq + Clone>(slot: &mut Option<T>, value: Option<&T>) -> bool {
    match value {
        Some(value) if slot.as_ref() != Some(value) => {
            *slot = Some(value.clone());
            true
        }
        _ => false,
    }
}

impl GlobalSettings {
    /// Merge `patch` into these settings.
    ///
    /// # Returns
    /// `true` when at least one field changed value.
    pub fn apply(&mut self, patch: &GlobalSettingsPatch) -> bool {
        let mut changed = false;
        changed |= merge_field(&mut self.content_template, patch.content_template.as_ref());
        changed |= merge_field(&mut self.target_audience, patch.target_audience.as_ref());
        changed |= merge_field(&mut self.auto_image, patch.auto_image.as_ref());
        changed |= merge_field(&mut self.seo_optimization, patch.seo_optimization.as_ref());
        changed |= merge_field(
            &mut self.scheduled_publishing,
            patch.scheduled_publishing.as_ref(),
        );
        changed
    }
}

/// One platform's override record.
///
/// The same shape doubles as a partial update: merging copies every field
/// the patch sets and leaves the rest alone. The platform-feature toggles
/// (`use_hashtags`, `include_call_to_action`, `adapt_tone`) stay `None` for
/// platforms that do not offer them, which is how views decide whether to
/// show the toggle at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformSettings {
    pub article_length: Option<ArticleLength>,
    pub writing_style: Option<WritingStyle>,
    pub character_limit: Option<usize>,
    pub image_compression: Option<ImageCompression>,
    pub link_handling: Option<LinkHandling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_styles: Option<BTreeMap<String, String>>,
    pub use_hashtags: Option<bool>,
    pub include_call_to_action: Option<bool>,
    pub adapt_tone: Option<bool>,
}

impl PlatformSettings {
    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Merge every field `patch` sets into this record.
    ///
    /// # Returns
    /// `true` when at least one field changed value.
    pub fn merge(&mut self, patch: &PlatformSettings) -> bool {
        let mut changed = false;
        changed |= merge_optional(&mut self.article_length, patch.article_length.as_ref());
        changed |= merge_optional(&mut self.writing_style, patch.writing_style.as_ref());
        changed |= merge_optional(&mut self.character_limit, patch.character_limit.as_ref());
        changed |= merge_optional(
            &mut self.image_compression,
            patch.image_compression.as_ref(),
        );
        changed |= merge_optional(&mut self.link_handling, patch.link_handling.as_ref());
        changed |= merge_optional(&mut self.custom_styles, patch.custom_styles.as_ref());
        changed |= merge_optional(&mut self.use_hashtags, patch.use_hashtags.as_ref());
        changed |= merge_optional(
            &mut self.include_call_to_action,
            patch.include_call_to_action.as_ref(),
        );
        changed |= merge_optional(&mut self.adapt_tone, patch.adapt_tone.as_ref());
        changed
    }

    /// Fill missing choice fields with their defaults.
    pub fn resolve(&self) -> ResolvedPlatformSettings {
        ResolvedPlatformSettings {
            article_length: self.article_length.unwrap_or_default(),
            writing_style: self.writing_style.unwrap_or_default(),
            image_compression: self.image_compression.unwrap_or_default(),
            link_handling: self.link_handling.unwrap_or_default(),
            character_limit: self.character_limit,
            custom_styles: self.custom_styles.clone().unwrap_or_default(),
            use_hashtags: self.use_hashtags,
            include_call_to_action: self.include_call_to_action,
            adapt_tone: self.adapt_tone,
        }
    }
}

/// Platform settings with every choice populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPlatformSettings {
    pub article_length: ArticleLength,
    pub writing_style: WritingStyle,
    pub image_compression: ImageCompression,
    pub link_handling: LinkHandling,
    pub character_limit: Option<usize>,
    pub custom_styles: BTreeMap<String, String>,
    pub use_hashtags: Option<bool>,
    pub include_call_to_action: Option<bool>,
    pub adapt_tone: Option<bool>,
}

impl Default for ResolvedPlatformSettings {
    fn default() -> Self {
        PlatformSettings::default().resolve()
    }
}

/// Global settings combined with one platform's resolved overrides.
///
/// This is what the generation pipeline reads for a panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSettings {
    pub platform_id: Option<String>,
    #[serde(flatten)]
    pub global: GlobalSettings,
    #[serde(flatten)]
    pub platform: ResolvedPlatformSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fills_documented_defaults() {
        let resolved = PlatformSettings::default().resolve();
        assert_eq!(resolved.article_length, ArticleLength::Medium);
        assert_eq!(resolved.writing_style, WritingStyle::Professional);
        assert_eq!(resolved.image_compression, ImageCompression::Medium);
        assert_eq!(resolved.link_handling, LinkHandling::Preserve);
        assert_eq!(resolved.use_hashtags, None);
    }

    #[test]
    fn merge_only_touches_fields_the_patch_sets() {
        let mut record = PlatformSettings {
            article_length: Some(ArticleLength::Long),
            use_hashtags: Some(true),
            ..PlatformSettings::default()
        };
        let patch = PlatformSettings {
            writing_style: Some(WritingStyle::Casual),
            ..PlatformSettings::default()
        };

        assert!(record.merge(&patch));
        assert_eq!(record.article_length, Some(ArticleLength::Long));
        assert_eq!(record.writing_style, Some(WritingStyle::Casual));
        assert_eq!(record.use_hashtags, Some(true));
        assert!(!record.merge(&patch), "same value twice is not a change");
    }

    #[test]
    fn global_apply_reports_changes() {
        let mut settings = GlobalSettings::default();
        assert!(!settings.apply(&GlobalSettingsPatch::default()));
        assert!(settings.apply(&GlobalSettingsPatch {
            seo_optimization: Some(true),
            ..GlobalSettingsPatch::default()
        }));
        assert!(settings.seo_optimization);
        assert!(settings.auto_image);
    }

    #[test]
    fn choices_use_kebab_case_labels() {
        let json = serde_json::to_string(&LinkHandling::ConvertToText).expect("encode");
        assert_eq!(json, "\"convert-to-text\"");
        let patch: PlatformSettings =
            serde_json::from_str(r#"{"writingStyle":"casual","useHashtags":false}"#)
                .expect("decode");
        assert_eq!(patch.writing_style, Some(WritingStyle::Casual));
        assert_eq!(patch.use_hashtags, Some(false));
        assert_eq!(patch.article_length, None);
    }
}
