//! Static platform catalog: display metadata and publishing constraints.

use crate::error::WorkspaceError;
use crate::settings::{
    ArticleLength, ImageCompression, LinkHandling, PlatformSettings, WritingStyle,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Image upload limits declared by a platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageRequirements {
    pub max_size: Option<String>,
    pub formats: Vec<String>,
}

impl ImageRequirements {
    /// Short human summary such as `20MB JPG/PNG`.
    pub fn summary(&self) -> String {
        let formats = self.formats.join("/");
        match (self.max_size.as_deref(), formats.is_empty()) {
            (Some(size), false) => format!("{} {}", size, formats),
            (Some(size), true) => size.to_string(),
            (None, false) => formats,
            (None, true) => String::new(),
        }
    }
}

/// Limits a platform imposes on generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConstraints {
    pub max_characters: usize,
    #[serde(default)]
    pub supported_formats: BTreeSet<String>,
    #[serde(default)]
    pub image_requirements: Option<ImageRequirements>,
}

/// One publishing platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub full_name: String,
    pub color: String,
    pub constraints: PlatformConstraints,
    /// Override record seeded into a new session for this platform.
    #[serde(default)]
    pub default_settings: PlatformSettings,
}

/// Ordered, read-only platform lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCatalog {
    platforms: Vec<Platform>,
}

fn formats(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn image_requirements(max_size: &str, image_formats: &[&str]) -> Option<ImageRequirements> {
    Some(ImageRequirements {
        max_size: Some(max_size.to_string()),
        formats: image_formats.iter().map(|value| value.to_string()).collect(),
    })
}

impl PlatformCatalog {
    /// Catalog shipped with the application.
    pub fn builtin() -> Self {
        let platforms = vec![
            Platform {
                id: "wechat".to_string(),
                name: "WeChat".to_string(),
                full_name: "WeChat Official Account".to_string(),
                color: "bg-green-500".to_string(),
                constraints: PlatformConstraints {
                    max_characters: 2000,
                    supported_formats: formats(&["text", "image", "video"]),
                    image_requirements: image_requirements("20MB", &["JPG", "PNG"]),
                },
                default_settings: PlatformSettings {
                    article_length: Some(ArticleLength::Medium),
                    writing_style: Some(WritingStyle::Professional),
                    image_compression: Some(ImageCompression::Medium),
                    link_handling: Some(LinkHandling::ConvertToText),
                    include_call_to_action: Some(true),
                    adapt_tone: Some(true),
                    ..PlatformSettings::default()
                },
            },
            Platform {
                id: "zhihu".to_string(),
                name: "Zhihu".to_string(),
                full_name: "Zhihu Column".to_string(),
                color: "bg-blue-500".to_string(),
                constraints: PlatformConstraints {
                    max_characters: 5000,
                    supported_formats: formats(&["text", "image", "code", "formula"]),
                    image_requirements: image_requirements("5MB", &["JPG", "PNG", "GIF"]),
                },
                default_settings: PlatformSettings {
                    article_length: Some(ArticleLength::Long),
                    writing_style: Some(WritingStyle::Thoughtful),
                    image_compression: Some(ImageCompression::Low),
                    link_handling: Some(LinkHandling::Preserve),
                    include_call_to_action: Some(false),
                    adapt_tone: Some(true),
                    ..PlatformSettings::default()
                },
            },
            Platform {
                id: "xiaohongshu".to_string(),
                name: "Xiaohongshu".to_string(),
                full_name: "Xiaohongshu Note".to_string(),
                color: "bg-pink-500".to_string(),
                constraints: PlatformConstraints {
                    max_characters: 1000,
                    supported_formats: formats(&["text", "image", "hashtag"]),
                    image_requirements: image_requirements("10MB", &["JPG", "PNG"]),
                },
                default_settings: PlatformSettings {
                    article_length: Some(ArticleLength::Short),
                    writing_style: Some(WritingStyle::Casual),
                    image_compression: Some(ImageCompression::High),
                    link_handling: Some(LinkHandling::ConvertToText),
                    use_hashtags: Some(true),
                    include_call_to_action: Some(true),
                    adapt_tone: Some(true),
                    ..PlatformSettings::default()
                },
            },
            Platform {
                id: "twitter".to_string(),
                name: "Twitter".to_string(),
                full_name: "Twitter Post".to_string(),
                color: "bg-sky-500".to_string(),
                constraints: PlatformConstraints {
                    max_characters: 280,
                    supported_formats: formats(&["text", "image", "video", "link"]),
                    image_requirements: image_requirements("5MB", &["JPG", "PNG", "GIF"]),
                },
                default_settings: PlatformSettings {
                    article_length: Some(ArticleLength::Short),
                    writing_style: Some(WritingStyle::Casual),
                    image_compression: Some(ImageCompression::High),
                    link_handling: Some(LinkHandling::Preserve),
                    use_hashtags: Some(true),
                    include_call_to_action: Some(false),
                    adapt_tone: Some(true),
                    ..PlatformSettings::default()
                },
            },
        ];
        Self { platforms }
    }

    /// Build a catalog from explicit entries.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::InvalidCatalog`] when the list is empty, an
    /// id is blank, or an id appears twice.
    pub fn from_platforms(platforms: Vec<Platform>) -> Result<Self, WorkspaceError> {
        if platforms.is_empty() {
            return Err(WorkspaceError::InvalidCatalog(
                "catalog must list at least one platform".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for platform in &platforms {
            if platform.id.trim().is_empty() {
                return Err(WorkspaceError::InvalidCatalog(
                    "platform id must not be blank".to_string(),
                ));
            }
            if !seen.insert(platform.id.as_str()) {
                return Err(WorkspaceError::InvalidCatalog(format!(
                    "duplicate platform id '{}'",
                    platform.id
                )));
            }
        }
        Ok(Self { platforms })
    }

    /// Parse a JSON array of platform entries.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::CatalogParse`] for malformed JSON, or any
    /// validation error from [`PlatformCatalog::from_platforms`].
    pub fn from_json_str(raw: &str) -> Result<Self, WorkspaceError> {
        let platforms: Vec<Platform> = serde_json::from_str(raw)?;
        Self::from_platforms(platforms)
    }

    /// Load a JSON catalog file.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::Io`] when the file cannot be read, plus the
    /// parse/validation errors of [`PlatformCatalog::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self, WorkspaceError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Look up a platform by id.
    ///
    /// # Errors
    /// Returns [`WorkspaceError::UnknownPlatform`] when `platform_id` is not
    /// in the catalog.
    pub fn lookup(&self, platform_id: &str) -> Result<&Platform, WorkspaceError> {
        self.get(platform_id)
            .ok_or_else(|| WorkspaceError::UnknownPlatform(platform_id.to_string()))
    }

    pub fn get(&self, platform_id: &str) -> Option<&Platform> {
        self.platforms
            .iter()
            .find(|platform| platform.id == platform_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl Default for PlatformCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_lists_shipped_platforms_in_order() {
        let catalog = PlatformCatalog::builtin();
        let ids: Vec<&str> = catalog.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["wechat", "zhihu", "xiaohongshu", "twitter"]);
        assert_eq!(
            catalog.lookup("zhihu").expect("zhihu").constraints.max_characters,
            5000
        );
        assert!(catalog
            .lookup("zhihu")
            .expect("zhihu")
            .constraints
            .supported_formats
            .contains("formula"));
    }

    #[test]
    fn lookup_unknown_platform_is_typed_error() {
        let catalog = PlatformCatalog::builtin();
        match catalog.lookup("unknown-platform") {
            Err(WorkspaceError::UnknownPlatform(id)) => assert_eq!(id, "unknown-platform"),
            other => panic!("expected UnknownPlatform, got {:?}", other),
        }
    }

    #[test]
    fn from_json_rejects_duplicates_and_empty_lists() {
        assert!(matches!(
            PlatformCatalog::from_json_str("[]"),
            Err(WorkspaceError::InvalidCatalog(_))
        ));

        let entry = r#"{"id":"blog","name":"Blog","fullName":"Team Blog","color":"bg-gray-500",
            "constraints":{"maxCharacters":12000}}"#;
        let duplicated = format!("[{},{}]", entry, entry);
        assert!(matches!(
            PlatformCatalog::from_json_str(&duplicated),
            Err(WorkspaceError::InvalidCatalog(_))
        ));

        assert!(matches!(
            PlatformCatalog::from_json_str("{not json"),
            Err(WorkspaceError::CatalogParse(_))
        ));
    }

    #[test]
    fn from_path_reads_catalog_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"id":"blog","name":"Blog","fullName":"Team Blog","color":"bg-gray-500",
                "constraints":{{"maxCharacters":12000,"supportedFormats":["text"]}},
                "defaultSettings":{{"writingStyle":"warm"}}}}]"#
        )
        .expect("write catalog");

        let catalog = PlatformCatalog::from_path(file.path()).expect("catalog");
        let blog = catalog.lookup("blog").expect("blog");
        assert_eq!(blog.constraints.max_characters, 12000);
        assert!(blog.constraints.image_requirements.is_none());
        assert_eq!(
            blog.default_settings.writing_style,
            Some(WritingStyle::Warm)
        );
    }

    #[test]
    fn image_requirements_summary_formats_parts() {
        let catalog = PlatformCatalog::builtin();
        let wechat = catalog.lookup("wechat").expect("wechat");
        let summary = wechat
            .constraints
            .image_requirements
            .as_ref()
            .map(ImageRequirements::summary);
        assert_eq!(summary.as_deref(), Some("20MB JPG/PNG"));
        assert_eq!(ImageRequirements::default().summary(), "");
    }
}
