//! Shared constants used across LovPen crates.

/// Platform of the panel a fresh workspace session starts with.
pub const DEFAULT_INITIAL_PLATFORM: &str = "wechat";

/// Prefix for generated preview panel ids.
pub const PANEL_ID_PREFIX: &str = "preview-";

/// Suffix appended to a platform's full name to build a panel title.
pub const PANEL_TITLE_SUFFIX: &str = " Preview";

/// Env var naming the initial panel platform.
pub const ENV_INITIAL_PLATFORM: &str = "LOVPEN_INITIAL_PLATFORM";
/// Env var pointing at a JSON platform catalog file.
pub const ENV_CATALOG_PATH: &str = "LOVPEN_CATALOG_PATH";
/// Env flag controlling whether catalog defaults seed platform overrides.
pub const ENV_SEED_PLATFORM_DEFAULTS: &str = "LOVPEN_SEED_PLATFORM_DEFAULTS";
