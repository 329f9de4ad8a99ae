//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by an optional `config.toml` in the content root. Files are
//! sparse: override only the values you want.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Codex Lumina"
//! tagline = "You Are No Longer Who You Were. You Are Becoming."
//!
//! [journal]
//! categories = ["earthbeat", "weekly", "feature"]
//! related_limit = 3         # Related entries on a journal page
//!
//! [theme]
//! background = "#0b0d14"
//! surface = "#141826"
//! text = "#e9ecf5"
//! text_muted = "#9aa3b8"
//! link = "#9eb6ff"
//! card_gap = "1.25rem"
//!
//! [palette]                 # Extra or replacement tone colors
//! joy = "#ffe27a"
//!
//! [earthbeat]
//! source_url = "https://www.vlf.it/cumiana/latest.jpg"
//! image_dir = "assets/earthbeat"
//! publish_hour_utc = 9
//! low_threshold = 60.0
//! high_threshold = 120.0
//! default_tag = "presence"
//! fallback_summary = "Daily resonance field note."
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity used in titles and the landing page.
    pub site: SiteMeta,
    /// Journal categories and detail-page settings.
    pub journal: JournalConfig,
    /// Dark theme colors and spacing.
    pub theme: ThemeConfig,
    /// Tone color overrides, tag → `#rrggbb`.
    pub palette: BTreeMap<String, String>,
    /// Offline Earthbeat enrichment settings.
    pub earthbeat: EarthbeatConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation("site.title must not be empty".into()));
        }
        if self.journal.categories.is_empty() {
            return Err(ConfigError::Validation(
                "journal.categories must not be empty".into(),
            ));
        }
        if self
            .journal
            .categories
            .iter()
            .any(|c| c.trim().is_empty() || c == "all")
        {
            return Err(ConfigError::Validation(
                "journal.categories entries must be non-empty and not \"all\"".into(),
            ));
        }
        for (tag, hex) in &self.palette {
            if !is_hex_color(hex) {
                return Err(ConfigError::Validation(format!(
                    "palette.{tag} must be a #rrggbb color, got {hex:?}"
                )));
            }
        }
        if self.earthbeat.publish_hour_utc > 23 {
            return Err(ConfigError::Validation(
                "earthbeat.publish_hour_utc must be 0-23".into(),
            ));
        }
        if self.earthbeat.low_threshold >= self.earthbeat.high_threshold {
            return Err(ConfigError::Validation(
                "earthbeat.low_threshold must be below earthbeat.high_threshold".into(),
            ));
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Site identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteMeta {
    pub title: String,
    pub tagline: String,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            title: "Codex Lumina".to_string(),
            tagline: "You Are No Longer Who You Were. You Are Becoming.".to_string(),
        }
    }
}

/// Journal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalConfig {
    /// Known categories, in pill order. Entries in other categories are
    /// listed under "all" only.
    pub categories: Vec<String>,
    /// Maximum related entries shown on a journal page.
    pub related_limit: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                "earthbeat".to_string(),
                "weekly".to_string(),
                "feature".to_string(),
            ],
            related_limit: 3,
        }
    }
}

/// Theme colors. The site is dark-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeConfig {
    pub background: String,
    /// Card and panel background.
    pub surface: String,
    pub text: String,
    /// Dates, captions, subtitles.
    pub text_muted: String,
    pub link: String,
    /// Gap between cards in grids (CSS value).
    pub card_gap: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: "#0b0d14".to_string(),
            surface: "#141826".to_string(),
            text: "#e9ecf5".to_string(),
            text_muted: "#9aa3b8".to_string(),
            link: "#9eb6ff".to_string(),
            card_gap: "1.25rem".to_string(),
        }
    }
}

/// Settings for `lumina earthbeat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EarthbeatConfig {
    /// Spectrogram image fetched for each entry.
    pub source_url: String,
    /// Short name recorded as the entry's `sr_source`.
    pub source_name: String,
    /// Where fetched images are saved, relative to the content root.
    pub image_dir: String,
    /// Hour (UTC) used for the entry's `published_at`.
    pub publish_hour_utc: u32,
    /// Average red-channel brightness below which a band reads as still.
    pub low_threshold: f64,
    /// Brightness at or above which a band reads as a surge.
    pub high_threshold: f64,
    /// Tag used when the image could not be analyzed.
    pub default_tag: String,
    /// Summary used when the image could not be analyzed.
    pub fallback_summary: String,
}

impl Default for EarthbeatConfig {
    fn default() -> Self {
        Self {
            source_url: "https://www.vlf.it/cumiana/latest.jpg".to_string(),
            source_name: "cumiana".to_string(),
            image_dir: "assets/earthbeat".to_string(),
            publish_hour_utc: 9,
            low_threshold: 60.0,
            high_threshold: 120.0,
            default_tag: "presence".to_string(),
            fallback_summary: "Daily resonance field note.".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Codex Lumina Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the root of the content directory.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
title = "Codex Lumina"
tagline = "You Are No Longer Who You Were. You Are Becoming."

# ---------------------------------------------------------------------------
# Journal
# ---------------------------------------------------------------------------
[journal]
# Categories shown as filter pills, in order. "all" is implicit.
categories = ["earthbeat", "weekly", "feature"]

# Maximum related entries listed under a journal entry.
related_limit = 3

# ---------------------------------------------------------------------------
# Theme (dark only)
# ---------------------------------------------------------------------------
[theme]
background = "#0b0d14"
surface = "#141826"
text = "#e9ecf5"
text_muted = "#9aa3b8"
link = "#9eb6ff"
# Gap between cards in grids (CSS value).
card_gap = "1.25rem"

# ---------------------------------------------------------------------------
# Tone palette
# ---------------------------------------------------------------------------
# Add tone colors or replace stock ones. The first tag of an item picks its
# color; tags without a color use #9eb6ff.
[palette]
# joy = "#ffe27a"

# ---------------------------------------------------------------------------
# Earthbeat enrichment (`lumina earthbeat`)
# ---------------------------------------------------------------------------
[earthbeat]
source_url = "https://www.vlf.it/cumiana/latest.jpg"
source_name = "cumiana"
# Relative to the content directory.
image_dir = "assets/earthbeat"
publish_hour_utc = 9
# Average red-channel brightness (0-255) bands:
#   below low_threshold  -> "stillness"
#   below high_threshold -> "lift"
#   otherwise            -> "surge"
low_threshold = 60.0
high_threshold = 120.0
# Used when the spectrogram cannot be fetched or analyzed.
default_tag = "presence"
fallback_summary = "Daily resonance field note."
"##
}

/// Generate CSS custom properties from theme config.
pub fn generate_theme_css(theme: &ThemeConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {background};
    --color-surface: {surface};
    --color-text: {text};
    --color-text-muted: {text_muted};
    --color-link: {link};
    --card-gap: {card_gap};
}}"#,
        background = theme.background,
        surface = theme.surface,
        text = theme.text,
        text_muted = theme.text_muted,
        link = theme.link,
        card_gap = theme.card_gap,
    )
}
