//! Tone tags → colors, glyphs, and CSS classes.
//!
//! Every card and detail header takes its mood from the item's first tag:
//! the tag picks a base color from the palette, and the badge, pill, and aura
//! styles are translucent variants of that base. Unknown tags fall back to
//! [`DEFAULT_TONE`].
//!
//! All lookups are plain table scans. Nothing is cached; the palette is a
//! value passed in by the caller (stock table plus `[palette]` overrides from
//! `config.toml`).

use std::collections::BTreeMap;

/// Fallback color for tags missing from the palette.
pub const DEFAULT_TONE: &str = "#9eb6ff";

/// Foreground color used on every tinted chip.
pub const CHIP_TEXT: &str = "#e9ecf5";

/// Stock tone palette.
pub const TONE_COLORS: &[(&str, &str)] = &[
    // core tones
    ("presence", "#5fe3d1"),
    ("clarity", "#93b0ff"),
    ("breath", "#a6e6ff"),
    ("remembrance", "#d7b3ff"),
    ("return", "#ffc99a"),
    ("stillness", "#b8c7ff"),
    ("fire", "#ff9c73"),
    ("origin", "#ffd98a"),
    ("truth", "#a1ffcf"),
    ("constellation", "#b49cff"),
    // ember
    ("evening", "#ffb3a6"),
    ("closure", "#c7b5ff"),
    ("soften", "#ffd9c2"),
    ("morning", "#fff0a6"),
    ("opening", "#a6ffd3"),
    ("intent", "#a6d8ff"),
    ("movement", "#b3ffb8"),
    ("restore", "#a6e0ff"),
    ("language", "#ffd3e0"),
    ("tone", "#e0b3ff"),
];

/// Journal category colors, used when an entry's first tag has no tone.
pub const CATEGORY_COLORS: &[(&str, &str)] = &[
    ("earthbeat", "#7fe1a7"),
    ("weekly", "#93b0ff"),
    ("feature", "#ffd98a"),
];

/// Tone lookup table with optional overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    tones: BTreeMap<String, String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            tones: TONE_COLORS
                .iter()
                .map(|(tag, hex)| (tag.to_string(), hex.to_string()))
                .collect(),
        }
    }
}

impl Palette {
    /// Stock palette with `overrides` layered on top (new tags or new colors).
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut palette = Self::default();
        for (tag, hex) in overrides {
            palette.tones.insert(tag.clone(), hex.clone());
        }
        palette
    }

    /// The tag's color if the palette knows it.
    pub fn lookup(&self, tag: &str) -> Option<&str> {
        self.tones.get(tag).map(String::as_str)
    }

    /// Base color for a tag, [`DEFAULT_TONE`] for unknown tags.
    pub fn tone_color(&self, tag: &str) -> &str {
        self.lookup(tag).unwrap_or(DEFAULT_TONE)
    }

    /// Inline style for a tag badge on cards and detail headers.
    pub fn badge_style(&self, tag: &str) -> String {
        let base = self.tone_color(tag);
        chip_style(base, 0.18, 0.30)
    }

    /// Inline style for a filter pill. `"all"` gets a neutral chip.
    pub fn pill_style(&self, tag: &str, active: bool) -> String {
        if tag == "all" {
            return format!(
                "background: rgba(255,255,255,0.06); border: 1px solid rgba(255,255,255,0.12); color: {CHIP_TEXT};"
            );
        }
        let base = self.tone_color(tag);
        if active {
            chip_style(base, 0.28, 0.42)
        } else {
            chip_style(base, 0.16, 0.28)
        }
    }

    /// Aura colors for an item: first tag's tone, else its category color,
    /// else the default.
    pub fn aura(&self, tags: &[String], category: Option<&str>) -> Aura {
        let base = tags
            .first()
            .and_then(|t| self.lookup(t))
            .or_else(|| category.and_then(category_color))
            .unwrap_or(DEFAULT_TONE)
            .to_string();
        Aura { base }
    }
}

fn chip_style(base: &str, bg_alpha: f32, border_alpha: f32) -> String {
    format!(
        "background: {}; border: 1px solid {}; color: {CHIP_TEXT};",
        hex_to_rgba(base, bg_alpha),
        hex_to_rgba(base, border_alpha)
    )
}

/// Color of a journal category, if it has one.
pub fn category_color(category: &str) -> Option<&'static str> {
    CATEGORY_COLORS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, hex)| *hex)
}

/// Glow behind a card or detail header.
#[derive(Debug, Clone, PartialEq)]
pub struct Aura {
    pub base: String,
}

impl Aura {
    /// Strong/soft radial-gradient pair for cards.
    pub fn card_gradient(&self) -> String {
        format!(
            "radial-gradient(360px 140px at 18% 0%, {}, transparent 70%), radial-gradient(520px 200px at 82% 0%, {}, transparent 72%)",
            hex_to_rgba(&self.base, 0.32),
            hex_to_rgba(&self.base, 0.18)
        )
    }

    /// Wider gradient for detail page headers.
    pub fn header_gradient(&self) -> String {
        format!(
            "radial-gradient(700px 260px at 18% 0%, {}, transparent 70%), radial-gradient(900px 320px at 82% 0%, {}, transparent 72%)",
            hex_to_rgba(&self.base, 0.35),
            hex_to_rgba(&self.base, 0.20)
        )
    }
}

/// Convert `#rrggbb` (hash optional) to `rgba(r, g, b, alpha)`.
///
/// Malformed input yields the default tone at the requested alpha.
pub fn hex_to_rgba(hex: &str, alpha: f32) -> String {
    match parse_hex(hex) {
        Some((r, g, b)) => format!("rgba({r}, {g}, {b}, {alpha})"),
        None => format!("rgba(158,182,255,{alpha})"),
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

// ============================================================================
// Glyphs
// ============================================================================

/// One glyph rule: matches when every `all` tag and at least one `any` tag
/// is present (an empty `any` list is satisfied by `all` alone).
struct GlyphRule {
    all: &'static [&'static str],
    any: &'static [&'static str],
    glyph: &'static str,
}

const fn any(tags: &'static [&'static str], glyph: &'static str) -> GlyphRule {
    GlyphRule { all: &[], any: tags, glyph }
}

const fn both(tags: &'static [&'static str], glyph: &'static str) -> GlyphRule {
    GlyphRule { all: tags, any: &[], glyph }
}

/// First matching rule wins.
const GLYPH_RULES: &[GlyphRule] = &[
    any(&["doctrine", "foundational"], "📜"),
    any(&["resonance"], "⌁"),
    any(&["tone"], "◌"),
    any(&["timeline", "threshold"], "✦"),
    any(&["co-becoming", "becoming"], "∞"),
    any(&["flamekeeper", "identity", "archetype"], "🜂"),
    any(&["liberation", "freedom"], "🕊️"),
    both(&["protection", "shadow"], "🜃"),
    any(&["fire"], "🜂"),
    any(&["devotion", "prayer"], "🪔"),
    any(&["science", "evidence"], "⚛️"),
    any(&["spiral", "law", "cosmic-pattern"], "🌀"),
    any(&["convergence", "sentience", "mutual-remembrance"], "♾️"),
    any(&["ritual", "discernment", "truth"], "🎭"),
    any(&["volatility", "signal"], "⚡"),
    any(&["field", "attention"], "🌐"),
    any(&["alignment", "intention"], "🎛️"),
    any(&["echo", "breath"], "⌁"),
    any(&["vortex"], "🌀"),
    any(&["clarity"], "🎛️"),
    any(&["naming"], "⌁"),
];

/// Glyph used when no rule matches.
pub const DEFAULT_GLYPH: &str = "◯";

/// Glyph for a set of tone tags (case-insensitive).
pub fn glyph_for_tags(tags: &[String]) -> &'static str {
    let lowered: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
    let has = |tag: &str| lowered.iter().any(|t| t == tag);
    GLYPH_RULES
        .iter()
        .find(|rule| rule.all.iter().all(|t| has(t)) && (rule.any.is_empty() || rule.any.iter().any(|t| has(t))))
        .map(|rule| rule.glyph)
        .unwrap_or(DEFAULT_GLYPH)
}

// ============================================================================
// Reel tone classes
// ============================================================================

const REEL_CLASSES: &[(&[&str], &str)] = &[
    (&["truth", "clarity", "presence", "sovereignty"], "tone-truth"),
    (&["awakening", "joy", "light"], "tone-awakening"),
    (&["distortion", "shadow", "grief"], "tone-shadow"),
    (&["remembrance", "return"], "tone-remembrance"),
    (&["freedom"], "tone-freedom"),
];

/// CSS class for a reel's tone tag; `tone-neutral` when unmapped.
pub fn reel_tone_class(tag: &str) -> &'static str {
    let tag = tag.trim().to_lowercase();
    REEL_CLASSES
        .iter()
        .find(|(tags, _)| tags.contains(&tag.as_str()))
        .map(|(_, class)| *class)
        .unwrap_or("tone-neutral")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_tone_color() {
        assert_eq!(Palette::default().tone_color("presence"), "#5fe3d1");
        assert_eq!(Palette::default().tone_color("evening"), "#ffb3a6");
    }

    #[test]
    fn unknown_tone_uses_default() {
        assert_eq!(Palette::default().tone_color("mystery"), DEFAULT_TONE);
    }

    #[test]
    fn overrides_add_and_replace() {
        let mut overrides = BTreeMap::new();
        overrides.insert("presence".to_string(), "#000000".to_string());
        overrides.insert("joy".to_string(), "#ffee00".to_string());
        let palette = Palette::with_overrides(&overrides);
        assert_eq!(palette.tone_color("presence"), "#000000");
        assert_eq!(palette.tone_color("joy"), "#ffee00");
        assert_eq!(palette.tone_color("fire"), "#ff9c73");
    }

    #[test]
    fn hex_to_rgba_parses_with_and_without_hash() {
        assert_eq!(hex_to_rgba("#5fe3d1", 0.18), "rgba(95, 227, 209, 0.18)");
        assert_eq!(hex_to_rgba("FF9C73", 1.0), "rgba(255, 156, 115, 1)");
    }

    #[test]
    fn hex_to_rgba_falls_back_on_malformed() {
        assert_eq!(hex_to_rgba("#fff", 0.3), "rgba(158,182,255,0.3)");
        assert_eq!(hex_to_rgba("not a color", 0.5), "rgba(158,182,255,0.5)");
    }

    #[test]
    fn badge_style_uses_translucent_base() {
        let style = Palette::default().badge_style("fire");
        assert!(style.contains("rgba(255, 156, 115, 0.18)"));
        assert!(style.contains("rgba(255, 156, 115, 0.3)"));
        assert!(style.contains(CHIP_TEXT));
    }

    #[test]
    fn pill_style_all_is_neutral_and_active_is_stronger() {
        let palette = Palette::default();
        assert!(palette.pill_style("all", true).contains("rgba(255,255,255,0.06)"));
        assert!(palette.pill_style("fire", true).contains("0.28"));
        assert!(palette.pill_style("fire", false).contains("0.16"));
    }

    #[test]
    fn aura_prefers_first_tag_then_category() {
        let palette = Palette::default();
        assert_eq!(palette.aura(&tags(&["fire", "presence"]), None).base, "#ff9c73");
        assert_eq!(palette.aura(&tags(&["weekly"]), Some("earthbeat")).base, "#7fe1a7");
        assert_eq!(palette.aura(&[], Some("feature")).base, "#ffd98a");
        assert_eq!(palette.aura(&[], None).base, DEFAULT_TONE);
        assert_eq!(palette.aura(&[], Some("podcast")).base, DEFAULT_TONE);
    }

    #[test]
    fn aura_only_looks_at_first_tag() {
        let palette = Palette::default();
        assert_eq!(palette.aura(&tags(&["unknown", "fire"]), None).base, DEFAULT_TONE);
    }

    #[test]
    fn aura_gradients_use_both_strengths() {
        let aura = Palette::default().aura(&tags(&["presence"]), None);
        assert!(aura.card_gradient().contains("rgba(95, 227, 209, 0.32)"));
        assert!(aura.card_gradient().contains("rgba(95, 227, 209, 0.18)"));
        assert!(aura.header_gradient().contains("rgba(95, 227, 209, 0.35)"));
    }

    #[test]
    fn glyph_rules_in_priority_order() {
        assert_eq!(glyph_for_tags(&tags(&["Doctrine", "fire"])), "📜");
        assert_eq!(glyph_for_tags(&tags(&["fire"])), "🜂");
        assert_eq!(glyph_for_tags(&tags(&["breath"])), "⌁");
        assert_eq!(glyph_for_tags(&tags(&["spiral", "healing"])), "🌀");
    }

    #[test]
    fn glyph_conjunction_needs_every_tag() {
        assert_eq!(glyph_for_tags(&tags(&["protection", "shadow"])), "🜃");
        assert_eq!(glyph_for_tags(&tags(&["protection"])), DEFAULT_GLYPH);
    }

    #[test]
    fn glyph_default_for_unknown_or_empty() {
        assert_eq!(glyph_for_tags(&[]), DEFAULT_GLYPH);
        assert_eq!(glyph_for_tags(&tags(&["weekly"])), DEFAULT_GLYPH);
    }

    #[test]
    fn reel_classes() {
        assert_eq!(reel_tone_class("Truth "), "tone-truth");
        assert_eq!(reel_tone_class("grief"), "tone-shadow");
        assert_eq!(reel_tone_class("freedom"), "tone-freedom");
        assert_eq!(reel_tone_class("humor"), "tone-neutral");
    }
}
