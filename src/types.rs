//! Shared types used across the store, query engine, and renderers.
//!
//! Every family's records are normalized into one [`ContentItem`] shape at
//! load time, so the query engine and the page renderers never look at the
//! per-family JSON field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the distinct content types, each with its own data file and pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Scrolls,
    Journal,
    Reels,
    Rituals,
}

impl Family {
    pub const ALL: [Family; 4] = [
        Family::Scrolls,
        Family::Journal,
        Family::Reels,
        Family::Rituals,
    ];

    /// Data file name inside the content root.
    pub fn data_file(self) -> &'static str {
        match self {
            Family::Scrolls => "scrolls.json",
            Family::Journal => "journal.json",
            Family::Reels => "reels.json",
            Family::Rituals => "ember.json",
        }
    }

    /// First URL path segment for the family's pages.
    pub fn route_segment(self) -> &'static str {
        match self {
            Family::Scrolls => "scrolls",
            Family::Journal => "journal",
            Family::Reels => "reels",
            Family::Rituals => "ember",
        }
    }

    /// Whether items get their own `/<segment>/<slug>` page.
    pub fn has_detail_pages(self) -> bool {
        matches!(self, Family::Scrolls | Family::Journal)
    }

    /// Heading used in listings and CLI output.
    pub fn title(self) -> &'static str {
        match self {
            Family::Scrolls => "Scroll Grove",
            Family::Journal => "Lumina Journal",
            Family::Reels => "Codex Reels",
            Family::Rituals => "Ember",
        }
    }

    /// Singular noun used in not-found messages.
    pub fn item_noun(self) -> &'static str {
        match self {
            Family::Scrolls => "Scroll",
            Family::Journal => "Entry",
            Family::Reels => "Reel",
            Family::Rituals => "Ritual",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Family::Scrolls => "scrolls",
            Family::Journal => "journal",
            Family::Reels => "reels",
            Family::Rituals => "rituals",
        })
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scrolls" | "scroll" => Ok(Family::Scrolls),
            "journal" => Ok(Family::Journal),
            "reels" | "reel" => Ok(Family::Reels),
            "rituals" | "ritual" | "ember" => Ok(Family::Rituals),
            other => Err(format!(
                "unknown family '{other}' (expected scrolls, journal, reels or rituals)"
            )),
        }
    }
}

/// Item body: pre-rendered markup or markdown source, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", content = "source", rename_all = "lowercase")]
pub enum Body {
    Html(String),
    Markdown(String),
}

/// A normalized content record.
///
/// Immutable once the store has loaded it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub family: Family,
    pub id: String,
    pub title: String,
    pub slug: String,
    /// Insertion order matters: the first tag picks the item's color.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    /// Embed URL for reels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl ContentItem {
    /// Minimal item with only the required fields set.
    pub fn new(family: Family, title: impl Into<String>, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            family,
            id: slug.clone(),
            title: title.into(),
            slug,
            tags: Vec::new(),
            published_at: None,
            summary: None,
            body: None,
            category: None,
            cover_image_url: None,
            media_url: None,
            subtitle: None,
            steps: Vec::new(),
            featured: false,
            link: None,
        }
    }

    /// The tag that selects the item's display color, if any.
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    /// Timestamp used for ordering; missing dates sort as the Unix epoch.
    pub fn sort_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}
