//! Content loading: the read-only store every page renders from.
//!
//! The content root holds one JSON data file per family plus an optional
//! `about.md`:
//!
//! ```text
//! content/
//! ├── config.toml       # Site configuration (optional)
//! ├── about.md          # About page (optional)
//! ├── assets/           # Copied verbatim to the output
//! ├── scrolls.json      # [ { title, slug?, tone_tags, date, excerpt, body | body_md } ]
//! ├── journal.json      # [ { title, slug, category, tags, published_at, summary, content } ]
//! ├── reels.json        # [ { id, title, tone_tags, date, description, youtube_url } ]
//! └── ember.json        # { intro: { note }, rituals: [..], sequences: [..], resources: [..] }
//! ```
//!
//! ## Normalization
//!
//! The families grew independently and name the same concepts differently.
//! Loading maps them onto one [`ContentItem`] shape:
//!
//! | Item field | Source fields, first present wins |
//! |------------|-----------------------------------|
//! | `tags` | `tags`, `tone_tags`, `tone`, `category` |
//! | `published_at` | `published_at`, `date` |
//! | `summary` | `summary`, `excerpt`, `description` |
//! | `body` | `body` / `content` (HTML), `body_md` (markdown) |
//! | `slug` | `slug`, else derived from `title` |
//! | `id` | `id` (string or number), else the slug |
//!
//! Ritual records take their ember section (`ritual`, `sequence`, `resource`)
//! as category.
//!
//! Missing optional fields never fail a load. Unknown fields are ignored. A
//! record without a title is rejected, and a missing data file is an empty
//! family. Slug collisions are logged but tolerated: lookups are first-match.

use crate::naming::slugify;
use crate::types::{Body, ContentItem, Family};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{family} record #{index} has no title")]
    MissingTitle { family: Family, index: usize },
}

/// Ember sections in page order, with the category they assign.
pub const RITUAL_SECTIONS: [&str; 3] = ["ritual", "sequence", "resource"];

/// The about page, parsed from `about.md`.
#[derive(Debug, Clone, PartialEq)]
pub struct AboutPage {
    /// First `# heading`, or "About" when there is none.
    pub title: String,
    /// Raw markdown.
    pub body: String,
}

/// All content families, loaded once.
#[derive(Debug, Default)]
pub struct ContentStore {
    families: BTreeMap<Family, Vec<ContentItem>>,
    intro_note: Option<String>,
    about: Option<AboutPage>,
}

impl ContentStore {
    /// Load every family's data file from the content root.
    pub fn load(root: &Path) -> Result<Self, StoreError> {
        let mut store = ContentStore::default();

        for family in Family::ALL {
            let path = root.join(family.data_file());
            if !path.exists() {
                debug!(family = %family, path = %path.display(), "no data file, family is empty");
                continue;
            }
            let raw = fs::read_to_string(&path)?;
            let items = if family == Family::Rituals {
                let mut ember: RawEmber = parse_json(&path, &raw)?;
                store.intro_note = ember.intro.take().and_then(|i| non_empty(i.note));
                ember.into_items()?
            } else {
                let records: Vec<RawRecord> = parse_json(&path, &raw)?;
                normalize_all(family, records, None)?
            };

            for slug in duplicates(&items) {
                warn!(family = %family, slug = %slug, "duplicate slug, first item wins");
            }
            debug!(family = %family, count = items.len(), "loaded family");
            store.families.insert(family, items);
        }

        let about_path = root.join("about.md");
        if about_path.exists() {
            store.about = Some(parse_about(&fs::read_to_string(&about_path)?));
        }

        Ok(store)
    }

    /// Build a store from already-normalized items.
    pub fn with_family(mut self, family: Family, items: Vec<ContentItem>) -> Self {
        self.families.insert(family, items);
        self
    }

    /// The family's items in data-file order. Empty for families with no data.
    pub fn get_all(&self, family: Family) -> &[ContentItem] {
        self.families.get(&family).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Intro note from `ember.json`.
    pub fn intro_note(&self) -> Option<&str> {
        self.intro_note.as_deref()
    }

    pub fn about(&self) -> Option<&AboutPage> {
        self.about.as_ref()
    }

    /// Slugs that appear more than once in a family, in first-seen order.
    pub fn duplicate_slugs(&self, family: Family) -> Vec<String> {
        duplicates(self.get_all(family))
    }

    /// Total number of items across all families.
    pub fn len(&self) -> usize {
        self.families.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn duplicates(items: &[ContentItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut dups = Vec::new();
    for item in items {
        if !seen.insert(item.slug.as_str()) && reported.insert(item.slug.as_str()) {
            dups.push(item.slug.clone());
        }
    }
    dups
}

fn parse_about(content: &str) -> AboutPage {
    let title = content
        .lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .unwrap_or_else(|| "About".to_string());
    AboutPage {
        title,
        body: content.to_string(),
    }
}

// ============================================================================
// Raw records
// ============================================================================

/// Union of every family's record fields. All optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    id: Option<serde_json::Value>,
    title: Option<String>,
    slug: Option<String>,
    tags: Option<Vec<String>>,
    tone_tags: Option<Vec<String>>,
    tone: Option<String>,
    published_at: Option<String>,
    date: Option<String>,
    summary: Option<String>,
    excerpt: Option<String>,
    description: Option<String>,
    body: Option<String>,
    content: Option<String>,
    body_md: Option<String>,
    category: Option<String>,
    cover_image_url: Option<String>,
    youtube_url: Option<String>,
    subtitle: Option<String>,
    steps: Option<Vec<String>>,
    featured: Option<bool>,
    link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawEmber {
    intro: Option<RawIntro>,
    rituals: Vec<RawRecord>,
    sequences: Vec<RawRecord>,
    resources: Vec<RawRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawIntro {
    note: Option<String>,
}

impl RawEmber {
    fn into_items(self) -> Result<Vec<ContentItem>, StoreError> {
        let sections = [self.rituals, self.sequences, self.resources];
        let mut items = Vec::new();
        for (section, records) in RITUAL_SECTIONS.iter().zip(sections) {
            items.extend(normalize_all(Family::Rituals, records, Some(*section))?);
        }
        Ok(items)
    }
}

fn normalize_all(
    family: Family,
    records: Vec<RawRecord>,
    section: Option<&str>,
) -> Result<Vec<ContentItem>, StoreError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            normalize(family, record, section).ok_or(StoreError::MissingTitle { family, index })
        })
        .collect()
}

/// Map a raw record onto the shared item shape. `None` when the title is missing.
fn normalize(family: Family, raw: RawRecord, section: Option<&str>) -> Option<ContentItem> {
    let title = non_empty(raw.title)?.trim().to_string();

    let authored_id = match raw.id {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };
    // Titles made only of symbols slugify to nothing; the id stands in.
    let slug = non_empty(raw.slug)
        .or_else(|| non_empty(Some(slugify(&title))))
        .or_else(|| authored_id.clone())
        .unwrap_or_default();
    let id = authored_id.unwrap_or_else(|| match section {
        Some(section) => format!("{section}-{slug}"),
        None => slug.clone(),
    });

    let tags = raw
        .tags
        .or(raw.tone_tags)
        .or_else(|| raw.tone.clone().map(|t| vec![t]))
        .or_else(|| raw.category.clone().map(|c| vec![c]))
        .unwrap_or_default();

    let published_at = non_empty(raw.published_at)
        .or_else(|| non_empty(raw.date))
        .and_then(|s| parse_timestamp(&s));

    let summary = non_empty(raw.summary)
        .or_else(|| non_empty(raw.excerpt))
        .or_else(|| non_empty(raw.description));

    let body = non_empty(raw.body)
        .or_else(|| non_empty(raw.content))
        .map(Body::Html)
        .or_else(|| non_empty(raw.body_md).map(Body::Markdown));

    let category = match section {
        Some(section) => Some(section.to_string()),
        None => non_empty(raw.category),
    };

    Some(ContentItem {
        family,
        id,
        title,
        slug,
        tags,
        published_at,
        summary,
        body,
        category,
        cover_image_url: non_empty(raw.cover_image_url),
        media_url: non_empty(raw.youtube_url),
        subtitle: non_empty(raw.subtitle),
        steps: raw.steps.unwrap_or_default(),
        featured: raw.featured.unwrap_or(false),
        link: non_empty(raw.link),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
///
/// Anything else is treated as missing.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}
