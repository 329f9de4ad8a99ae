//! Shared test utilities for the lumina test suite.
//!
//! Provides the fixture content root, a small in-memory journal, lookup
//! helpers that panic with the available options, and bulk extractors.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let store = ContentStore::load(tmp.path()).unwrap();
//!
//! let entry = find_item(store.get_all(Family::Journal), "weekly-the-door-we-open");
//! assert_eq!(entry.category.as_deref(), Some("weekly"));
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::store::parse_timestamp;
use crate::types::{ContentItem, Family};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// In-memory content
// =========================================================================

/// A journal entry with the fields the query engine looks at.
pub fn journal_item(slug: &str, category: &str, published_at: &str, tags: &[&str]) -> ContentItem {
    let mut item = ContentItem::new(Family::Journal, slug, slug);
    item.category = Some(category.to_string());
    item.published_at = parse_timestamp(published_at);
    item.tags = tags.iter().map(|t| t.to_string()).collect();
    item
}

/// The three-entry sample journal, in authored order.
pub fn sample_journal() -> Vec<ContentItem> {
    let entry = |id: &str, title: &str, slug: &str, category: &str, summary: &str, tags: &[&str], date: &str| {
        let mut item = journal_item(slug, category, date, tags);
        item.id = id.to_string();
        item.title = title.to_string();
        item.summary = Some(summary.to_string());
        item
    };
    vec![
        entry(
            "1",
            "Earthbeat • Dawn Pulse",
            "earthbeat-dawn-pulse",
            "earthbeat",
            "The Schumann hum softened at sunrise; a gentle coherence returning.",
            &["earthbeat", "coherence", "dawn"],
            "2025-07-20T06:30:00Z",
        ),
        entry(
            "2",
            "Weekly Reflection • The Door We Open",
            "weekly-the-door-we-open",
            "weekly",
            "On choosing invitations over urgency, and how it changes the work.",
            &["weekly", "presence", "invitation"],
            "2025-07-18T17:00:00Z",
        ),
        entry(
            "3",
            "Feature • A Night of Return",
            "feature-spiral-of-sacred-sparks",
            "feature",
            "Fireworks, laughter, and a perfectly-timed lightning strike.",
            &["feature", "joy", "family"],
            "2025-07-05T23:30:00Z",
        ),
    ]
}

// =========================================================================
// Lookups: panics with a clear message on miss
// =========================================================================

/// Find an item by slug. Panics if not found.
pub fn find_item<'a>(items: &'a [ContentItem], slug: &str) -> &'a ContentItem {
    items.iter().find(|i| i.slug == slug).unwrap_or_else(|| {
        let available = item_slugs(items);
        panic!("item '{slug}' not found. Available: {available:?}")
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Slugs of a collection, in order.
pub fn item_slugs(items: &[ContentItem]) -> Vec<&str> {
    items.iter().map(|i| i.slug.as_str()).collect()
}

/// Slugs of a query result, in order.
pub fn slugs<'a>(items: &[&'a ContentItem]) -> Vec<&'a str> {
    items.iter().map(|i| i.slug.as_str()).collect()
}

/// Titles of a query result, in order.
pub fn titles<'a>(items: &[&'a ContentItem]) -> Vec<&'a str> {
    items.iter().map(|i| i.title.as_str()).collect()
}
