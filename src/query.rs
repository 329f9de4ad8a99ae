//! Filtering, ordering, and grouping of content collections.
//!
//! Every list and detail page is a projection of one family's items through
//! these functions:
//!
//! ```text
//! /journal?cat=weekly     listing(items, category=weekly)
//! /journal/<slug>         find_by_slug → neighbors within its category → related
//! /scrolls?tag=presence   filter(items, tag=presence)   (grove keeps file order)
//! /ember                  group_by_category(items, [ritual, sequence, resource])
//! ```
//!
//! All functions are pure and total. Malformed input degrades to empty results
//! or `None`, never an error. Results borrow from the store.
//!
//! ## Ordering
//!
//! Date ordering is newest first, stable, with undated items treated as the
//! Unix epoch. Stability matters: undated collections (rituals, most reels)
//! keep their authored order through every sort.

use crate::types::ContentItem;
use std::collections::BTreeMap;

/// A category or tag selector: everything, or one exact value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selector {
    #[default]
    All,
    Only(String),
}

impl Selector {
    /// `"all"` and the empty string select everything.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "all" {
            Selector::All
        } else {
            Selector::Only(value.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }

    /// The selector as it appears in URLs and pills.
    pub fn as_str(&self) -> &str {
        match self {
            Selector::All => "all",
            Selector::Only(value) => value,
        }
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Selector::parse(value)
    }
}

/// Active filters for a list page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub category: Selector,
    pub tag: Selector,
    /// Free text; whitespace-only counts as empty.
    pub search: String,
    /// Only items flagged `featured` (the ember toggle).
    pub featured_only: bool,
}

impl Query {
    /// The query that matches every item.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<Selector>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<Selector>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn featured(mut self, featured_only: bool) -> Self {
        self.featured_only = featured_only;
        self
    }

    /// Whether `item` passes every active filter.
    pub fn matches(&self, item: &ContentItem) -> bool {
        let category_ok = match &self.category {
            Selector::All => true,
            Selector::Only(k) => item.category.as_deref() == Some(k.as_str()),
        };
        let tag_ok = match &self.tag {
            Selector::All => true,
            Selector::Only(t) => item.tags.iter().any(|tag| tag == t),
        };
        category_ok
            && tag_ok
            && (!self.featured_only || item.featured)
            && matches_search(item, &self.search)
    }
}

/// Case-insensitive containment across title, summary, and tags.
fn matches_search(item: &ContentItem, search: &str) -> bool {
    if search.trim().is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    item.title.to_lowercase().contains(&needle)
        || item
            .summary
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(&needle))
        || item.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

/// Items passing `query`, in input order.
pub fn filter<'a, I>(items: I, query: &Query) -> Vec<&'a ContentItem>
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    items.into_iter().filter(|item| query.matches(item)).collect()
}

/// Stable newest-first ordering by `published_at`.
pub fn sort_descending_by_date<'a, I>(items: I) -> Vec<&'a ContentItem>
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    let mut sorted: Vec<&ContentItem> = items.into_iter().collect();
    sorted.sort_by(|a, b| b.sort_date().cmp(&a.sort_date()));
    sorted
}

/// Filter then date-sort: what a list page shows.
pub fn listing<'a, I>(items: I, query: &Query) -> Vec<&'a ContentItem>
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    sort_descending_by_date(filter(items, query))
}

/// One bucket of [`group_by_category`].
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: String,
    pub items: Vec<&'a ContentItem>,
}

/// Partition items into one bucket per known category, in the given order.
///
/// Items whose category is unknown (or missing) are dropped. Each bucket is
/// date-sorted independently. Empty buckets are kept.
pub fn group_by_category<'a, I, S>(items: I, known_categories: &[S]) -> Vec<CategoryGroup<'a>>
where
    I: IntoIterator<Item = &'a ContentItem>,
    S: AsRef<str>,
{
    let mut groups: Vec<CategoryGroup<'a>> = known_categories
        .iter()
        .map(|k| CategoryGroup {
            category: k.as_ref().to_string(),
            items: Vec::new(),
        })
        .collect();

    for item in items {
        let Some(category) = item.category.as_deref() else {
            continue;
        };
        if let Some(group) = groups.iter_mut().find(|g| g.category == category) {
            group.items.push(item);
        }
    }

    for group in &mut groups {
        group.items = sort_descending_by_date(group.items.iter().copied());
    }
    groups
}

/// First item whose slug equals `slug`.
pub fn find_by_slug<'a, I>(items: I, slug: &str) -> Option<&'a ContentItem>
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    items.into_iter().find(|item| item.slug == slug)
}

/// Detail lookup with the migration fallback: exact slug first, then an item
/// whose title-derived slug or id equals `key`.
pub fn resolve_detail<'a>(items: &'a [ContentItem], key: &str) -> Option<&'a ContentItem> {
    find_by_slug(items, key).or_else(|| {
        items
            .iter()
            .find(|item| crate::naming::slugify(&item.title) == key || item.id == key)
    })
}

/// Chronological neighbors of an item within a listing order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Neighbors<'a> {
    /// The next-newer item.
    pub previous: Option<&'a ContentItem>,
    /// The next-older item.
    pub next: Option<&'a ContentItem>,
}

/// Adjacent items around `current_slug` in `ordered` (newest first).
///
/// Both sides are `None` when the slug is not part of the ordering.
pub fn neighbors<'a>(ordered: &[&'a ContentItem], current_slug: &str) -> Neighbors<'a> {
    let Some(idx) = ordered.iter().position(|item| item.slug == current_slug) else {
        return Neighbors::default();
    };
    Neighbors {
        previous: idx.checked_sub(1).map(|i| ordered[i]),
        next: ordered.get(idx + 1).copied(),
    }
}

/// Same-category items sharing at least one tag with `current`.
///
/// Excludes `current` itself, keeps collection order, and stops at `max_count`.
pub fn related<'a>(
    items: &'a [ContentItem],
    current: &ContentItem,
    max_count: usize,
) -> Vec<&'a ContentItem> {
    items
        .iter()
        .filter(|item| {
            item.slug != current.slug
                && item.category == current.category
                && item.tags.iter().any(|t| current.tags.contains(t))
        })
        .take(max_count)
        .collect()
}

/// Number of items carrying each tag, ordered by tag.
pub fn tag_counts<'a, I>(items: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a ContentItem>,
{
    let mut counts = BTreeMap::new();
    for item in items {
        for tag in &item.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}
