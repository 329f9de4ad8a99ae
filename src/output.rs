//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every item is its semantic identity (positional index and title), with
//! slugs, dates, and paths shown as indented context lines. This makes the
//! output readable as a content inventory.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Scroll Grove (4 items)
//! 001 The Doctrine of the Spiral
//!     Slug: doctrine-of-the-spiral
//!     Date: 2025-07-01
//!     Tags: doctrine, spiral
//!
//! Ember (4 items)
//! 001 Nightfall [ritual, featured]
//!     Slug: nightfall
//!
//! Duplicate slugs
//!     scrolls: same-slug
//!
//! Content
//!     config.toml
//!     about.md
//! ```
//!
//! ## Build
//!
//! ```text
//! index.html
//! journal/index.html
//! journal/weekly-the-door-we-open/index.html
//!
//! Generated 17 pages, copied 3 assets
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::enrich::EarthbeatOutcome;
use crate::generate::GenerateReport;
use crate::store::ContentStore;
use crate::types::{Body, ContentItem, Family};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Section header: family title with item count.
///
/// ```text
/// Lumina Journal (4 items)
/// Codex Reels (1 item)
/// ```
fn family_header(family: Family, count: usize) -> String {
    let noun = if count == 1 { "item" } else { "items" };
    format!("{} ({} {})", family.title(), count, noun)
}

/// Item header: index and title, plus category/featured markers when set.
///
/// ```text
/// 001 Weekly Reflection • The Door We Open [weekly]
/// 002 Nightfall [ritual, featured]
/// ```
fn item_line(index: usize, item: &ContentItem) -> String {
    let mut markers: Vec<&str> = Vec::new();
    if let Some(category) = item.category.as_deref() {
        markers.push(category);
    }
    if item.featured {
        markers.push("featured");
    }
    if markers.is_empty() {
        format!("{} {}", format_index(index), item.title)
    } else {
        format!("{} {} [{}]", format_index(index), item.title, markers.join(", "))
    }
}

/// Context lines under an item header.
fn item_details(item: &ContentItem, depth: usize) -> Vec<String> {
    let pad = indent(depth);
    let mut lines = vec![format!("{pad}Slug: {}", item.slug)];
    if let Some(date) = item.published_at {
        lines.push(format!("{pad}Date: {}", date.format("%Y-%m-%d")));
    }
    if !item.tags.is_empty() {
        lines.push(format!("{pad}Tags: {}", item.tags.join(", ")));
    }
    if let Some(preview) = preview_text(item) {
        lines.push(format!("{pad}Summary: {}", truncate_desc(&preview, 60)));
    }
    lines
}

/// Summary, or the start of the body with markup removed.
fn preview_text(item: &ContentItem) -> Option<String> {
    if let Some(summary) = &item.summary {
        return Some(summary.clone());
    }
    let text = match item.body.as_ref()? {
        Body::Html(html) => strip_html_tags(html),
        Body::Markdown(md) => md.clone(),
    };
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

// ============================================================================
// Check
// ============================================================================

/// Inventory of the content root: every family, duplicate slugs, extra files.
pub fn format_check_output(store: &ContentStore, extras: &[&str]) -> Vec<String> {
    let mut lines = Vec::new();

    for family in Family::ALL {
        let items = store.get_all(family);
        lines.push(family_header(family, items.len()));
        for (i, item) in items.iter().enumerate() {
            lines.push(item_line(i + 1, item));
            lines.extend(item_details(item, 1));
        }
        if family == Family::Rituals {
            if let Some(note) = store.intro_note() {
                lines.push(format!("{}Intro: {}", indent(1), note));
            }
        }
        lines.push(String::new());
    }

    let duplicates: Vec<String> = Family::ALL
        .into_iter()
        .flat_map(|family| {
            store
                .duplicate_slugs(family)
                .into_iter()
                .map(move |slug| format!("{}{}: {}", indent(1), family, slug))
        })
        .collect();
    if !duplicates.is_empty() {
        lines.push("Duplicate slugs".to_string());
        lines.extend(duplicates);
        lines.push(String::new());
    }

    if let Some(about) = store.about() {
        lines.push("Pages".to_string());
        lines.push(format!("{}{}", indent(1), about.title));
        lines.push(format!("{}Source: about.md", indent(2)));
        lines.push(String::new());
    }

    if !extras.is_empty() {
        lines.push("Content".to_string());
        for extra in extras {
            lines.push(format!("{}{}", indent(1), extra));
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

pub fn print_check_output(store: &ContentStore, extras: &[&str]) {
    for line in format_check_output(store, extras) {
        println!("{}", line);
    }
}

// ============================================================================
// Query
// ============================================================================

/// Items matching a `lumina query`, in listing order.
pub fn format_query_output(family: Family, items: &[&ContentItem]) -> Vec<String> {
    let mut lines = vec![family_header(family, items.len())];
    for (i, item) in items.iter().enumerate() {
        lines.push(item_line(i + 1, item));
        lines.extend(item_details(item, 1));
    }
    if items.is_empty() {
        lines.push(format!("{}No matches", indent(1)));
    }
    lines
}

pub fn print_query_output(family: Family, items: &[&ContentItem]) {
    for line in format_query_output(family, items) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .pages
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    if !report.skipped_slugs.is_empty() {
        lines.push(String::new());
        lines.push("Skipped (slug is not a valid path)".to_string());
        for slug in &report.skipped_slugs {
            lines.push(format!("{}{}", indent(1), slug));
        }
    }

    lines.push(String::new());
    let asset_noun = if report.assets_copied == 1 { "asset" } else { "assets" };
    lines.push(format!(
        "Generated {} pages, copied {} {}",
        report.pages.len(),
        report.assets_copied,
        asset_noun
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Earthbeat
// ============================================================================

pub fn format_earthbeat_output(outcome: &EarthbeatOutcome) -> Vec<String> {
    match outcome {
        EarthbeatOutcome::AlreadyExists { slug } => {
            vec![format!("Entry already exists for {slug}")]
        }
        EarthbeatOutcome::Added {
            slug,
            analyzed: true,
        } => vec![format!("Added: {slug}")],
        EarthbeatOutcome::Added {
            slug,
            analyzed: false,
        } => vec![
            format!("Added: {slug}"),
            format!("{}Spectrogram unavailable, wrote default summary", indent(1)),
        ],
    }
}

pub fn print_earthbeat_output(outcome: &EarthbeatOutcome) {
    for line in format_earthbeat_output(outcome) {
        println!("{}", line);
    }
}
