//! Slug and label derivation shared by every content family.
//!
//! Items are addressed by slug in URLs (`/scrolls/<slug>`, `/journal/<slug>`).
//! Authors usually supply one, but when a record omits it the slug is derived
//! from the title:
//!
//! - `"Weekly Reflection • The Door We Open"` → `weekly-reflection-the-door-we-open`
//! - `"  Nightfall: A Ritual  "` → `nightfall-a-ritual`
//! - `"***"` → `""` (callers fall back to the id)
//!
//! Only ASCII letters and digits survive; every other run of characters
//! collapses to a single hyphen, and leading/trailing hyphens are trimmed.

/// Derive a URL-safe slug from a display title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Display label for a category or tag: first letter upper-cased.
///
/// `"earthbeat"` → `"Earthbeat"`, `"all"` → `"All"`.
pub fn display_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
