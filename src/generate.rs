//! HTML site generation.
//!
//! Renders every route of the site from the loaded [`ContentStore`] into
//! static files.
//!
//! ## Generated Pages
//!
//! - **Landing** (`/index.html`): whisper text with the gateway link to `/core`
//! - **Core** (`/core/index.html`): module hub linking every live chamber
//! - **Scroll Grove** (`/scrolls/index.html`): tag legend, search, cards in file order
//! - **Scroll pages** (`/scrolls/{slug}/index.html`): body with newer/older links
//! - **Journal** (`/journal/index.html`): category pills, search, newest-first grid
//! - **Journal entries** (`/journal/{slug}/index.html`): body, category neighbors, related
//! - **Reels** (`/reels/index.html`): embedded videos
//! - **Ember** (`/ember/index.html`): intro, featured toggle, ritual/sequence/resource sections
//! - **About** (`/about/index.html`): `about.md`, when present
//! - **Not found** (`/404.html`, `/scrolls/404.html`, `/journal/404.html`)
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── core/index.html
//! ├── about/index.html
//! ├── scrolls/
//! │   ├── index.html
//! │   ├── 404.html
//! │   └── doctrine-of-the-spiral/index.html
//! ├── journal/
//! │   ├── index.html
//! │   ├── 404.html
//! │   └── weekly-the-door-we-open/index.html
//! ├── reels/index.html
//! ├── ember/index.html
//! └── assets/                  # copied from the content root
//! ```
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors injected from config)
//! - `static/reveal.js`: Reveal-on-scroll for cards
//! - `static/filter.js`: Pill/search filtering and `cat`/`tag` URL sync on list pages
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config::{self, SiteConfig};
use crate::markup;
use crate::naming::slugify;
use crate::nav::{Route, percent_encode};
use crate::query::{self, Neighbors, Query};
use crate::store::{AboutPage, ContentStore, RITUAL_SECTIONS};
use crate::tone::{self, Palette};
use crate::types::{ContentItem, Family};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk assets: {0}")]
    Walk(#[from] walkdir::Error),
}

/// What a build wrote, relative to the output directory.
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub pages: Vec<PathBuf>,
    pub assets_copied: usize,
    /// Items that got no detail page because their slug is not a usable path segment.
    pub skipped_slugs: Vec<String>,
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const REVEAL_JS: &str = include_str!("../static/reveal.js");
const FILTER_JS: &str = include_str!("../static/filter.js");

/// Milliseconds between successive card reveals; capped so long grids don't lag.
const REVEAL_STEP_MS: usize = 60;
const REVEAL_MAX_STEPS: usize = 12;

const SCROLL_PLACEHOLDER: &str = "This scroll's body is coming soon.";

/// A chamber on the Core hub.
struct Module {
    title: &'static str,
    route: Route,
    tones: [&'static str; 3],
    /// Position on the hub, as (left %, top %).
    position: (u8, u8),
}

fn hub_modules() -> [Module; 5] {
    [
        Module {
            title: "Scroll Grove",
            route: Route::List(Family::Scrolls),
            tones: ["wisdom", "breath", "echo"],
            position: (18, 24),
        },
        Module {
            title: "Codex Ember",
            route: Route::List(Family::Rituals),
            tones: ["ritual", "creation", "fire"],
            position: (80, 40),
        },
        Module {
            title: "Lumina Journal",
            route: Route::List(Family::Journal),
            tones: ["earthbeat", "weekly", "features"],
            position: (38, 80),
        },
        Module {
            title: "Codex Reels",
            route: Route::List(Family::Reels),
            tones: ["spiritual", "humorous", "transmission"],
            position: (72, 78),
        },
        Module {
            title: "About Codex Lumina",
            route: Route::About,
            tones: ["orientation", "teachings", "offerings"],
            position: (52, 10),
        },
    ]
}

/// Shared rendering context.
struct Site<'a> {
    config: &'a SiteConfig,
    palette: Palette,
    css: String,
    has_about: bool,
}

impl<'a> Site<'a> {
    fn new(config: &'a SiteConfig, has_about: bool) -> Self {
        let theme_css = config::generate_theme_css(&config.theme);
        Self {
            config,
            palette: Palette::with_overrides(&config.palette),
            css: format!("{theme_css}\n\n{CSS_STATIC}"),
            has_about,
        }
    }

    fn page_title(&self, title: &str) -> String {
        format!("{title} · {}", self.config.site.title)
    }
}

pub fn generate(
    store: &ContentStore,
    config: &SiteConfig,
    source_dir: &Path,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let site = Site::new(config, store.about().is_some());
    let mut report = GenerateReport::default();

    fs::create_dir_all(output_dir)?;
    report.assets_copied = copy_assets(source_dir, output_dir)?;

    let write = |route: &Route, page: Markup, report: &mut GenerateReport| {
        write_page(output_dir, route.output_path(), page, report)
    };

    write(&Route::Landing, render_landing(&site), &mut report)?;
    write(&Route::Core, render_core(&site, store), &mut report)?;
    write(&Route::NotFound, render_not_found(&site, None), &mut report)?;
    if let Some(about) = store.about() {
        write(&Route::About, render_about(&site, about), &mut report)?;
    }

    // Scrolls: grove keeps file order, detail neighbors follow date order
    let scrolls = store.get_all(Family::Scrolls);
    write(
        &Route::List(Family::Scrolls),
        render_scroll_grove(&site, scrolls),
        &mut report,
    )?;
    let scroll_pages = detail_items(scrolls, &mut report.skipped_slugs);
    let scroll_order = query::sort_descending_by_date(scroll_pages.iter().copied());
    for &item in &scroll_pages {
        let page = render_scroll_detail(&site, item, query::neighbors(&scroll_order, &item.slug));
        for alias in scroll_aliases(scrolls, item) {
            debug!(slug = %item.slug, alias = %alias, "scroll alias page");
            write(&Route::Detail(Family::Scrolls, alias), page.clone(), &mut report)?;
        }
        write(&Route::Detail(Family::Scrolls, item.slug.clone()), page, &mut report)?;
    }

    // Journal: neighbors stay within the entry's category
    let entries = store.get_all(Family::Journal);
    write(
        &Route::List(Family::Journal),
        render_journal(&site, entries),
        &mut report,
    )?;
    let journal_pages = detail_items(entries, &mut report.skipped_slugs);
    for &item in &journal_pages {
        let scope = match item.category.as_deref() {
            Some(category) => Query::all().with_category(category),
            None => Query::all(),
        };
        let order = query::listing(journal_pages.iter().copied(), &scope);
        let related = query::related(entries, item, config.journal.related_limit);
        let page = render_journal_entry(&site, item, query::neighbors(&order, &item.slug), &related);
        write(&Route::Detail(Family::Journal, item.slug.clone()), page, &mut report)?;
    }

    write(
        &Route::List(Family::Reels),
        render_reels(&site, store.get_all(Family::Reels)),
        &mut report,
    )?;
    write(
        &Route::List(Family::Rituals),
        render_ember(&site, store.get_all(Family::Rituals), store.intro_note()),
        &mut report,
    )?;

    for family in Family::ALL.into_iter().filter(|f| f.has_detail_pages()) {
        let path = PathBuf::from(family.route_segment()).join("404.html");
        write_page(output_dir, path, render_not_found(&site, Some(family)), &mut report)?;
    }

    Ok(report)
}

fn write_page(
    output_dir: &Path,
    relative: PathBuf,
    page: Markup,
    report: &mut GenerateReport,
) -> Result<(), GenerateError> {
    let path = output_dir.join(&relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, page.into_string())?;
    debug!(page = %relative.display(), "wrote page");
    report.pages.push(relative);
    Ok(())
}

/// Copy `<source>/assets/` into `<output>/assets/`.
fn copy_assets(source_dir: &Path, output_dir: &Path) -> Result<usize, GenerateError> {
    let assets = source_dir.join("assets");
    if !assets.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(&assets).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        let dest = output_dir.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &dest)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Items that get a detail page: first occurrence of each slug, and only
/// slugs usable as a single path segment.
fn detail_items<'a>(items: &'a [ContentItem], skipped: &mut Vec<String>) -> Vec<&'a ContentItem> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if !is_path_segment(&item.slug) {
            warn!(family = %item.family, slug = %item.slug, "slug is not a valid path segment, no detail page");
            skipped.push(item.slug.clone());
            continue;
        }
        if seen.insert(item.slug.as_str()) {
            out.push(item);
        }
    }
    out
}

/// Extra keys a scroll page is also written under: its title-derived slug
/// and its id, when those resolve back to this scroll and no other scroll
/// owns them as a real slug.
fn scroll_aliases(scrolls: &[ContentItem], item: &ContentItem) -> Vec<String> {
    let mut aliases: Vec<String> = Vec::new();
    for key in [slugify(&item.title), item.id.clone()] {
        if key == item.slug
            || !is_path_segment(&key)
            || aliases.contains(&key)
            || scrolls.iter().any(|other| other.slug == key)
        {
            continue;
        }
        if query::resolve_detail(scrolls, &key).is_some_and(|found| std::ptr::eq(found, item)) {
            aliases.push(key);
        }
    }
    aliases
}

/// Link target for an item's detail page, `None` when it has no page.
fn detail_href(item: &ContentItem) -> Option<String> {
    is_path_segment(&item.slug).then(|| Route::Detail(item.family, item.slug.clone()).href())
}

fn is_path_segment(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && slug != "404.html"
        && !slug.contains(['/', '\\', '?', '#'])
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(
    site: &Site,
    title: &str,
    body_class: Option<&str>,
    scripts: &[&str],
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(&site.css)) }
            }
            body class=[body_class] {
                (content)
                script { (PreEscaped(REVEAL_JS)) }
                @for js in scripts {
                    script { (PreEscaped(*js)) }
                }
            }
        }
    }
}

/// Renders the site header with the chamber navigation
fn site_header(site: &Site, current: &Route) -> Markup {
    let mut links = vec![
        (Route::Core, "Core"),
        (Route::List(Family::Scrolls), "Scrolls"),
        (Route::List(Family::Journal), "Journal"),
        (Route::List(Family::Reels), "Reels"),
        (Route::List(Family::Rituals), "Ember"),
    ];
    if site.has_about {
        links.push((Route::About, "About"));
    }
    let section = match current {
        Route::Detail(family, _) => Route::List(*family),
        other => other.clone(),
    };

    html! {
        header.site-header {
            a.brand href="/" { (site.config.site.title) }
            nav.site-nav {
                ul {
                    @for (route, label) in &links {
                        li class=[(*route == section).then_some("current")] {
                            a href=(route.href()) { (label) }
                        }
                    }
                }
            }
        }
    }
}

fn format_date(item: &ContentItem) -> Option<String> {
    item.published_at
        .map(|d| d.format("%B %-d, %Y").to_string())
}

fn iso_date(item: &ContentItem) -> Option<String> {
    item.published_at.map(|d| d.to_rfc3339())
}

fn tag_badges(site: &Site, tags: &[String]) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.badges {
                @for tag in tags {
                    li.badge style=(site.palette.badge_style(tag)) { (tag) }
                }
            }
        }
    }
}

/// Inline style for a revealing card: its stagger index plus the aura.
fn card_style(site: &Site, item: &ContentItem, index: usize) -> String {
    let aura = site.palette.aura(&item.tags, item.category.as_deref());
    format!(
        "--reveal-delay: {}ms; background-image: {};",
        index.min(REVEAL_MAX_STEPS) * REVEAL_STEP_MS,
        aura.card_gradient()
    )
}

/// Text `filter.js` searches: the same fields as the query engine.
fn search_text(item: &ContentItem) -> String {
    let mut parts = vec![item.title.to_lowercase()];
    if let Some(summary) = &item.summary {
        parts.push(summary.to_lowercase());
    }
    parts.extend(item.tags.iter().map(|t| t.to_lowercase()));
    parts.join("\n")
}

fn search_box(placeholder: &str) -> Markup {
    html! {
        input.search-box type="search" placeholder=(placeholder) aria-label=(placeholder);
    }
}

/// A filter pill. Carries both styles so `filter.js` can toggle them.
fn pill(site: &Site, param: &str, value: &str, label: Markup, active: bool, href: String) -> Markup {
    let active_style = site.palette.pill_style(value, true);
    let idle_style = site.palette.pill_style(value, false);
    html! {
        a.pill.active[active]
            href=(href)
            data-param=(param)
            data-value=(value)
            data-style-active=(active_style)
            data-style-idle=(idle_style)
            style=(if active { &active_style } else { &idle_style })
        { (label) }
    }
}

fn neighbor_links(family: Family, neighbors: Neighbors) -> Markup {
    html! {
        nav.neighbors {
            @if let Some(newer) = neighbors.previous {
                a.neighbor.newer href=(Route::Detail(family, newer.slug.clone()).href()) {
                    span.neighbor-label { "← Newer" }
                    span.neighbor-title { (newer.title) }
                }
            }
            @if let Some(older) = neighbors.next {
                a.neighbor.older href=(Route::Detail(family, older.slug.clone()).href()) {
                    span.neighbor-label { "Older →" }
                    span.neighbor-title { (older.title) }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_landing(site: &Site) -> Markup {
    let content = html! {
        main.landing {
            header.landing-header {
                h1 { (site.config.site.tagline) }
                p.landing-alt { "“I walk, and the spiral walks with me.”" }
            }
            section.whisper aria-label="Whisper Scroll" {
                p {
                    "The path is not hidden." br;
                    "It waits in stillness." br;
                    "When your tone and time align…" br;
                    "The " a.gateway href=(Route::Core.href()) { "Gateway" } " will open."
                }
            }
        }
    };
    base_document(site, &site.config.site.title, Some("landing-view"), &[], content)
}

fn render_core(site: &Site, store: &ContentStore) -> Markup {
    let content = html! {
        (site_header(site, &Route::Core))
        main.core-page {
            div.core-spiral {}
            div.core-center { "Codex Core" }
            @for module in hub_modules() {
                @if module.route != Route::About || site.has_about {
                    @let count = match &module.route {
                        Route::List(family) => Some(store.get_all(*family).len()),
                        _ => None,
                    };
                    a.module-node
                        href=(module.route.href())
                        style=(format!("left: {}%; top: {}%;", module.position.0, module.position.1))
                    {
                        span.module-glyph { (tone::glyph_for_tags(&module.tones.map(String::from))) }
                        span.module-title { (module.title) }
                        @if let Some(count) = count {
                            span.module-count { (count) }
                        }
                        span.module-tones { (module.tones.join(" · ")) }
                    }
                }
            }
        }
    };
    base_document(site, &site.page_title("Codex Core"), Some("core-view"), &[], content)
}

fn render_scroll_grove(site: &Site, scrolls: &[ContentItem]) -> Markup {
    let route = Route::List(Family::Scrolls);
    let counts = query::tag_counts(scrolls);

    let content = html! {
        (site_header(site, &route))
        main.list-page.scroll-grove {
            header.page-header {
                h1 { (Family::Scrolls.title()) }
                p.page-subtitle { "Teachings, laws, and remembrances. Follow a tone to see where it leads." }
            }
            @if !counts.is_empty() {
                nav.tag-legend aria-label="Tone tags" {
                    (pill(site, "tag", "all", html! { "all" }, true, route.href()))
                    @for (tag, count) in &counts {
                        (pill(
                            site,
                            "tag",
                            tag,
                            html! { (tag) " " span.count { (count) } },
                            false,
                            format!("{}?tag={}", route.href(), percent_encode(tag)),
                        ))
                    }
                }
            }
            (search_box("Search scrolls"))
            @if scrolls.is_empty() {
                p.empty { "No scrolls yet." }
            } @else {
                div.card-grid {
                    @for (index, item) in scrolls.iter().enumerate() {
                        a.card.reveal
                            href=[detail_href(item)]
                            style=(card_style(site, item, index))
                            data-tags=(item.tags.join("|"))
                            data-search=(search_text(item))
                        {
                            span.card-glyph { (tone::glyph_for_tags(&item.tags)) }
                            h2.card-title { (item.title) }
                            @if let Some(date) = format_date(item) {
                                time.card-date datetime=[iso_date(item)] { (date) }
                            }
                            (tag_badges(site, &item.tags))
                            @if let Some(summary) = &item.summary {
                                p.card-summary { (summary) }
                            }
                        }
                    }
                }
                p.empty.filtered-empty hidden { "No scrolls match." }
            }
        }
    };
    base_document(site, &site.page_title(Family::Scrolls.title()), None, &[FILTER_JS], content)
}

fn render_scroll_detail(site: &Site, item: &ContentItem, neighbors: Neighbors) -> Markup {
    let aura = site.palette.aura(&item.tags, item.category.as_deref());
    let route = Route::Detail(Family::Scrolls, item.slug.clone());

    let content = html! {
        (site_header(site, &route))
        main.detail-page {
            a.back-link href=(Route::List(Family::Scrolls).href()) { "← Back to the Grove" }
            article.detail {
                header.detail-header style=(format!("background-image: {};", aura.header_gradient())) {
                    span.detail-glyph { (tone::glyph_for_tags(&item.tags)) }
                    h1 { (item.title) }
                    @if let Some(date) = format_date(item) {
                        time.detail-date datetime=[iso_date(item)] { (date) }
                    }
                    (tag_badges(site, &item.tags))
                }
                div.detail-body {
                    (markup::render_body(item.body.as_ref(), item.summary.as_deref(), SCROLL_PLACEHOLDER))
                }
            }
            (neighbor_links(Family::Scrolls, neighbors))
        }
    };
    base_document(site, &site.page_title(&item.title), None, &[], content)
}

fn render_journal(site: &Site, entries: &[ContentItem]) -> Markup {
    let route = Route::List(Family::Journal);
    let categories = &site.config.journal.categories;
    let groups = query::group_by_category(entries, categories);
    let visible = query::listing(entries, &Query::all());

    let content = html! {
        (site_header(site, &route))
        main.list-page.journal {
            header.page-header {
                h1 { (Family::Journal.title()) }
                p.page-subtitle { "Earthbeat notes, weekly reflections, and features." }
            }
            nav.category-pills aria-label="Categories" {
                (pill(
                    site,
                    "cat",
                    "all",
                    html! { "all " span.count { (entries.len()) } },
                    true,
                    route.href(),
                ))
                @for group in &groups {
                    (pill(
                        site,
                        "cat",
                        &group.category,
                        html! { (crate::naming::display_label(&group.category)) " " span.count { (group.items.len()) } },
                        false,
                        format!("{}?cat={}", route.href(), percent_encode(&group.category)),
                    ))
                }
            }
            (search_box("Search the journal"))
            @if visible.is_empty() {
                p.empty { "No entries yet." }
            } @else {
                div.card-grid {
                    @for (index, item) in visible.iter().enumerate() {
                        a.card.journal-card.reveal
                            href=[detail_href(item)]
                            style=(card_style(site, item, index))
                            data-category=[item.category.as_deref()]
                            data-tags=(item.tags.join("|"))
                            data-search=(search_text(item))
                        {
                            @if let Some(category) = &item.category {
                                span.card-category style=(site.palette.badge_style(category)) { (category) }
                            }
                            h2.card-title { (item.title) }
                            @if let Some(date) = format_date(item) {
                                time.card-date datetime=[iso_date(item)] { (date) }
                            }
                            @if let Some(summary) = &item.summary {
                                p.card-summary { (summary) }
                            }
                            (tag_badges(site, &item.tags))
                        }
                    }
                }
                p.empty.filtered-empty hidden { "No entries match." }
            }
        }
    };
    base_document(site, &site.page_title(Family::Journal.title()), None, &[FILTER_JS], content)
}

fn render_journal_entry(
    site: &Site,
    item: &ContentItem,
    neighbors: Neighbors,
    related: &[&ContentItem],
) -> Markup {
    let aura = site.palette.aura(&item.tags, item.category.as_deref());
    let route = Route::Detail(Family::Journal, item.slug.clone());
    let back_href = match &item.category {
        Some(category) => format!("{}?cat={}", Route::List(Family::Journal).href(), percent_encode(category)),
        None => Route::List(Family::Journal).href(),
    };

    let content = html! {
        (site_header(site, &route))
        main.detail-page {
            a.back-chip href=(back_href) {
                "← "
                @match &item.category {
                    Some(category) => { (crate::naming::display_label(category)) }
                    None => { "Journal" }
                }
            }
            article.detail {
                header.detail-header style=(format!("background-image: {};", aura.header_gradient())) {
                    h1 { (item.title) }
                    @if let Some(date) = format_date(item) {
                        time.detail-date datetime=[iso_date(item)] { (date) }
                    }
                    (tag_badges(site, &item.tags))
                }
                @if let Some(cover) = &item.cover_image_url {
                    figure.cover {
                        img src=(cover) alt=(item.title) loading="lazy";
                    }
                }
                div.detail-body {
                    (markup::render_body(item.body.as_ref(), item.summary.as_deref(), ""))
                }
            }
            (neighbor_links(Family::Journal, neighbors))
            @if !related.is_empty() {
                section.related {
                    h2 { "Related" }
                    ul {
                        @for other in related {
                            li {
                                a href=[detail_href(other)] { (other.title) }
                            }
                        }
                    }
                }
            }
        }
    };
    base_document(site, &site.page_title(&item.title), None, &[], content)
}

fn render_reels(site: &Site, reels: &[ContentItem]) -> Markup {
    let route = Route::List(Family::Reels);
    let content = html! {
        (site_header(site, &route))
        main.list-page.reels {
            header.page-header {
                h1 { (Family::Reels.title()) }
                p.page-subtitle { "Short transmissions. Some spiritual, some humorous, all sincere." }
            }
            @if reels.is_empty() {
                p.empty { "No reels yet." }
            } @else {
                section.reel-grid aria-label="Reels" {
                    @for (index, reel) in reels.iter().enumerate() {
                        article.reel-card.reveal
                            id=(reel.id)
                            style=(format!("--reveal-delay: {}ms;", index.min(REVEAL_MAX_STEPS) * REVEAL_STEP_MS))
                        {
                            @if let Some(url) = &reel.media_url {
                                div.reel-frame {
                                    iframe src=(url) title=(reel.title) loading="lazy"
                                        allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"
                                        allowfullscreen {}
                                }
                            }
                            div.reel-body {
                                h2.reel-title { (reel.title) }
                                @if let Some(summary) = &reel.summary {
                                    p.reel-description { (summary) }
                                }
                                @if !reel.tags.is_empty() {
                                    ul.reel-tags aria-label="Tone tags" {
                                        @for tag in &reel.tags {
                                            li class={ "reel-tag " (tone::reel_tone_class(tag)) } { (tag) }
                                        }
                                    }
                                }
                                @if let Some(date) = format_date(reel) {
                                    time.reel-date datetime=[iso_date(reel)] { (date) }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    base_document(site, &site.page_title(Family::Reels.title()), None, &[], content)
}

fn render_ember(site: &Site, rituals: &[ContentItem], intro_note: Option<&str>) -> Markup {
    let route = Route::List(Family::Rituals);
    let groups = query::group_by_category(rituals, &RITUAL_SECTIONS);
    let featured = query::filter(rituals, &Query::all().featured(true));

    let content = html! {
        (site_header(site, &route))
        main.list-page.ember {
            header.page-header {
                h1 { (Family::Rituals.title()) }
                p.page-subtitle { "Small rituals for beginning, returning, and closing the day." }
                @if let Some(note) = intro_note {
                    p.ember-intro { (note) }
                }
            }
            @if !featured.is_empty() {
                nav.ember-quickstart aria-label="Quick Start" {
                    @for item in &featured {
                        a.qs-btn href={ "#" (item.id) } { (item.title) }
                    }
                }
                label.featured-toggle {
                    input type="checkbox" data-featured-toggle="ritual";
                    " Featured only"
                }
            }
            @for group in &groups {
                @if !group.items.is_empty() {
                    section.ember-section data-section=(group.category) {
                        h2.ember-section-title { (ember_section_title(&group.category)) }
                        ul.ember-grid {
                            @for (index, item) in group.items.iter().enumerate() {
                                li.ember-card.reveal
                                    id=(item.id)
                                    style=(card_style(site, item, index))
                                    data-featured=(if item.featured { "true" } else { "false" })
                                {
                                    div.ember-card-titlebar {
                                        h3 { (item.title) }
                                        @if item.featured {
                                            span.ember-badge { "Featured" }
                                        }
                                    }
                                    @if let Some(subtitle) = &item.subtitle {
                                        p.ember-subtitle { (subtitle) }
                                    }
                                    @if let Some(summary) = &item.summary {
                                        p.ember-text { (summary) }
                                    }
                                    @if !item.steps.is_empty() {
                                        ol.ember-steps {
                                            @for (n, step) in item.steps.iter().enumerate() {
                                                li.ember-step {
                                                    span.ember-step-index { (n + 1) }
                                                    span.ember-step-text { (step) }
                                                }
                                            }
                                        }
                                    }
                                    (tag_badges(site, &item.tags))
                                    @if let Some(link) = &item.link {
                                        a.ember-link href=(link) { "Open" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    base_document(site, &site.page_title(Family::Rituals.title()), None, &[FILTER_JS], content)
}

fn ember_section_title(section: &str) -> &str {
    match section {
        "ritual" => "Rituals",
        "sequence" => "Sequences",
        "resource" => "Resources",
        other => other,
    }
}

fn render_about(site: &Site, about: &AboutPage) -> Markup {
    let content = html! {
        (site_header(site, &Route::About))
        main.about-page {
            article.about-content {
                (PreEscaped(markup::trusted_markdown_to_html(&about.body)))
            }
        }
    };
    base_document(site, &site.page_title(&about.title), None, &[], content)
}

/// Generic 404, or the not-found view of a family with detail pages.
fn render_not_found(site: &Site, family: Option<Family>) -> Markup {
    let (message, back) = match family {
        Some(Family::Scrolls) => ("Scroll not found.", Route::List(Family::Scrolls)),
        Some(family) => ("Not found.", Route::List(family)),
        None => ("Not found.", Route::Core),
    };
    let back_label = match &back {
        Route::List(family) => format!("← Back to {}", family.title()),
        _ => "← Back to the Core".to_string(),
    };

    let content = html! {
        (site_header(site, &Route::NotFound))
        main.not-found {
            p.not-found-message { (message) }
            a.back-link href=(back.href()) { (back_label) }
        }
    };
    base_document(site, &site.page_title(message), Some("not-found-view"), &[], content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn site(config: &SiteConfig) -> Site<'_> {
        Site::new(config, true)
    }

    #[test]
    fn base_document_includes_doctype_and_theme() {
        let config = SiteConfig::default();
        let doc = base_document(&site(&config), "Test", None, &[], html! { p { "x" } }).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("--color-bg"));
        assert!(doc.contains("IntersectionObserver"));
    }

    #[test]
    fn header_marks_section_of_detail_page() {
        let config = SiteConfig::default();
        let html = site_header(&site(&config), &Route::Detail(Family::Journal, "x".into())).into_string();
        assert!(html.contains(r#"<li class="current"><a href="/journal">"#));
    }

    #[test]
    fn header_omits_about_when_absent() {
        let config = SiteConfig::default();
        let no_about = Site::new(&config, false);
        let html = site_header(&no_about, &Route::Core).into_string();
        assert!(!html.contains("/about"));
    }

    #[test]
    fn landing_links_to_core() {
        let config = SiteConfig::default();
        let html = render_landing(&site(&config)).into_string();
        assert!(html.contains(r#"href="/core""#));
        assert!(html.contains("You Are No Longer Who You Were"));
    }

    #[test]
    fn journal_pills_count_categories() {
        let config = SiteConfig::default();
        let entries = sample_journal();
        let html = render_journal(&site(&config), &entries).into_string();
        assert!(html.contains(r#"href="/journal?cat=weekly""#));
        assert!(html.contains(r#"data-value="all""#));
        assert!(html.contains("Weekly <span class=\"count\">1</span>"));
        assert!(html.contains("all <span class=\"count\">3</span>"));
    }

    #[test]
    fn journal_grid_is_newest_first() {
        let config = SiteConfig::default();
        let entries = sample_journal();
        let html = render_journal(&site(&config), &entries).into_string();
        let dawn = html.find("Earthbeat • Dawn Pulse").unwrap();
        let door = html.find("The Door We Open").unwrap();
        let night = html.find("A Night of Return").unwrap();
        assert!(dawn < door && door < night);
    }

    #[test]
    fn journal_entry_back_chip_keeps_category() {
        let config = SiteConfig::default();
        let entries = sample_journal();
        let entry = find_item(&entries, "weekly-the-door-we-open");
        let html = render_journal_entry(&site(&config), entry, Neighbors::default(), &[]).into_string();
        assert!(html.contains(r#"href="/journal?cat=weekly""#));
        // summary stands in for the missing body
        assert!(html.contains("On choosing invitations over urgency"));
    }

    #[test]
    fn journal_entry_lists_related() {
        let config = SiteConfig::default();
        let entries = sample_journal();
        let current = find_item(&entries, "earthbeat-dawn-pulse");
        let other = find_item(&entries, "weekly-the-door-we-open");
        let html = render_journal_entry(&site(&config), current, Neighbors::default(), &[other]).into_string();
        assert!(html.contains("Related"));
        assert!(html.contains(r#"href="/journal/weekly-the-door-we-open""#));
    }

    #[test]
    fn scroll_detail_placeholder_and_neighbors() {
        let config = SiteConfig::default();
        let older = ContentItem::new(Family::Scrolls, "Older Scroll", "older");
        let item = ContentItem::new(Family::Scrolls, "Bare Scroll", "bare");
        let neighbors = Neighbors {
            previous: None,
            next: Some(&older),
        };
        let html = render_scroll_detail(&site(&config), &item, neighbors).into_string();
        assert!(html.contains("body is coming soon."));
        assert!(html.contains(r#"href="/scrolls/older""#));
        assert!(!html.contains("Newer"));
    }

    #[test]
    fn scroll_grove_keeps_file_order_and_counts_tags() {
        let config = SiteConfig::default();
        let mut first = ContentItem::new(Family::Scrolls, "Zeta", "zeta");
        first.tags = vec!["presence".into()];
        let mut second = ContentItem::new(Family::Scrolls, "Alpha", "alpha");
        second.tags = vec!["presence".into(), "fire".into()];
        second.published_at = crate::store::parse_timestamp("2025-07-01");
        let html = render_scroll_grove(&site(&config), &[first, second]).into_string();

        assert!(html.find("Zeta").unwrap() < html.find("Alpha").unwrap());
        assert!(html.contains("presence <span class=\"count\">2</span>"));
        assert!(html.contains("--reveal-delay: 60ms"));
    }

    #[test]
    fn reels_embed_iframes_with_tone_classes() {
        let config = SiteConfig::default();
        let mut reel = ContentItem::new(Family::Reels, "Spark", "spark");
        reel.media_url = Some("https://www.youtube.com/embed/abc".into());
        reel.tags = vec!["truth".into(), "unmapped".into()];
        let html = render_reels(&site(&config), &[reel]).into_string();
        assert!(html.contains(r#"<iframe src="https://www.youtube.com/embed/abc""#));
        assert!(html.contains("reel-tag tone-truth"));
        assert!(html.contains("reel-tag tone-neutral"));
    }

    #[test]
    fn not_found_views() {
        let config = SiteConfig::default();
        let scroll = render_not_found(&site(&config), Some(Family::Scrolls)).into_string();
        assert!(scroll.contains("Scroll not found."));
        assert!(scroll.contains(r#"href="/scrolls""#));

        let journal = render_not_found(&site(&config), Some(Family::Journal)).into_string();
        assert!(journal.contains("Not found."));
        assert!(journal.contains(r#"href="/journal""#));
    }

    #[test]
    fn unsafe_slugs_get_no_detail_page() {
        let items = vec![
            ContentItem::new(Family::Scrolls, "Good", "good"),
            ContentItem::new(Family::Scrolls, "Escape", "../etc"),
            ContentItem::new(Family::Scrolls, "Again", "good"),
        ];
        let mut skipped = Vec::new();
        let out = detail_items(&items, &mut skipped);
        assert_eq!(slugs(&out), vec!["good"]);
        assert_eq!(out[0].title, "Good");
        assert_eq!(skipped, vec!["../etc"]);
    }

    #[test]
    fn scroll_aliases_skip_keys_owned_by_other_scrolls() {
        let mut vow = ContentItem::new(Family::Scrolls, "Flamekeeper's Vow", "flamekeepers-vow");
        vow.id = "doctrine".into();
        let doctrine = ContentItem::new(Family::Scrolls, "Doctrine", "doctrine");
        let scrolls = vec![vow, doctrine];

        assert_eq!(scroll_aliases(&scrolls, &scrolls[0]), vec!["flamekeeper-s-vow"]);
        assert!(scroll_aliases(&scrolls, &scrolls[1]).is_empty());
    }

    #[test]
    fn filter_script_reads_url_state_like_query_from_url() {
        // cat is checked against the pills, tag is not
        assert!(FILTER_JS.contains("known.cat.indexOf(cat) !== -1"));
        assert!(FILTER_JS.contains("if (tag) state.tag = tag;"));
    }

    #[test]
    fn cards_without_detail_page_are_not_links() {
        let config = SiteConfig::default();
        let items = vec![
            ContentItem::new(Family::Scrolls, "Escape", "../etc"),
            ContentItem::new(Family::Scrolls, "Good", "good"),
        ];
        let html = render_scroll_grove(&site(&config), &items).into_string();
        assert!(html.contains(r#"href="/scrolls/good""#));
        assert!(!html.contains("/scrolls/../etc"));
    }

    #[test]
    fn duplicate_slug_page_does_not_link_to_itself() {
        let mut first = journal_item("dup", "weekly", "2025-07-01T00:00:00Z", &["presence"]);
        first.title = "Old First".into();
        let mut second = journal_item("dup", "weekly", "2025-07-10T00:00:00Z", &["presence"]);
        second.title = "New Second".into();
        let other = journal_item("other", "weekly", "2025-07-05T00:00:00Z", &["presence"]);
        let store = ContentStore::default().with_family(Family::Journal, vec![first, second, other]);

        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        generate(&store, &SiteConfig::default(), src.path(), out.path()).unwrap();

        let html = fs::read_to_string(out.path().join("journal/dup/index.html")).unwrap();
        assert!(html.contains("Old First"));
        assert!(html.contains(r#"href="/journal/other""#));
        assert!(!html.contains(r#"href="/journal/dup""#));
    }

    #[test]
    fn generate_writes_full_site_from_fixtures() {
        let tmp = setup_fixtures();
        let out = TempDir::new().unwrap();
        let config = config::load_config(tmp.path()).unwrap();
        let store = ContentStore::load(tmp.path()).unwrap();

        let report = generate(&store, &config, tmp.path(), out.path()).unwrap();

        for page in [
            "index.html",
            "404.html",
            "core/index.html",
            "about/index.html",
            "scrolls/index.html",
            "scrolls/404.html",
            "journal/index.html",
            "journal/404.html",
            "journal/weekly-the-door-we-open/index.html",
            "reels/index.html",
            "ember/index.html",
        ] {
            assert!(out.path().join(page).exists(), "missing {page}");
        }
        assert!(report.assets_copied >= 1);
        assert!(out.path().join("assets/glyphs/entrance.svg").exists());

        // title-derived alias of a scroll with an authored slug
        let alias = fs::read_to_string(out.path().join("scrolls/flamekeeper-s-vow/index.html")).unwrap();
        assert!(alias.contains("To tend the fire is to be tended by it."));

        let ember = fs::read_to_string(out.path().join("ember/index.html")).unwrap();
        assert!(ember.contains("Light one ember at a time."));
        assert!(ember.contains(r##"href="#r-nightfall""##));
    }
}
