//! # Codex Lumina
//!
//! A static site generator for a small contemplative content site: scrolls,
//! journal entries, video reels, and rituals, each kept as a JSON data file
//! and rendered into themed card grids and detail pages.
//!
//! # Architecture
//!
//! ```text
//! content/*.json  →  ContentStore  →  query  →  generate  →  dist/
//!                     (normalize)     (filter,    (maud pages,
//!                                      sort,       tone colors,
//!                                      group)      embedded JS)
//! ```
//!
//! The store loads every family once and never changes afterwards. Every list
//! and detail page is a pure projection of one family through the [`query`]
//! functions; the same predicates run in the browser (`static/filter.js`) when
//! a visitor clicks a category pill or types in a search box, with `cat` and
//! `tag` kept in the address bar (see [`nav`]).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`store`] | Loads and normalizes the family data files and `about.md` |
//! | [`query`] | Filter, sort, group, neighbor and related-item functions |
//! | [`tone`] | Tag → color, glyph, and CSS class derivation |
//! | [`nav`] | Routes, output paths, and `cat`/`tag` URL state |
//! | [`markup`] | Item bodies → HTML (markdown with raw HTML escaped) |
//! | [`generate`] | Renders every route to static HTML using Maud |
//! | [`config`] | `config.toml` loading, validation, merging, and CSS generation |
//! | [`enrich`] | The daily Earthbeat journal entry from a spectrogram |
//! | [`types`] | The normalized [`types::ContentItem`] and [`types::Family`] |
//! | [`naming`] | Slug derivation and display labels |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Item Shape
//!
//! The four families grew independently and disagree on field names
//! (`tone_tags` vs `tags`, `date` vs `published_at`, `excerpt` vs `summary`).
//! The store maps all of them onto one [`types::ContentItem`] at load time, so
//! the query engine and the renderers are written once.
//!
//! ## Static Output
//!
//! Every route is pre-rendered. The only client-side code is two small
//! vanilla scripts: reveal-on-scroll and list filtering. The generated site
//! can be dropped on any file server.

pub mod config;
pub mod enrich;
pub mod generate;
pub mod markup;
pub mod naming;
pub mod nav;
pub mod output;
pub mod query;
pub mod store;
pub mod tone;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
