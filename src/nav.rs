//! Routes and URL query-state synchronization.
//!
//! Every page the generator writes has a [`Route`]. Routes map both ways:
//! from a request path (`/journal/weekly-the-door-we-open`) and to the file
//! that serves it (`journal/weekly-the-door-we-open/index.html`).
//!
//! List pages keep their filter state in the address bar as `cat` and `tag`
//! parameters. [`query_from_url`] reads them once when a page mounts and
//! [`sync_url`] computes the replacement URL whenever a selector changes.
//! `filter.js` performs the same binding in the browser.

use crate::query::{Query, Selector};
use crate::types::Family;
use std::fmt;
use std::path::PathBuf;

/// A page of the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    /// Module hub.
    Core,
    About,
    List(Family),
    Detail(Family, String),
    NotFound,
}

impl Route {
    /// Map a request path to a route. Query string and fragment are ignored.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path
            .split('/')
            .filter(|s| !s.is_empty() && *s != "index.html")
            .collect();

        match segments.as_slice() {
            [] => Route::Landing,
            ["core"] => Route::Core,
            ["about"] => Route::About,
            [segment] => family_for_segment(segment).map_or(Route::NotFound, Route::List),
            [segment, slug] => match family_for_segment(segment) {
                Some(family) if family.has_detail_pages() => {
                    Route::Detail(family, percent_decode(slug))
                }
                _ => Route::NotFound,
            },
            _ => Route::NotFound,
        }
    }

    /// Site-absolute link to the route.
    pub fn href(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Core => "/core".to_string(),
            Route::About => "/about".to_string(),
            Route::List(family) => format!("/{}", family.route_segment()),
            Route::Detail(family, slug) => format!("/{}/{}", family.route_segment(), slug),
            Route::NotFound => "/404.html".to_string(),
        }
    }

    /// File serving the route, relative to the output directory.
    pub fn output_path(&self) -> PathBuf {
        match self {
            Route::Landing => PathBuf::from("index.html"),
            Route::Core => PathBuf::from("core/index.html"),
            Route::About => PathBuf::from("about/index.html"),
            Route::List(family) => PathBuf::from(family.route_segment()).join("index.html"),
            Route::Detail(family, slug) => PathBuf::from(family.route_segment())
                .join(slug)
                .join("index.html"),
            Route::NotFound => PathBuf::from("404.html"),
        }
    }
}

fn family_for_segment(segment: &str) -> Option<Family> {
    Family::ALL
        .into_iter()
        .find(|family| family.route_segment() == segment)
}

/// A URL split into path and ordered query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlState {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl UrlState {
    pub fn parse(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or_default();
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (percent_decode(key), percent_decode(value))
            })
            .collect();
        Self {
            path: path.to_string(),
            params,
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key` in place, or append it when absent. Later duplicates are dropped.
    pub fn set(&mut self, key: &str, value: &str) {
        let mut seen = false;
        self.params.retain_mut(|(k, v)| {
            if k != key {
                return true;
            }
            if seen {
                return false;
            }
            seen = true;
            *v = value.to_string();
            true
        });
        if !seen {
            self.params.push((key.to_string(), value.to_string()));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.params.retain(|(k, _)| k != key);
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        for (i, (key, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={}", percent_encode(key), percent_encode(value))?;
        }
        Ok(())
    }
}

/// How the browser should record a URL change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// Overwrite the current history entry.
    Replace,
}

/// Result of [`sync_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlUpdate {
    pub url: String,
    pub history: HistoryMode,
    /// False when `url` equals the current URL.
    pub changed: bool,
}

/// Read the list-page selectors from a URL.
///
/// `cat` is honored only when it names a known category. `tag` is taken as is.
pub fn query_from_url<S: AsRef<str>>(url: &str, known_categories: &[S]) -> Query {
    let state = UrlState::parse(url);

    let category = match Selector::parse(state.get("cat").unwrap_or_default()) {
        Selector::Only(cat) if known_categories.iter().any(|k| k.as_ref() == cat) => {
            Selector::Only(cat)
        }
        _ => Selector::All,
    };
    let tag = Selector::parse(state.get("tag").unwrap_or_default());

    Query::all().with_category(category).with_tag(tag)
}

/// The URL reflecting `desired`'s selectors, derived from `current`.
///
/// `All` removes its parameter. The path and unrelated parameters are kept.
/// Search text is not synced.
pub fn sync_url(current: &str, desired: &Query) -> UrlUpdate {
    let mut state = UrlState::parse(current);
    for (key, selector) in [("cat", &desired.category), ("tag", &desired.tag)] {
        match selector {
            Selector::All => state.remove(key),
            Selector::Only(value) => state.set(key, value),
        }
    }
    let url = state.to_string();
    let changed = url != current;
    UrlUpdate {
        url,
        history: HistoryMode::Replace,
        changed,
    }
}

/// Decode `+` and `%XX` escapes. Malformed escapes are kept literally.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Escape everything outside the URL-unreserved set.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATEGORIES: [&str; 3] = ["earthbeat", "weekly", "feature"];

    #[test]
    fn parses_top_level_routes() {
        assert_eq!(Route::parse("/"), Route::Landing);
        assert_eq!(Route::parse(""), Route::Landing);
        assert_eq!(Route::parse("/core"), Route::Core);
        assert_eq!(Route::parse("/about/"), Route::About);
        assert_eq!(Route::parse("/ember"), Route::List(Family::Rituals));
        assert_eq!(Route::parse("/reels/index.html"), Route::List(Family::Reels));
    }

    #[test]
    fn parses_detail_routes() {
        assert_eq!(
            Route::parse("/journal/weekly-the-door-we-open?cat=weekly"),
            Route::Detail(Family::Journal, "weekly-the-door-we-open".into())
        );
        assert_eq!(
            Route::parse("/scrolls/doctrine-of-the-spiral"),
            Route::Detail(Family::Scrolls, "doctrine-of-the-spiral".into())
        );
    }

    #[test]
    fn detail_without_detail_pages_is_not_found() {
        assert_eq!(Route::parse("/reels/some-reel"), Route::NotFound);
        assert_eq!(Route::parse("/ember/nightfall"), Route::NotFound);
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(Route::parse("/podcasts"), Route::NotFound);
        assert_eq!(Route::parse("/journal/a/b"), Route::NotFound);
    }

    #[test]
    fn href_round_trips_through_parse() {
        let routes = [
            Route::Landing,
            Route::Core,
            Route::About,
            Route::List(Family::Scrolls),
            Route::List(Family::Rituals),
            Route::Detail(Family::Journal, "earthbeat-dawn-pulse".into()),
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.href()), route);
        }
    }

    #[test]
    fn output_paths() {
        assert_eq!(Route::Landing.output_path(), PathBuf::from("index.html"));
        assert_eq!(
            Route::List(Family::Rituals).output_path(),
            PathBuf::from("ember/index.html")
        );
        assert_eq!(
            Route::Detail(Family::Journal, "x".into()).output_path(),
            PathBuf::from("journal/x/index.html")
        );
        assert_eq!(Route::NotFound.output_path(), PathBuf::from("404.html"));
    }

    #[test]
    fn url_state_parse_and_display() {
        let state = UrlState::parse("/journal?cat=weekly&q=door+we#top");
        assert_eq!(state.path, "/journal");
        assert_eq!(state.get("cat"), Some("weekly"));
        assert_eq!(state.get("q"), Some("door we"));
        assert_eq!(state.to_string(), "/journal?cat=weekly&q=door%20we");
    }

    #[test]
    fn url_state_set_keeps_position() {
        let mut state = UrlState::parse("/journal?cat=weekly&ref=home&cat=feature");
        state.set("cat", "earthbeat");
        assert_eq!(state.to_string(), "/journal?cat=earthbeat&ref=home");
    }

    #[test]
    fn percent_decode_handles_malformed_escapes() {
        assert_eq!(percent_decode("a%20b"), "a b");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("%C3%A9"), "é");
    }

    #[test]
    fn query_from_url_reads_known_category() {
        let query = query_from_url("/journal?cat=weekly&tag=presence", &CATEGORIES);
        assert_eq!(query.category, Selector::Only("weekly".into()));
        assert_eq!(query.tag, Selector::Only("presence".into()));
        assert!(query.search.is_empty());
    }

    #[test]
    fn query_from_url_ignores_unknown_category() {
        let query = query_from_url("/journal?cat=gossip", &CATEGORIES);
        assert_eq!(query.category, Selector::All);
        let query = query_from_url("/journal?cat=all", &CATEGORIES);
        assert_eq!(query.category, Selector::All);
    }

    #[test]
    fn query_from_url_keeps_tag_without_validation() {
        let query = query_from_url("/journal?tag=%20stillness%20", &CATEGORIES);
        assert_eq!(query.tag, Selector::Only("stillness".into()));
        let query = query_from_url("/journal?tag=all", &CATEGORIES);
        assert_eq!(query.tag, Selector::All);
    }

    #[test]
    fn sync_url_sets_and_replaces() {
        let desired = Query::all().with_category("feature");
        let update = sync_url("/journal", &desired);
        assert_eq!(update.url, "/journal?cat=feature");
        assert_eq!(update.history, HistoryMode::Replace);
        assert!(update.changed);
    }

    #[test]
    fn sync_url_removes_param_for_all() {
        let update = sync_url("/journal?cat=weekly&ref=home", &Query::all());
        assert_eq!(update.url, "/journal?ref=home");
    }

    #[test]
    fn sync_url_unchanged_when_state_matches() {
        let desired = Query::all().with_category("weekly");
        let update = sync_url("/journal?cat=weekly", &desired);
        assert!(!update.changed);
    }

    #[test]
    fn sync_url_ignores_search() {
        let desired = Query::all().with_search("door");
        let update = sync_url("/journal", &desired);
        assert_eq!(update.url, "/journal");
    }

    #[test]
    fn read_then_sync_round_trips() {
        let url = "/scrolls?tag=presence";
        let query = query_from_url(url, &CATEGORIES);
        assert_eq!(sync_url(url, &query).url, url);
    }
}
