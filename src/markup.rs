//! Item bodies → HTML.
//!
//! HTML bodies are authored markup and pass through untouched. Markdown bodies
//! go through pulldown-cmark with raw HTML escaped, so a markdown body can
//! never inject tags. Items without a body fall back to their summary, then
//! to a placeholder line.

use crate::types::Body;
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Event, Options, Parser, html as md_html};

/// Render markdown to HTML, escaping any inline or block HTML in the source.
pub fn markdown_to_html(source: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(source, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Render markdown without escaping, for site-owned pages such as `about.md`.
pub fn trusted_markdown_to_html(source: &str) -> String {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(source));
    out
}

/// The body block of a detail page.
pub fn render_body(body: Option<&Body>, summary: Option<&str>, placeholder: &str) -> Markup {
    match body {
        Some(Body::Html(source)) => html! { (PreEscaped(source)) },
        Some(Body::Markdown(source)) => html! { (PreEscaped(markdown_to_html(source))) },
        None => match summary.filter(|s| !s.trim().is_empty()) {
            Some(summary) => html! { p { (summary) } },
            None => html! { p.placeholder { (placeholder) } },
        },
    }
}
