//! HTML parser for extracting text, links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - The page title and a whitespace-normalized text rendering
//! - Links (from `<a>` tags), resolved against the page URL
//! - Text under CSS selectors, singly or as a key → selector map
//! - A "main content" rendering with navigation and boilerplate removed

use crate::crawler::types::StructuredData;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Elements whose text never reaches a plain-text rendering
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements removed before the main-content heuristic runs
const BOILERPLATE_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside",
];

/// Containers preferred by the main-content heuristic, in order
const MAIN_CONTENT_SELECTOR: &str = "main, article, .content, #content";

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Whitespace-normalized text of the whole document
    pub text: String,

    /// All links found on the page (absolute URLs)
    pub links: Vec<String>,
}

/// Parses HTML content and extracts title, text and links
///
/// # Example
///
/// ```
/// use gleaner::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        text: render_text(document.root_element(), NON_TEXT_ELEMENTS),
        links: collect_links(&document, base_url),
    }
}

/// Extracts all anchor links from HTML, resolved against `base_url`
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    collect_links(&Html::parse_document(html), base_url)
}

/// Returns the text of the first element matching `css_selector`
///
/// Returns an empty string when nothing matches or the selector is invalid.
pub fn select_text(html: &str, css_selector: &str) -> String {
    let Some(selector) = parse_selector(css_selector) else {
        return String::new();
    };

    Html::parse_document(html)
        .select(&selector)
        .next()
        .map(|element| render_text(element, NON_TEXT_ELEMENTS))
        .unwrap_or_default()
}

/// Extracts text for every key of a key → selector map
///
/// Keys whose selector matches nothing (or does not parse) are omitted.
pub fn select_map(html: &str, selectors: &BTreeMap<String, String>) -> StructuredData {
    let document = Html::parse_document(html);
    let mut data = StructuredData::new();

    for (key, css_selector) in selectors {
        let Some(selector) = parse_selector(css_selector) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            data.insert(
                key.clone(),
                render_text(element, NON_TEXT_ELEMENTS).into(),
            );
        }
    }

    data
}

/// Extracts the main readable content of a page
///
/// Script, style, navigation, header, footer and aside elements are dropped.
/// The first `main`, `article`, `.content` or `#content` container outside of
/// those elements wins; otherwise the whole body is used.
pub fn extract_main_content(html: &str) -> String {
    let document = Html::parse_document(html);

    if let Some(selector) = parse_selector(MAIN_CONTENT_SELECTOR) {
        let container = document
            .select(&selector)
            .find(|element| !inside_any(*element, BOILERPLATE_ELEMENTS));
        if let Some(container) = container {
            return render_text(container, BOILERPLATE_ELEMENTS);
        }
    }

    let body = parse_selector("body").and_then(|selector| document.select(&selector).next());
    match body {
        Some(body) => render_text(body, BOILERPLATE_ELEMENTS),
        None => render_text(document.root_element(), BOILERPLATE_ELEMENTS),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn collect_links(document: &Html, base_url: &Url) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

fn parse_selector(css_selector: &str) -> Option<Selector> {
    match Selector::parse(css_selector) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!("Invalid CSS selector '{}': {}", css_selector, e);
            None
        }
    }
}

/// Renders the text under `root`, skipping anything inside `skipped` elements
///
/// Runs of whitespace collapse to a single space.
fn render_text(root: ElementRef<'_>, skipped: &[&str]) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in root.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root.id())
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|element| skipped.contains(&element.name()));
        if !hidden {
            parts.push(&**text);
        }
    }

    parts
        .iter()
        .flat_map(|part| part.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns true if `element` or any of its ancestors is one of `names`
fn inside_any(element: ElementRef<'_>, names: &[&str]) -> bool {
    names.contains(&element.value().name())
        || element
            .ancestors()
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|ancestor| names.contains(&ancestor.name()))
}
