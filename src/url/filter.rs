use crate::url::host_of;
use regex::Regex;
use std::collections::HashSet;

/// Suffixes of links that never lead to crawlable pages
const SKIPPED_SUFFIXES: &[&str] = &[".pdf", ".jpg", ".png", ".gif"];

/// Decides which discovered links a deep crawl may follow
///
/// A link survives when, in order:
/// 1. its host equals the host of the page it was found on
/// 2. it fully matches the link pattern, if one is set
/// 3. it has no `#` and does not end in `.pdf`, `.jpg`, `.png` or `.gif`
/// 4. it has not already been kept (first occurrence wins)
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    pattern: Option<Regex>,
}

impl LinkFilter {
    /// Builds a filter; `pattern` must match a whole link, not a substring
    pub fn new(pattern: Option<&str>) -> Result<Self, regex::Error> {
        let pattern = pattern.map(Self::compile_pattern).transpose()?;
        Ok(Self { pattern })
    }

    /// Compiles `pattern` in the whole-link form the filter matches with
    ///
    /// Config and CLI validation go through here so that anything they
    /// accept also builds a filter.
    pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
        Regex::new(&format!("^(?:{})$", pattern))
    }

    /// Filters `links` found on `page_url`, preserving discovery order
    ///
    /// # Examples
    ///
    /// ```
    /// use gleaner::url::LinkFilter;
    ///
    /// let filter = LinkFilter::new(None).unwrap();
    /// let links = vec![
    ///     "https://example.com/b".to_string(),
    ///     "https://other.com/c".to_string(),
    ///     "https://example.com/report.pdf".to_string(),
    ///     "https://example.com/b".to_string(),
    /// ];
    /// let kept = filter.filter(&links, "https://example.com/a");
    /// assert_eq!(kept, vec!["https://example.com/b".to_string()]);
    /// ```
    pub fn filter(&self, links: &[String], page_url: &str) -> Vec<String> {
        let page_host = host_of(page_url);
        let mut seen = HashSet::new();

        links
            .iter()
            .filter(|link| {
                if host_of(link) != page_host {
                    tracing::trace!("Dropping cross-site link {}", link);
                    return false;
                }
                if !self.matches_pattern(link) {
                    tracing::trace!("Dropping link outside pattern {}", link);
                    return false;
                }
                !is_non_content(link)
            })
            .filter(|link| seen.insert(link.as_str()))
            .cloned()
            .collect()
    }

    fn matches_pattern(&self, link: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(true, |pattern| pattern.is_match(link))
    }
}

/// Returns true for fragment links and common binary/media files
fn is_non_content(link: &str) -> bool {
    link.contains('#') || SKIPPED_SUFFIXES.iter().any(|suffix| link.ends_with(suffix))
}
