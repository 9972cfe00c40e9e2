use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (e.g. `mailto:` or `data:` URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use gleaner::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the host of a URL string, or an empty string when it cannot be parsed
///
/// Unparsable and host-less URLs share the empty host, so they only ever match
/// each other in same-site comparisons.
///
/// # Examples
///
/// ```
/// use gleaner::url::host_of;
///
/// assert_eq!(host_of("https://example.com/a"), "example.com");
/// assert_eq!(host_of("not a url"), "");
/// ```
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| extract_domain(&parsed))
        .unwrap_or_default()
}
