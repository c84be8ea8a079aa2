// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Turn an extracted `href` into a canonical link.
///
/// Absolute URLs and relative ones resolved against `base` go through the
/// same serializer, so a posting printed either way yields one string:
/// `/job/1` becomes `{origin}/job/1`, hosts are lowercased, default ports
/// dropped and paths percent-encoded. Blank and fragment-only hrefs carry
/// no link and yield `None`.
///
/// # Examples
/// ```
/// use internscout::utils::url::normalize_link;
/// use url::Url;
///
/// let base = Url::parse("https://jobhub.lk/en/search?q=intern").unwrap();
/// assert_eq!(
///     normalize_link(Some(&base), "/en/job/42").as_deref(),
///     Some("https://jobhub.lk/en/job/42")
/// );
/// ```
pub fn normalize_link(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    // Already absolute
    if let Ok(url) = Url::parse(href) {
        return Some(url.to_string());
    }

    match base {
        Some(base) => Some(
            base.join(href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| href.to_string()),
        ),
        None => Some(href.to_string()),
    }
}

/// Whether `link` is an absolute http(s) URL with a host.
pub fn is_absolute_http(link: &str) -> bool {
    Url::parse(link)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}
