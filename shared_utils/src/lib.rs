use tracing::debug;

/// Query parameter prefix used by campaign tracking links.
pub const TRACKING_PARAM_PREFIX: &str = "utm_";

/// Returns `true` if a query string carries any campaign tracking parameter.
///
/// `search` is the raw `location.search` value, with or without the leading `?`.
#[must_use]
pub fn has_tracking_params(search: &str) -> bool {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split('=').next())
        .any(|name| name.starts_with(TRACKING_PARAM_PREFIX))
}

/// Removes the query string and fragment from a URL or path.
#[must_use]
pub fn strip_query(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    &url[..end]
}

/// Extracts the path component of an absolute or root-relative URL.
///
/// Absolute URLs lose their scheme and authority; the result always starts
/// with `/`.
#[must_use]
pub fn path_of(url: &str) -> &str {
    let without_query = strip_query(url);
    let path = match without_query.find("://") {
        Some(scheme_end) => {
            let rest = &without_query[scheme_end + 3..];
            rest.find('/').map_or("/", |slash| &rest[slash..])
        }
        None => without_query,
    };
    if path.is_empty() {
        debug!(url, "URL has no path component; using root");
        "/"
    } else {
        path
    }
}
