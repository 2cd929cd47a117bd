use url::Url;

/// A URL split into the two keys of the origin index.
///
/// Both halves keep the text exactly as crawled; only the scheme is
/// lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    /// `scheme://authority`
    pub origin: String,
    /// Path starting with `/`
    pub path: String,
}

/// Split an absolute URL into origin and path.
///
/// Returns `None` for unparsable URLs, URLs without a host and URLs that
/// carry a query string; none of those can be tracked by path. The parse
/// only validates: hosts are not lowercased, paths are not percent-encoded
/// or resolved, and default ports are not dropped.
pub fn split_url(raw: &str) -> Option<UrlParts> {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains('?') {
        return None;
    }
    let url = Url::parse(raw).ok()?;
    url.host_str()?;

    let (_, rest) = raw.split_once("://")?;
    let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, "/"),
    };
    if authority.is_empty() {
        return None;
    }
    Some(UrlParts {
        origin: format!("{}://{}", url.scheme(), authority),
        path: path.to_string(),
    })
}

/// Final `/`-separated segment of a path.
pub fn filename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Number of `/`-separated segments, counting the empty one before the
/// leading slash.
pub fn segment_count(path: &str) -> usize {
    path.split('/').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_origin_and_path() {
        let parts = split_url("https://cdn.example/v/1.2.3/app.js").expect("parts");
        assert_eq!(parts.origin, "https://cdn.example");
        assert_eq!(parts.path, "/v/1.2.3/app.js");
    }

    #[test]
    fn keeps_explicit_ports() {
        let parts = split_url("http://static.example:8080/a.css").expect("parts");
        assert_eq!(parts.origin, "http://static.example:8080");
        let parts = split_url("https://static.example:443/a.css").expect("parts");
        assert_eq!(parts.origin, "https://static.example:443");
    }

    #[test]
    fn keeps_crawled_text_verbatim() {
        let parts = split_url("HTTPS://CDN.Example/lib/../Fonts/My%20Font.woff#x").expect("parts");
        assert_eq!(parts.origin, "https://CDN.Example");
        assert_eq!(parts.path, "/lib/../Fonts/My%20Font.woff");

        let parts = split_url("https://cdn.example").expect("parts");
        assert_eq!(parts.path, "/");
    }

    #[test]
    fn rejects_queries_and_relative_urls() {
        assert!(split_url("https://cdn.example/app.js?v=1").is_none());
        assert!(split_url("/relative/app.js").is_none());
        assert!(split_url("").is_none());
        assert!(split_url("data:text/plain,hello").is_none());
    }

    #[test]
    fn filename_and_segments() {
        assert_eq!(filename("/v/1.2.3/app.js"), "app.js");
        assert_eq!(filename("/"), "");
        assert_eq!(segment_count("/v/1.2.3/app.js"), 4);
        assert_eq!(segment_count("/app.js"), 2);
    }
}
