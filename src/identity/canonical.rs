//! URL canonicalization for the `canonical` identity policy

use crate::{UrlError, UrlResult};
use url::Url;

/// Query parameters that never change page content
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "msclkid", "ref"];

/// Rewrites a URL into the canonical form hashed by `IdentityPolicy::Canonical`
///
/// Steps, in order:
///
/// 1. Parse; only `http` and `https` are accepted. The scheme is kept as-is.
/// 2. Lowercase the host and strip a leading `www.`
/// 3. Collapse empty path segments and drop a trailing slash (root stays `/`)
/// 4. Drop the fragment
/// 5. Drop tracking parameters (`utm_*` plus a fixed list), sort the rest by
///    key and then value, and drop an empty query
///
/// Dot segments are already resolved by the URL parser.
///
/// # Examples
///
/// ```
/// use spidey::identity::canonicalize_url;
///
/// let url = canonicalize_url("https://WWW.Example.com/docs/?utm_source=x&b=2&a=1#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs?a=1&b=2");
/// ```
pub fn canonicalize_url(raw: &str) -> UrlResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = url.host_str().ok_or(UrlError::MissingHost)?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("cannot set host '{}': {}", host, e)))?;

    let path = collapse_path(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        params.sort();

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

fn collapse_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
