// src/utils/mod.rs

//! Shared helpers.

pub mod http;

use url::Url;

use crate::error::{AppError, Result};

/// Resolve a possibly-relative reference against a base URL.
pub fn resolve_url(base: &str, reference: &str) -> Result<String> {
    let base = Url::parse(base).map_err(|_| AppError::MalformedUrl(base.to_string()))?;
    let resolved = base
        .join(reference)
        .map_err(|_| AppError::MalformedUrl(reference.to_string()))?;
    Ok(resolved.to_string())
}

/// The scheme://host[:port] prefix of a URL, without a trailing slash.
/// Service base paths are resolved against this, not against the
/// catalog document's own path.
pub fn server_base(url: &str) -> Result<String> {
    let parsed = Url::parse(url).map_err(|_| AppError::MalformedUrl(url.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::MalformedUrl(url.to_string()))?;
    let mut base = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        base.push_str(&format!(":{port}"));
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_reference() {
        let resolved = resolve_url("http://x.org/thredds/catalog.xml", "sub/catalog.xml").unwrap();
        assert_eq!(resolved, "http://x.org/thredds/sub/catalog.xml");
    }

    #[test]
    fn test_resolve_absolute_reference_wins() {
        let resolved = resolve_url("http://x.org/thredds/catalog.xml", "http://y.org/c.xml").unwrap();
        assert_eq!(resolved, "http://y.org/c.xml");
    }

    #[test]
    fn test_server_base_strips_path() {
        assert_eq!(
            server_base("http://x.org:8080/thredds/catalog.xml").unwrap(),
            "http://x.org:8080"
        );
        assert_eq!(server_base("https://x.org/a/b").unwrap(), "https://x.org");
    }

    #[test]
    fn test_server_base_rejects_garbage() {
        assert!(server_base("not a url").is_err());
    }
}
