//! Endpoint resolution: joins a base URL with a relative API path.

use crate::errors::{AtlassianError, AtlassianResult};
use url::Url;

/// Parses and checks a base URL.
///
/// The URL must be absolute and hierarchical (`https://host/...`).
pub fn parse_base(base: &str) -> AtlassianResult<Url> {
    let url = Url::parse(base).map_err(|e| {
        AtlassianError::invalid_url(format!("invalid base URL {:?}: {}", base, e)).with_cause(e)
    })?;

    if url.cannot_be_a_base() || url.host().is_none() {
        return Err(AtlassianError::invalid_url(format!(
            "base URL {:?} must be an absolute http(s) URL",
            base
        )));
    }

    Ok(url)
}

/// Resolves `relative` against `base`.
///
/// The resulting path is the base path followed by the relative path, with
/// exactly one `/` between them whether or not the base ends in a slash or
/// the relative path starts with one. The query is the relative path's query
/// string, kept verbatim so parameters are neither reordered nor duplicated.
pub fn resolve(base: &Url, relative: &str) -> AtlassianResult<Url> {
    if base.cannot_be_a_base() {
        return Err(AtlassianError::invalid_url(format!(
            "base URL {} cannot carry a path",
            base
        )));
    }

    check_relative(relative)?;

    let (path, query) = match relative.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (relative, None),
    };

    let mut url = base.clone();
    url.set_fragment(None);

    let relative_path = path.trim_start_matches('/');
    if !relative_path.is_empty() {
        let joined = format!("{}/{}", base.path().trim_end_matches('/'), relative_path);
        url.set_path(&joined);
    }
    url.set_query(query);

    Ok(url)
}

fn check_relative(relative: &str) -> AtlassianResult<()> {
    if Url::parse(relative).is_ok() {
        return Err(AtlassianError::invalid_url(format!(
            "expected a relative path, got absolute URL {:?}",
            relative
        )));
    }

    if relative.starts_with("//") {
        return Err(AtlassianError::invalid_url(format!(
            "expected a relative path, got network-path reference {:?}",
            relative
        )));
    }

    if relative.contains('#') {
        return Err(AtlassianError::invalid_url(format!(
            "relative path {:?} must not carry a fragment",
            relative
        )));
    }

    let path = relative.split_once('?').map_or(relative, |(path, _)| path);
    if path.split(['/', '\\']).any(is_dot_segment) {
        return Err(AtlassianError::invalid_url(format!(
            "relative path {:?} must not contain dot segments",
            relative
        )));
    }

    // Any reference that fails against a neutral base is malformed.
    let neutral = Url::parse("http://localhost/").map_err(|e| {
        AtlassianError::invalid_url(format!("neutral base URL rejected: {}", e)).with_cause(e)
    })?;
    neutral.join(relative).map_err(|e| {
        AtlassianError::invalid_url(format!("invalid relative path {:?}: {}", relative, e))
            .with_cause(e)
    })?;

    Ok(())
}

/// `.` and `..`, including their percent-encoded spellings, which URL
/// normalization would collapse into the base path.
fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "." | ".." | "%2e" | ".%2e" | "%2e." | "%2e%2e"
    )
}
