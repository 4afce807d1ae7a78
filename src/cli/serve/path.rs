//! URL to filesystem path resolution.

use std::path::{Path, PathBuf};

/// Resolve a request path to a file under `serve_root`, handling
/// `index.html` for directories. Anything escaping the root is rejected.
pub fn resolve_path(url_path: &str, serve_root: &Path) -> Option<PathBuf> {
    let clean = url_path.trim_matches('/');

    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = serve_root.join(clean);

    // symlinks may still point outside the root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Percent-decoded request path without the query string.
pub fn request_path(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default()
}
