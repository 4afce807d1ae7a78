//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! extensions = ["js", "css", "html"]   # only these trigger a rebuild/regenerate
//! debounce_ms = 300                    # quiet period before a batch is delivered
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// File extensions (without the dot) that are reported.
    pub extensions: Vec<String>,

    /// Quiet period in milliseconds.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["js".into(), "css".into(), "html".into()],
            debounce_ms: 300,
        }
    }
}

impl WatchConfig {
    /// Normalize user input: strip leading dots, lowercase.
    pub fn normalize(&mut self) {
        for ext in &mut self.extensions {
            *ext = ext.trim_start_matches('.').to_ascii_lowercase();
        }
        self.extensions.retain(|e| !e.is_empty());
    }

    /// Whether a path passes the extension filter.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_watch_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.watch.extensions, vec!["js", "css", "html"]);
        assert_eq!(config.watch.debounce_ms, 300);
    }

    #[test]
    fn test_normalize_strips_dots() {
        let mut watch = WatchConfig {
            extensions: vec![".JS".into(), "css".into(), ".".into()],
            debounce_ms: 100,
        };
        watch.normalize();
        assert_eq!(watch.extensions, vec!["js", "css"]);
    }

    #[test]
    fn test_accepts() {
        let watch = WatchConfig::default();
        assert!(watch.accepts(Path::new("/repo/src/ajax.js")));
        assert!(watch.accepts(Path::new("/repo/test/unit/fixtures/ajax.CSS")));
        assert!(!watch.accepts(Path::new("/repo/test/unit/fixtures/logo.gif")));
        assert!(!watch.accepts(Path::new("/repo/src/README")));
    }
}
