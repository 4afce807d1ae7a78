//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server pages (index.html)
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{INDEX_HTML, IndexVars};
//!
//! let html = INDEX_HTML.render(&IndexVars { title: "Unit tests", version, entries: &items });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for index.html.
    pub struct IndexVars<'a> {
        pub title: &'a str,
        pub version: &'a str,
        /// Pre-rendered `<li>` items.
        pub entries: &'a str,
    }

    impl TemplateVars for IndexVars<'_> {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TITLE__", self.title)
                .replace("__VERSION__", self.version)
                .replace("__ENTRIES__", self.entries)
        }
    }

    /// Test module listing served at `/`.
    pub const INDEX_HTML: Template<IndexVars<'static>> =
        Template::new(include_str!("serve/index.html"));
}
