//! Index page: one entry per discovered test script.

use std::{io, path::Path};

use crate::{
    embed::serve::{INDEX_HTML, IndexVars},
    suite::discover_modules,
    utils::html::escape,
};

/// `{url: moduleName, name: humanizedName}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub url: String,
    pub name: String,
}

pub fn entries(tests_dir: &Path) -> io::Result<Vec<ListingEntry>> {
    Ok(discover_modules(tests_dir)?
        .into_iter()
        .map(|module| ListingEntry {
            name: module.display_name(),
            url: module.name,
        })
        .collect())
}

pub fn render(entries: &[ListingEntry]) -> String {
    let items = if entries.is_empty() {
        "<li class=\"empty\">no test scripts found</li>".to_string()
    } else {
        entries
            .iter()
            .map(|entry| {
                format!(
                    "<li><a href=\"/test/{}\">{}</a></li>",
                    escape(&entry.url),
                    escape(&entry.name)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    INDEX_HTML.render(&IndexVars {
        title: "Unit tests",
        version: env!("CARGO_PKG_VERSION"),
        entries: &items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_entries() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ajax_request_test.js"), "").unwrap();
        fs::write(temp.path().join("dom_test.js"), "").unwrap();

        let entries = entries(temp.path()).unwrap();
        assert_eq!(
            entries,
            vec![
                ListingEntry {
                    url: "ajax".into(),
                    name: "Ajax request test".into()
                },
                ListingEntry {
                    url: "dom".into(),
                    name: "Dom test".into()
                },
            ]
        );
    }

    #[test]
    fn test_render_links_and_escapes() {
        let html = render(&[ListingEntry {
            url: "a<b".into(),
            name: "A<b test".into(),
        }]);
        assert!(html.contains("<a href=\"/test/a&lt;b\">A&lt;b test</a>"));
    }

    #[test]
    fn test_render_empty() {
        assert!(render(&[]).contains("no test scripts found"));
    }
}
