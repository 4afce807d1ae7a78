//! Values handed to the page template.

/// Link tag for a staged stylesheet.
pub fn to_css(reference: &str) -> String {
    format!("<link rel='stylesheet' type='text/css' href='{reference}'>")
}

/// Script tag for a staged script (or image, see [`TestContext::push_logo`]).
pub fn to_js(reference: &str) -> String {
    format!("<script type='text/javascript' src='{reference}'></script>")
}

/// The six fields a test page template can reference.
///
/// Built fresh for every generated page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestContext {
    pub css: String,
    pub html: String,
    pub js: String,
    pub logo: String,
    pub test_file: String,
    pub title: String,
}

impl TestContext {
    pub const FIELDS: [&'static str; 6] = ["css", "html", "js", "logo", "test_file", "title"];

    pub fn new(title: String, test_file_ref: &str) -> Self {
        Self {
            title,
            test_file: to_js(test_file_ref),
            ..Self::default()
        }
    }

    pub fn push_stylesheet(&mut self, reference: &str) {
        self.css.push_str(&to_css(reference));
    }

    pub fn push_script(&mut self, reference: &str) {
        self.js.push_str(&to_js(reference));
    }

    /// Images are referenced with script tags. The served library's tests
    /// only need the request to happen.
    pub fn push_logo(&mut self, reference: &str) {
        self.logo.push_str(&to_js(reference));
    }

    /// Markup fragments are inlined verbatim.
    pub fn push_markup(&mut self, markup: &str) {
        self.html.push_str(markup);
    }

    /// Look up a field by its template name.
    pub fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            "css" => &self.css,
            "html" => &self.html,
            "js" => &self.js,
            "logo" => &self.logo,
            "test_file" => &self.test_file,
            "title" => &self.title,
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        assert_eq!(
            to_css("tmp/ajax.css"),
            "<link rel='stylesheet' type='text/css' href='tmp/ajax.css'>"
        );
        assert_eq!(
            to_js("tmp/ajax_test.js"),
            "<script type='text/javascript' src='tmp/ajax_test.js'></script>"
        );
    }

    #[test]
    fn test_push_concatenates_in_order() {
        let mut ctx = TestContext::new("Ajax test".into(), "tmp/ajax_test.js");
        ctx.push_stylesheet("tmp/a.css");
        ctx.push_stylesheet("tmp/b.css");
        ctx.push_logo("tmp/ajax_logo.gif");
        ctx.push_markup("<div id='content'></div>");

        assert_eq!(ctx.css, format!("{}{}", to_css("tmp/a.css"), to_css("tmp/b.css")));
        assert_eq!(ctx.logo, to_js("tmp/ajax_logo.gif"));
        assert_eq!(ctx.html, "<div id='content'></div>");
        assert_eq!(ctx.test_file, to_js("tmp/ajax_test.js"));
        assert!(ctx.js.is_empty());
    }

    #[test]
    fn test_own_script_only_in_test_file() {
        let mut ctx = TestContext::new("Ajax test".into(), "tmp/ajax_test.js");
        ctx.push_script("tmp/ajax_helper.js");

        assert_eq!(ctx.js, to_js("tmp/ajax_helper.js"));
        assert!(!ctx.js.contains("ajax_test.js"));
        assert_eq!(ctx.test_file, to_js("tmp/ajax_test.js"));
    }

    #[test]
    fn test_get_every_field() {
        let ctx = TestContext::new("Dom test".into(), "tmp/dom_test.js");
        for field in TestContext::FIELDS {
            assert!(ctx.get(field).is_some(), "{field}");
        }
        assert_eq!(ctx.get("title"), Some("Dom test"));
        assert_eq!(ctx.get("body"), None);
    }
}
