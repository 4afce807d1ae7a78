//! Template rendering seam.
//!
//! Templates reference context fields as `{{ field }}` or `<%= field %>`.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use super::context::TestContext;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("unknown template field `{field}` at byte {offset}")]
    UnknownField { field: String, offset: usize },

    #[error("invalid placeholder pattern: {0}")]
    Pattern(String),
}

/// Renders a template source against a [`TestContext`].
pub trait TemplateEngine: Send + Sync {
    fn render(&self, source: &str, ctx: &TestContext) -> Result<String, RenderError>;

    /// Check that `source` only references known fields.
    fn check(&self, source: &str) -> Result<(), RenderError> {
        self.render(source, &TestContext::default()).map(|_| ())
    }
}

/// Substitutes `{{ field }}` and `<%= field %>` placeholders. Values are
/// inserted raw; everything else passes through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderEngine;

/// ASCII classes only: the regex crate is built without unicode tables.
fn placeholder_regex() -> Result<&'static Regex, RenderError> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\{\{[ \t\r\n]*([A-Za-z_][A-Za-z0-9_]*)[ \t\r\n]*\}\}|<%=[ \t\r\n]*([A-Za-z_][A-Za-z0-9_]*)[ \t\r\n]*%>",
        )
    })
    .as_ref()
    .map_err(|e| RenderError::Pattern(e.to_string()))
}

impl TemplateEngine for PlaceholderEngine {
    fn render(&self, source: &str, ctx: &TestContext) -> Result<String, RenderError> {
        let mut out = String::with_capacity(source.len());
        let mut last = 0;

        for caps in placeholder_regex()?.captures_iter(source) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2)))
            else {
                continue;
            };
            let value = ctx.get(name.as_str()).ok_or_else(|| RenderError::UnknownField {
                field: name.as_str().to_string(),
                offset: whole.start(),
            })?;

            out.push_str(&source[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }

        out.push_str(&source[last..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TestContext {
        let mut ctx = TestContext::new("Ajax test".into(), "tmp/ajax_test.js");
        ctx.push_markup("<p>fixture</p>");
        ctx
    }

    #[test]
    fn test_mustache_placeholders() {
        let out = PlaceholderEngine
            .render("<title>{{ title }}</title>{{html}}", &ctx())
            .unwrap();
        assert_eq!(out, "<title>Ajax test</title><p>fixture</p>");
    }

    #[test]
    fn test_erb_placeholders() {
        let out = PlaceholderEngine
            .render("<title><%= title %></title><%=test_file%>", &ctx())
            .unwrap();
        assert_eq!(
            out,
            "<title>Ajax test</title><script type='text/javascript' src='tmp/ajax_test.js'></script>"
        );
    }

    #[test]
    fn test_empty_fields_render_empty() {
        let out = PlaceholderEngine.render("[{{ css }}][{{ logo }}]", &ctx()).unwrap();
        assert_eq!(out, "[][]");
    }

    #[test]
    fn test_unknown_field() {
        let err = PlaceholderEngine.render("ab{{ nope }}", &ctx()).unwrap_err();
        assert_eq!(
            err,
            RenderError::UnknownField {
                field: "nope".into(),
                offset: 2
            }
        );
    }

    #[test]
    fn test_values_are_not_reinterpreted() {
        let mut ctx = ctx();
        ctx.title = "{{ nope }}".into();
        let out = PlaceholderEngine.render("{{ title }}", &ctx).unwrap();
        assert_eq!(out, "{{ nope }}");
    }

    #[test]
    fn test_placeholder_pattern_compiles() {
        let re = placeholder_regex().unwrap();
        assert!(re.is_match("{{\ttest_file\n}}"));
        assert!(re.is_match("<%=css%>"));
        assert!(!re.is_match("{{ not-a-field }}"));
    }

    #[test]
    fn test_check() {
        assert!(PlaceholderEngine.check("{{ css }}<%= js %>").is_ok());
        assert!(PlaceholderEngine.check("<%= helper %>").is_err());
    }
}
