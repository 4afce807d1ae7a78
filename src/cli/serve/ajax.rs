//! Canned endpoints the served library's ajax unit tests request.

use serde_json::json;
use tiny_http::Method;

use crate::utils::mime::types::{HTML, JSON, XML};

/// Statement the ajax tests evaluate.
const HELLO_SCRIPT: &str = r#"$("content").update("<H2>Hello world!</H2>");"#;

const CONTENT: &str = "Pack my box with <em>five dozen</em> liquor jugs! \
                       Oh, how <strong>quickly</strong> daft jumping zebras vex...";

const HIJACK: &str = "{});window.attacked = true;({}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canned {
    pub content_type: &'static str,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Canned {
    fn html(body: &str) -> Self {
        Self::typed(HTML, body)
    }

    fn typed(content_type: &'static str, body: &str) -> Self {
        Self {
            content_type,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn json(value: serde_json::Value) -> Self {
        Self::typed(JSON, &value.to_string())
    }

    fn header(mut self, field: &'static str, value: &str) -> Self {
        self.headers.push((field, value.to_string()));
        self
    }
}

/// Canned response for `method path`, if any.
pub fn lookup(method: &Method, path: &str) -> Option<Canned> {
    let canned = match (method, path) {
        (Method::Get, "/ajax/hello") => Canned::html(HELLO_SCRIPT),
        (Method::Get, "/ajax/content") => Canned::html(CONTENT),
        (Method::Get | Method::Post, "/ajax/empty") => Canned::html(""),
        (Method::Post, "/tests/test_form.html") => Canned::html("ok"),
        (Method::Get, "/ajax/data" | "/ajax/response" | "/ajax/response/1" | "/ajax/response/3") => {
            Canned::json(json!({ "test": 123 }))
        }
        (Method::Get, "/ajax/response/2") => Canned::html(""),
        (Method::Get, "/ajax/response/4") => Canned::html(r#"{"test":123}"#),
        (Method::Get, "/ajax/response/5" | "/ajax/response/12") => Canned::json(json!(HIJACK)),
        (Method::Get, "/ajax/response/6") => {
            Canned::html("").header("X-JSON", r#"{"test": "hello #éà"}"#)
        }
        (Method::Get, "/ajax/response/7") => Canned::json(json!("")),
        (Method::Get, "/ajax/response/8") => Canned::html("").header("X-TEST", "some value"),
        (Method::Get, "/ajax/response/9") => Canned::html("")
            .header("one", "two")
            .header("three", "four"),
        (Method::Post, "/ajax/response/10") => Canned::json(json!("cool=1&bad=2&cool=3&bad=4")),
        (Method::Get, "/ajax/response/11") => Canned::typed("text/javascript", HELLO_SCRIPT),
        (Method::Get, "/ajax/response/13") => Canned::html("").header("X-JSON", HIJACK),
        (Method::Get, "/ajax/response/14") => Canned::typed(
            XML,
            r#"<?xml version="1.0" encoding="UTF-8" ?><name attr="foo">bar</name>"#,
        ),
        (Method::Get, "/ajax/response/15") => Canned::typed("application/javascript", HELLO_SCRIPT),
        (Method::Post, "/ajax/response/16") => Canned::typed("application/bogus", ""),
        _ => return None,
    };
    Some(canned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_endpoints() {
        let data = lookup(&Method::Get, "/ajax/data").unwrap();
        assert_eq!(data.content_type, JSON);
        assert_eq!(data.body, r#"{"test":123}"#);

        let hijack = lookup(&Method::Get, "/ajax/response/5").unwrap();
        assert_eq!(hijack.body, r#""{});window.attacked = true;({}""#);

        assert_eq!(lookup(&Method::Get, "/ajax/response/7").unwrap().body, r#""""#);
    }

    #[test]
    fn test_header_endpoints() {
        let nine = lookup(&Method::Get, "/ajax/response/9").unwrap();
        assert_eq!(
            nine.headers,
            vec![("one", "two".to_string()), ("three", "four".to_string())]
        );
        assert!(nine.body.is_empty());

        let thirteen = lookup(&Method::Get, "/ajax/response/13").unwrap();
        assert_eq!(thirteen.headers[0], ("X-JSON", HIJACK.to_string()));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(lookup(&Method::Get, "/ajax/response/11").unwrap().content_type, "text/javascript");
        assert_eq!(lookup(&Method::Get, "/ajax/response/14").unwrap().content_type, XML);
        assert_eq!(
            lookup(&Method::Post, "/ajax/response/16").unwrap().content_type,
            "application/bogus"
        );
    }

    #[test]
    fn test_method_matters() {
        assert!(lookup(&Method::Post, "/ajax/empty").is_some());
        assert!(lookup(&Method::Get, "/ajax/empty").is_some());
        assert!(lookup(&Method::Get, "/ajax/response/10").is_none());
        assert!(lookup(&Method::Post, "/ajax/hello").is_none());
        assert_eq!(lookup(&Method::Post, "/tests/test_form.html").unwrap().body, "ok");
        assert!(lookup(&Method::Get, "/tests/test_form.html").is_none());
    }
}
