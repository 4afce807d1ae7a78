//! HTTP response handlers.

use super::ajax::Canned;
use crate::{debug, utils::mime::types::{HTML, PLAIN}};
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tiny_http::{Header, Method, Request, Response, StatusCode};

/// Respond with a static file.
pub fn respond_file(request: Request, path: &Path) -> Result<()> {
    let content_type = crate::utils::mime::from_path(path);

    if is_head_request(&request) {
        return send_head(request, 200, content_type);
    }

    let body = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    send_body(request, 200, content_type, body)
}

/// Respond with a rendered HTML page.
pub fn respond_html(request: Request, body: String) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 200, HTML);
    }
    send_body(request, 200, HTML, body.into_bytes())
}

/// Respond with `302 Found`.
pub fn respond_redirect(request: Request, location: &str) -> Result<()> {
    let location = Header::from_bytes("Location", location.as_bytes())
        .map_err(|()| anyhow::anyhow!("invalid redirect location: {location}"))?;
    let response = Response::empty(StatusCode(302)).with_header(location);
    request.respond(response)?;
    Ok(())
}

/// Respond with a canned body for the served library's ajax tests.
pub fn respond_canned(request: Request, canned: Canned) -> Result<()> {
    let mut response = Response::from_data(canned.body.into_bytes())
        .with_status_code(StatusCode(200))
        .with_header(make_header("Content-Type", canned.content_type));

    for (field, value) in &canned.headers {
        match Header::from_bytes(field.as_bytes(), value.as_bytes()) {
            Ok(header) => response.add_header(header),
            // tiny_http only sends ASCII header values
            Err(()) => debug!("serve"; "skipping non-ascii header {}: {}", field, value),
        }
    }

    request.respond(response)?;
    Ok(())
}

/// Respond with 404.
pub fn respond_not_found(request: Request) -> Result<()> {
    if is_head_request(&request) {
        return send_head(request, 404, PLAIN);
    }
    send_body(request, 404, PLAIN, b"404 Not Found".to_vec())
}

/// Respond with 503 Service Unavailable (server shutting down).
pub fn respond_unavailable(request: Request) -> Result<()> {
    send_body(request, 503, PLAIN, b"503 Service Unavailable".to_vec())
}

fn is_head_request(request: &Request) -> bool {
    request.method() == &Method::Head
}

fn send_head(request: Request, status: u16, content_type: &'static str) -> Result<()> {
    let response =
        Response::empty(StatusCode(status)).with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

fn send_body(
    request: Request,
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> Result<()> {
    let response = Response::from_data(body)
        .with_status_code(StatusCode(status))
        .with_header(make_header("Content-Type", content_type));
    request.respond(response)?;
    Ok(())
}

/// Header from static ASCII parts.
fn make_header(key: &'static str, value: &'static str) -> Header {
    Header::from_bytes(key, value).expect("static header is ascii")
}
