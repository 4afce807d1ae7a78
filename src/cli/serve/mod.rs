//! Development server: index page, redirects to generated test pages,
//! canned ajax endpoints and static files from the public directory.

mod ajax;
mod lifecycle;
mod listing;
mod path;
mod response;

use crate::{config::ProjectConfig, log, state, watch::WatchSession};
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Method, Request, Server};

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

/// Bind the HTTP server and register it for Ctrl+C shutdown.
pub fn bind_server(config: &ProjectConfig) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    state::register_server(Arc::clone(&server));

    Ok(BoundServer { server, addr })
}

impl BoundServer {
    /// Request loop (blocking until shutdown).
    pub fn run(self, config: Arc<ProjectConfig>) -> Result<()> {
        log!("serve"; "http://{}", self.addr);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(4)
            .thread_name(|i| format!("testbed-http-{i}"))
            .build()?;

        for request in self.server.incoming_requests() {
            let config = Arc::clone(&config);
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &config) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
        Ok(())
    }
}

/// `testbed serve`: build, watch, serve until Ctrl+C, then clean up.
pub fn serve(config: ProjectConfig) -> Result<()> {
    let config = Arc::new(config);

    // Requests queue until the initial build is done.
    let bound = bind_server(&config)?;
    let mut session = WatchSession::start_with(&config, config.serve.watch)?;

    if !state::is_shutdown() {
        bound.run(Arc::clone(&config))?;
    }

    session.stop()?;
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &ProjectConfig) -> Result<()> {
    if state::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let path = path::request_path(request.url());
    let method = request.method().clone();

    if let Some(canned) = ajax::lookup(&method, &path) {
        return response::respond_canned(request, canned);
    }

    if !matches!(method, Method::Get | Method::Head) {
        return response::respond_not_found(request);
    }

    if path == "/" {
        let entries = listing::entries(&config.paths.tests)?;
        return response::respond_html(request, listing::render(&entries));
    }

    if let Some(name) = path.strip_prefix("/test/") {
        return match redirect_target(name, &config.paths.output_url()) {
            Some(location) => response::respond_redirect(request, &location),
            None => response::respond_not_found(request),
        };
    }

    match path::resolve_path(&path, &config.paths.public) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request),
    }
}

/// `/test/<name>` → `<output url>/test_<name>.html`
fn redirect_target(name: &str, output_url: &str) -> Option<String> {
    let name = name.trim_end_matches('/');
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return None;
    }
    let base = output_url.trim_end_matches('/');
    Some(format!("{base}/{}", crate::suite::output_file_name(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_project;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::TcpStream;

    /// Send one raw request through `handle_request` and return the raw response.
    fn exchange(config: ProjectConfig, method: &str, url: &str) -> String {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = std::thread::spawn(move || {
            let request = server.recv().unwrap();
            handle_request(request, &config).unwrap();
        });

        let mut stream = TcpStream::connect(addr).unwrap();
        write!(
            stream,
            "{method} {url} HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        )
        .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        handle.join().unwrap();
        response
    }

    #[test]
    fn test_index_lists_modules() {
        let (_temp, config) = test_project();
        fs::write(config.paths.tests.join("ajax_request_test.js"), "").unwrap();

        let response = exchange(config, "GET", "/");
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("<a href=\"/test/ajax\">Ajax request test</a>"));
    }

    #[test]
    fn test_test_route_redirects() {
        let (_temp, config) = test_project();
        let response = exchange(config, "GET", "/test/ajax");
        assert!(response.starts_with("HTTP/1.1 302"));
        assert!(response.contains("Location: /tests/test_ajax.html"));
    }

    #[test]
    fn test_static_file_and_not_found() {
        let (_temp, config) = test_project();
        fs::create_dir_all(&config.paths.output).unwrap();
        fs::write(config.paths.output.join("test_ajax.html"), "<p>page</p>").unwrap();

        let response = exchange(config.clone(), "GET", "/tests/test_ajax.html?cache=1");
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("text/html"));
        assert!(response.ends_with("<p>page</p>"));

        let response = exchange(config, "GET", "/tests/test_dom.html");
        assert!(response.starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn test_canned_post() {
        let (_temp, config) = test_project();
        let response = exchange(config.clone(), "POST", "/tests/test_form.html");
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("ok"));

        let response = exchange(config, "POST", "/somewhere");
        assert!(response.starts_with("HTTP/1.1 404"));
    }

    #[test]
    fn test_canned_headers() {
        let (_temp, config) = test_project();
        let response = exchange(config, "GET", "/ajax/response/8");
        assert!(response.contains("X-TEST: some value"));
    }

    #[test]
    fn test_redirect_target() {
        assert_eq!(
            redirect_target("ajax", "/tests").as_deref(),
            Some("/tests/test_ajax.html")
        );
        assert_eq!(
            redirect_target("dom/", "/").as_deref(),
            Some("/test_dom.html")
        );
        assert!(redirect_target("", "/tests").is_none());
        assert!(redirect_target("../etc", "/tests").is_none());
        assert!(redirect_target("a/b", "/tests").is_none());
    }
}
