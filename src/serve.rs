//! Development server.
//!
//! Pages are rendered on demand from the current index snapshot, so content
//! edits show up on the next request without writing HTML to disk.
//!
//! # Request resolution
//!
//! ```text
//! GET /                      ──► 302 /<first language>/
//! GET /en/place/turku/       ──► Route::parse ──► pages::render
//! GET /en/rss.xml            ──► Route::parse ──► rss::render_feed
//! GET /en/place/turku.json   ──┐
//! GET /static/style.css      ──┼► <output dir> (index.html for dirs)
//! GET /fin/turku.1x.jpg      ──┘
//! anything else              ──► 404
//! ```

use crate::{
    config::SiteConfig,
    content::SiteIndex,
    generator::rss,
    log,
    render::{self, PageContext, Route},
};
use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    io::Cursor,
    net::{IpAddr, SocketAddr},
    path::{Component, Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Serve until Ctrl+C.
///
/// Binds to the configured interface and port, retrying higher ports when
/// the port is taken.
pub fn serve_site(config: &SiteConfig, site: &SiteIndex) -> Result<()> {
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("invalid interface `{}`", config.serve.interface))?;

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, config, site) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map_or_else(|| "no attempt made".to_string(), |e| e.to_string())
    ))
}

// ============================================================================
// Request Resolution
// ============================================================================

/// What to answer a request with.
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Html(String),
    Feed(String),
    File(PathBuf),
    Redirect(String),
    NotFound,
}

fn resolve(url: &str, config: &SiteConfig, site: &SiteIndex) -> Reply {
    let url_path = urlencoding::decode(url)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    let path = url_path.split(['?', '#']).next().unwrap_or(&url_path);

    if path.trim_matches('/').is_empty()
        && let Some(lang) = config.build.languages.first()
    {
        return Reply::Redirect(format!("/{lang}/"));
    }

    let feed = config.build.rss.path.to_string_lossy();
    let snapshot = site.snapshot();
    if let Some((lang, route)) = Route::parse(url, &config.build.languages, &feed)
        && let Some(index) = snapshot.language(&lang)
    {
        if route == Route::Feed {
            if !config.build.rss.enable {
                return Reply::NotFound;
            }
            return match rss::render_feed(config, index) {
                Ok(xml) => Reply::Feed(xml),
                Err(err) => {
                    log!("error"; "{err:#}");
                    Reply::NotFound
                }
            };
        }

        let ctx = PageContext {
            config,
            content: &snapshot.content,
            index,
        };
        if let Some(html) = render::render(&ctx, &route) {
            return Reply::Html(html);
        }
    }

    static_file(&config.build.output, path).map_or(Reply::NotFound, Reply::File)
}

/// A file under `root`, `index.html` for directories. Paths climbing out of
/// `root` never match.
fn static_file(root: &Path, request_path: &str) -> Option<PathBuf> {
    let rel = Path::new(request_path.trim_start_matches('/'));
    if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }

    let local = root.join(rel);
    if local.is_file() {
        return Some(local);
    }
    let index = local.join("index.html");
    index.is_file().then_some(index)
}

fn handle_request(request: Request, config: &SiteConfig, site: &SiteIndex) -> Result<()> {
    match resolve(request.url(), config, site) {
        Reply::Html(html) => respond(request, 200, "text/html; charset=utf-8", html.into_bytes()),
        Reply::Feed(xml) => respond(request, 200, "application/rss+xml; charset=utf-8", xml.into_bytes()),
        Reply::File(path) => {
            let content = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            respond(request, 200, guess_content_type(&path), content)
        }
        Reply::Redirect(location) => {
            let response = Response::empty(StatusCode(302)).with_header(header("Location", &location)?);
            request.respond(response)?;
            Ok(())
        }
        Reply::NotFound => respond(request, 404, "text/plain", b"404 Not Found".to_vec()),
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name, value).map_err(|()| anyhow!("invalid header `{name}: {value}`"))
}

fn respond(request: Request, status: u16, content_type: &str, body: Vec<u8>) -> Result<()> {
    let length = body.len();
    let response = Response::new(
        StatusCode(status),
        vec![header("Content-Type", content_type)?],
        Cursor::new(body),
        Some(length),
        None,
    );
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("map") => "application/json; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        Some("txt") => "text/plain; charset=utf-8",

        _ => "application/octet-stream",
    }
}

// ============================================================================
// Tests
// ============================================================================
