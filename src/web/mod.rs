//! Local dashboard server.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that:
//! - renders the dashboard page server-side on `GET /`
//! - keeps the pending install offer behind `/api/install/*`
//! - forwards every other request to the exported dashboard origin through
//!   the offline cache proxy
//!
//! Launched via `paceboard serve` (default: `http://127.0.0.1:9747`).

mod api;
pub mod host;

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::chart::svg::SvgSurface;
use crate::config::{self, PaceboardConfig};
use crate::dashboard::page::{self, PageOptions};
use crate::dashboard::{ChartPalette, ChartSurfaces, Dashboard, DeferredSlot, InstallOffer};
use crate::logging;
use crate::proxy::{DiskStore, UreqNetwork};

use host::{LiveProxy, ProxyHost, live_proxy};

pub(crate) type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Server state
// ---------------------------------------------------------------------------

/// Everything the request loop needs between requests.
pub(crate) struct AppState {
    config: PaceboardConfig,
    host: ProxyHost<UreqNetwork, DiskStore>,
    install: DeferredSlot<InstallOffer>,
    dashboard: Dashboard<SvgSurface>,
}

fn new_dashboard(config: &PaceboardConfig) -> Result<Dashboard<SvgSurface>> {
    Ok(Dashboard::new(
        config::data_url(&config.source)?,
        ChartSurfaces::from_ids(SvgSurface::new),
        ChartPalette::from(&config.charts),
    ))
}

/// Whether a config change requires a different proxy instance.
fn proxy_changed(old: &PaceboardConfig, new: &PaceboardConfig) -> bool {
    old.cache.version != new.cache.version
        || old.cache.enabled != new.cache.enabled
        || old.cache.dir != new.cache.dir
        || old.cache.app_shell != new.cache.app_shell
        || old.source.origin != new.source.origin
        || old.source.data_path != new.source.data_path
        || old.source.timeout_ms != new.source.timeout_ms
}

impl AppState {
    fn new(config: PaceboardConfig) -> Result<Self> {
        let proxy: LiveProxy = live_proxy(&config)?;
        let mut host = ProxyHost::new(proxy, config.cache.enabled);
        if let Some(report) = host.ensure_installed() {
            println!(
                "offline cache {} active ({} assets cached)",
                report.version, report.precached
            );
        }
        Ok(Self {
            dashboard: new_dashboard(&config)?,
            host,
            install: DeferredSlot::new(),
            config,
        })
    }

    /// Pick up config edits made while the server runs.
    ///
    /// A changed cache version installs the new proxy alongside the old one
    /// and supersedes the old one only once the new one is active.
    fn reload(&mut self) {
        let fresh = config::load();
        if proxy_changed(&self.config, &fresh) {
            let next = match live_proxy(&fresh) {
                Ok(next) => next,
                Err(e) => {
                    logging::warn("server", "reload_rejected", Some(&format!("{e:#}")));
                    return;
                }
            };
            if let Err(e) = self.host.roll_over(next, fresh.cache.enabled) {
                logging::warn("server", "rollover_failed", Some(&format!("{e:#}")));
                return;
            }
        }
        if fresh.source.origin != self.config.source.origin
            || fresh.source.data_path != self.config.source.data_path
            || fresh.charts != self.config.charts
        {
            match new_dashboard(&fresh) {
                Ok(dashboard) => self.dashboard = dashboard,
                Err(e) => {
                    logging::warn("server", "reload_rejected", Some(&format!("{e:#}")));
                    return;
                }
            }
        }
        self.config = fresh;
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on `addr`.
///
/// Blocks the current thread. Handles requests sequentially (sufficient for
/// a local single-user dashboard). Errors are answered per request without
/// stopping the server.
pub fn serve(config: PaceboardConfig, addr: &str, open: bool) -> Result<()> {
    let mut state = AppState::new(config)?;

    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("paceboard running at http://{addr}");
    println!("Proxying {}", state.config.source.origin);
    println!("Press Ctrl+C to stop.\n");
    logging::info("server", "started", Some(addr));

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();
        let headers: Vec<(String, String)> = request
            .headers()
            .iter()
            .map(|h| (h.field.as_str().to_string(), h.value.to_string()))
            .collect();

        let mut body = Vec::new();
        if matches!(method, Method::Put | Method::Post | Method::Patch | Method::Delete) {
            let _ = request.as_reader().read_to_end(&mut body);
        }

        let result = dispatch(&mut state, &method, &url, headers, body);

        let status = match result {
            Ok(resp) => {
                let status = resp.status_code().0;
                let _ = request.respond(resp);
                status
            }
            Err(e) => {
                logging::error("server", "request_failed", Some(&format!("{url}: {e:#}")));
                let _ = request.respond(error_response(500, &e.to_string()));
                500
            }
        };

        // Brief access log
        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    state: &mut AppState,
    method: &Method,
    url: &str,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
) -> Result<HttpResponse> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_dashboard(state)),

        (&Method::Get, "/api/health") => api::get_health(state),
        (&Method::Post, "/api/install/offer") => api::post_install_offer(state, &body),
        (&Method::Post, "/api/install/consume") => api::post_install_consume(state),

        // Everything else belongs to the origin
        _ => api::forward(state, method, url, headers, body),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Run a refresh through the proxy and render the page.
fn serve_dashboard(state: &mut AppState) -> HttpResponse {
    state.reload();
    state.host.ensure_installed();
    state.dashboard.refresh(state.host.proxy());

    let html = page::render_page(
        state.dashboard.view(),
        PageOptions {
            interactive: true,
            install_visible: state.install.is_pending(),
        },
    );
    with_header(
        Response::from_data(html.into_bytes()).with_status_code(StatusCode(200)),
        "Content-Type",
        "text/html; charset=utf-8",
    )
}

/// Attach a header, skipping it if the name or value is not valid ASCII.
pub(crate) fn with_header(resp: HttpResponse, name: &str, value: &str) -> HttpResponse {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => resp.with_header(header),
        Err(()) => resp,
    }
}

/// JSON error body with the given status.
pub(crate) fn error_response(status: u16, message: &str) -> HttpResponse {
    let body = serde_json::json!({ "error": message }).to_string();
    with_header(
        Response::from_data(body.into_bytes()).with_status_code(StatusCode(status)),
        "Content-Type",
        "application/json; charset=utf-8",
    )
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
