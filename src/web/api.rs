//! JSON API handlers and the origin forwarder.
//!
//! Each handler returns a `Response<Cursor<Vec<u8>>>`. Handler failures
//! that are the origin's fault become 502 responses; everything else bubbles
//! up to the server loop as a 500.

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Method, Response, StatusCode};

use crate::config;
use crate::dashboard::InstallOffer;
use crate::logging;
use crate::proxy::network::is_hop_by_hop;
use crate::proxy::{self, CacheStore, Request, Served};

use super::{AppState, HttpResponse, error_response, with_header};

/// Header telling the browser (and whoever debugs it) where a proxied
/// response came from.
const SERVED_HEADER: &str = "X-Paceboard-Served";

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Health API response.
#[derive(Serialize)]
struct HealthResponse {
    origin: String,
    data_url: String,
    cache_enabled: bool,
    cache_version: String,
    proxy_state: String,
    cached_entries: usize,
    phase: String,
    last_error: Option<String>,
    install_pending: bool,
}

#[derive(Serialize)]
struct OfferResponse {
    stored: bool,
}

#[derive(Serialize)]
struct ConsumeResponse {
    prompt: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<HttpResponse> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(with_header(
        Response::from_data(body.into_bytes()).with_status_code(StatusCode(200)),
        "Content-Type",
        "application/json; charset=utf-8",
    ))
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/health` — proxy lifecycle and last load outcome.
pub fn get_health(state: &AppState) -> Result<HttpResponse> {
    let proxy = state.host.proxy();
    let cached_entries = proxy
        .store()
        .keys(proxy.version())
        .map(|keys| keys.len())
        .unwrap_or(0);

    json_response(&HealthResponse {
        origin: state.config.source.origin.clone(),
        data_url: state.dashboard.data_url().to_string(),
        cache_enabled: state.host.enabled(),
        cache_version: proxy.version().to_string(),
        proxy_state: proxy.state().to_string(),
        cached_entries,
        phase: state.dashboard.phase().to_string(),
        last_error: state.dashboard.last_error().map(str::to_string),
        install_pending: state.install.is_pending(),
    })
}

/// `POST /api/install/offer` — the page reports that the app is installable.
///
/// Only the first offer is kept until it is consumed.
pub fn post_install_offer(state: &mut AppState, body: &[u8]) -> Result<HttpResponse> {
    let offer: InstallOffer = if body.iter().all(u8::is_ascii_whitespace) {
        InstallOffer::new(Vec::new())
    } else {
        match serde_json::from_slice(body) {
            Ok(offer) => offer,
            Err(e) => {
                return Ok(error_response(400, &format!("invalid install offer: {e}")));
            }
        }
    };
    let stored = state.install.offer(offer);
    if stored {
        logging::info("server", "install_offered", None);
    }
    json_response(&OfferResponse { stored })
}

/// `POST /api/install/consume` — the user clicked install.
///
/// Answers `prompt: true` exactly once per pending offer.
pub fn post_install_consume(state: &mut AppState) -> Result<HttpResponse> {
    let prompt = state.install.take().is_some();
    if prompt {
        logging::info("server", "install_prompted", None);
    }
    json_response(&ConsumeResponse { prompt })
}

// ---------------------------------------------------------------------------
// Origin forwarding
// ---------------------------------------------------------------------------

/// Forward a request to the origin through the offline cache proxy.
///
/// The request path is resolved relative to `source.origin`, so `/assets/app.js`
/// maps to `<origin>/assets/app.js` even when the origin has a path prefix.
pub fn forward(
    state: &mut AppState,
    method: &Method,
    url: &str,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
) -> Result<HttpResponse> {
    let Some(target) =
        config::resolve_within_origin(&state.config.source, url.trim_start_matches('/'))?
    else {
        logging::warn("server", "forward_rejected", Some(url));
        return Ok(error_response(400, "request target is outside the configured origin"));
    };
    state.host.ensure_installed();

    let mut request = Request::get(target).with_method(proxy::Method::parse(&method.to_string()));
    request.headers = headers
        .into_iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .collect();
    if !body.is_empty() {
        request = request.with_body(body);
    }

    match state.host.proxy().intercept(&request) {
        Ok((upstream, served)) => {
            let mut resp =
                Response::from_data(upstream.body).with_status_code(StatusCode(upstream.status));
            for (name, value) in &upstream.headers {
                if !is_hop_by_hop(name) {
                    resp = with_header(resp, name, value);
                }
            }
            let served = match served {
                Served::Network => "network",
                Served::Cache => "cache",
            };
            Ok(with_header(resp, SERVED_HEADER, served))
        }
        Err(e) => {
            logging::warn("server", "forward_failed", Some(&e.to_string()));
            Ok(error_response(502, &e.to_string()))
        }
    }
}
