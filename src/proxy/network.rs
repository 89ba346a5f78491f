/// Blocking network access via `ureq`.
///
/// Every request carries a timeout so a hung origin surfaces as a
/// [`FetchError::Network`] instead of blocking the server forever. Non-2xx
/// statuses are returned as ordinary responses.
use std::io::Read;
use std::time::Duration;

use super::http::{CacheMode, Fetch, FetchError, Request, Response};

/// Upper bound on a single response body.
const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Headers that describe the transport rather than the resource.
const HOP_BY_HOP: [&str; 6] = [
    "connection",
    "content-length",
    "keep-alive",
    "transfer-encoding",
    "upgrade",
    "host",
];

#[derive(Debug, Clone)]
pub struct UreqNetwork {
    agent: ureq::Agent,
}

impl UreqNetwork {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

pub(crate) fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

fn read_response(resp: ureq::Response, url: &str) -> Result<Response, FetchError> {
    let status = resp.status();
    let headers = resp
        .headers_names()
        .into_iter()
        .filter(|name| !is_hop_by_hop(name))
        .filter_map(|name| resp.header(&name).map(|v| (name.clone(), v.to_string())))
        .collect();

    let body = read_body(resp.into_reader(), MAX_BODY_BYTES, url)?;

    Ok(Response {
        status,
        headers,
        body,
    })
}

/// Read at most `limit` bytes; a body that keeps going past it is an error,
/// never a truncated success.
fn read_body(reader: impl Read, limit: u64, url: &str) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();
    reader
        .take(limit + 1)
        .read_to_end(&mut body)
        .map_err(|e| FetchError::Network {
            url: url.to_string(),
            reason: format!("failed reading body: {e}"),
        })?;
    if body.len() as u64 > limit {
        return Err(FetchError::Network {
            url: url.to_string(),
            reason: format!("body exceeds limit of {limit} bytes"),
        });
    }
    Ok(body)
}

impl Fetch for UreqNetwork {
    fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        url::Url::parse(&request.url).map_err(|e| FetchError::InvalidUrl {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;

        let mut call = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            if !is_hop_by_hop(name) {
                call = call.set(name, value);
            }
        }
        if request.cache == CacheMode::NoStore {
            call = call
                .set("Cache-Control", "no-store")
                .set("Pragma", "no-cache");
        }

        let result = match &request.body {
            Some(body) => call.send_bytes(body),
            None => call.call(),
        };

        match result {
            Ok(resp) => read_response(resp, &request.url),
            Err(ureq::Error::Status(_, resp)) => read_response(resp, &request.url),
            Err(ureq::Error::Transport(t)) => Err(FetchError::Network {
                url: request.url.clone(),
                reason: t.to_string(),
            }),
        }
    }
}
