//! Interception policy: request categories and the strategy table.

use url::Url;

use super::http::Request;

/// How the proxy classifies an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestCategory {
    /// Non-read requests. Never cached.
    Passthrough,
    /// The dashboard data snapshot.
    DataEndpoint,
    /// Any other read request (app shell and static assets).
    Asset,
}

/// Where a response comes from for a given category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Straight to the network, cache untouched.
    NetworkOnly,
    /// Network, persisting successes; cached copy on network failure.
    NetworkFirst,
    /// Cached copy when present, otherwise network without persisting.
    CacheFirst,
}

/// Strategy per request category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyTable {
    pub passthrough: Strategy,
    pub data_endpoint: Strategy,
    pub asset: Strategy,
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self {
            passthrough: Strategy::NetworkOnly,
            data_endpoint: Strategy::NetworkFirst,
            asset: Strategy::CacheFirst,
        }
    }
}

impl StrategyTable {
    pub fn lookup(&self, category: RequestCategory) -> Strategy {
        match category {
            RequestCategory::Passthrough => self.passthrough,
            RequestCategory::DataEndpoint => self.data_endpoint,
            RequestCategory::Asset => self.asset,
        }
    }
}

/// Strip the query string and fragment, the cache key form of the data
/// snapshot URL. Unparseable URLs are returned unchanged.
pub fn strip_query(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    }
}

/// Classifies requests against the data snapshot URL.
#[derive(Debug, Clone)]
pub struct Classifier {
    data_key: String,
}

impl Classifier {
    pub fn new(data_url: &str) -> Self {
        Self {
            data_key: strip_query(data_url),
        }
    }

    /// Cache key of the data snapshot.
    pub fn data_key(&self) -> &str {
        &self.data_key
    }

    pub fn classify(&self, request: &Request) -> RequestCategory {
        if !request.is_read() {
            RequestCategory::Passthrough
        } else if strip_query(&request.url) == self.data_key {
            RequestCategory::DataEndpoint
        } else {
            RequestCategory::Asset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::http::Method;

    const DATA: &str = "http://127.0.0.1:8000/pwa/data/dashboard_data.json";

    #[test]
    fn strip_query_drops_query_and_fragment() {
        assert_eq!(strip_query(&format!("{DATA}?t=123#top")), DATA);
        assert_eq!(strip_query("not a url?x=1"), "not a url");
    }

    #[test]
    fn classifies_by_method_and_url() {
        let c = Classifier::new(DATA);
        assert_eq!(
            c.classify(&Request::get(format!("{DATA}?v=2"))),
            RequestCategory::DataEndpoint
        );
        assert_eq!(
            c.classify(&Request::get("http://127.0.0.1:8000/pwa/assets/app.js")),
            RequestCategory::Asset
        );
        assert_eq!(
            c.classify(&Request::get(DATA).with_method(Method::Post)),
            RequestCategory::Passthrough
        );
    }

    #[test]
    fn default_table_matches_policy() {
        let table = StrategyTable::default();
        assert_eq!(table.lookup(RequestCategory::Passthrough), Strategy::NetworkOnly);
        assert_eq!(table.lookup(RequestCategory::DataEndpoint), Strategy::NetworkFirst);
        assert_eq!(table.lookup(RequestCategory::Asset), Strategy::CacheFirst);
    }
}
