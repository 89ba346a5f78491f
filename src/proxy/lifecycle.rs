//! The offline cache proxy and its lifecycle.
//!
//! A proxy instance is bound to one cache version. It moves through three
//! states:
//!
//! ```text
//! Installing ──install()──▶ Active ──supersede()──▶ Superseded
//!     ▲   │ (failure: stays Installing, retried later)
//!     └───┘
//! ```
//!
//! Only an `Active` proxy intercepts. In the other states requests go
//! straight to the network, matching a page that is not (or no longer)
//! controlled.

use anyhow::{Context, Result};
use url::Url;

use super::http::{Fetch, FetchError, Request, Response};
use super::store::CacheStore;
use super::strategy::{Classifier, RequestCategory, Strategy, StrategyTable, strip_query};
use crate::logging;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Installing,
    Active,
    Superseded,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Installing => write!(f, "installing"),
            Self::Active => write!(f, "active"),
            Self::Superseded => write!(f, "superseded"),
        }
    }
}

/// Outcome of a successful install + activate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub version: String,
    pub precached: usize,
    pub deleted_stores: Vec<String>,
}

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Served {
    Network,
    Cache,
}

/// Normalized cache key for a URL: parsed and re-serialized so equivalent
/// spellings collide.
pub fn asset_key(url: &str) -> String {
    Url::parse(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Caching proxy over a network `N`, persisting into a store `S`.
pub struct OfflineCacheProxy<N, S> {
    version: String,
    app_shell: Vec<String>,
    classifier: Classifier,
    table: StrategyTable,
    network: N,
    store: S,
    state: LifecycleState,
}

impl<N: Fetch, S: CacheStore> OfflineCacheProxy<N, S> {
    /// Create a proxy in the `Installing` state.
    ///
    /// `app_shell` holds absolute URLs; `data_url` is the snapshot endpoint.
    pub fn new(
        version: impl Into<String>,
        app_shell: Vec<String>,
        data_url: &str,
        network: N,
        store: S,
    ) -> Self {
        Self {
            version: version.into(),
            app_shell,
            classifier: Classifier::new(data_url),
            table: StrategyTable::default(),
            network,
            store,
            state: LifecycleState::Installing,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Pre-cache the app shell, then activate.
    ///
    /// Every shell URL must fetch with a 2xx status; otherwise nothing is
    /// written and the proxy stays `Installing`. Calling this when already
    /// active is a no-op report.
    pub fn install(&mut self) -> Result<ActivationReport> {
        match self.state {
            LifecycleState::Installing => {}
            LifecycleState::Active => {
                return Ok(ActivationReport {
                    version: self.version.clone(),
                    precached: 0,
                    deleted_stores: Vec::new(),
                });
            }
            LifecycleState::Superseded => {
                anyhow::bail!("cache {} has been superseded", self.version);
            }
        }

        let mut entries = Vec::with_capacity(self.app_shell.len());
        for url in &self.app_shell {
            let response = self
                .network
                .fetch(&Request::get(url.clone()))
                .with_context(|| format!("install: failed to fetch {url}"))?;
            if !response.is_success() {
                anyhow::bail!("install: {url} returned HTTP {}", response.status);
            }
            entries.push((asset_key(url), response));
        }

        self.store
            .put_all(&self.version, &entries)
            .with_context(|| format!("install: failed to populate cache {}", self.version))?;
        logging::info(
            "proxy",
            "installed",
            Some(&format!("{} ({} assets)", self.version, entries.len())),
        );

        let mut report = self.activate()?;
        report.precached = entries.len();
        Ok(report)
    }

    /// Activate from a store that an earlier run of the same version already
    /// populated, without touching the network.
    ///
    /// Returns `None` (state unchanged) unless every app shell entry is
    /// present.
    pub fn resume(&mut self) -> Result<Option<ActivationReport>> {
        if self.state != LifecycleState::Installing || self.app_shell.is_empty() {
            return Ok(None);
        }
        let cached = self.store.keys(&self.version)?;
        let complete = self
            .app_shell
            .iter()
            .all(|url| cached.contains(&asset_key(url)));
        if !complete {
            return Ok(None);
        }
        logging::info("proxy", "resumed", Some(&self.version));
        self.activate().map(Some)
    }

    /// Delete every store except the current version and start
    /// intercepting immediately.
    fn activate(&mut self) -> Result<ActivationReport> {
        let mut deleted = Vec::new();
        for name in self.store.store_names()? {
            if name != self.version && self.store.delete_store(&name)? {
                deleted.push(name);
            }
        }
        self.state = LifecycleState::Active;
        logging::info(
            "proxy",
            "activated",
            Some(&format!("{} (removed {:?})", self.version, deleted)),
        );
        Ok(ActivationReport {
            version: self.version.clone(),
            precached: 0,
            deleted_stores: deleted,
        })
    }

    /// Stop intercepting; a newer version has taken over.
    pub fn supersede(&mut self) {
        if self.state != LifecycleState::Superseded {
            logging::info("proxy", "superseded", Some(&self.version));
        }
        self.state = LifecycleState::Superseded;
    }

    /// Handle one request according to the lifecycle state and the
    /// strategy table, reporting where the response came from.
    pub fn intercept(&self, request: &Request) -> Result<(Response, Served), FetchError> {
        if self.state != LifecycleState::Active {
            return self.network.fetch(request).map(|r| (r, Served::Network));
        }

        let category = self.classifier.classify(request);
        match self.table.lookup(category) {
            Strategy::NetworkOnly => self.network.fetch(request).map(|r| (r, Served::Network)),
            Strategy::NetworkFirst => self.network_first(request, category),
            Strategy::CacheFirst => self.cache_first(request, category),
        }
    }

    fn key_for(&self, request: &Request, category: RequestCategory) -> String {
        match category {
            RequestCategory::DataEndpoint => strip_query(&request.url),
            _ => asset_key(&request.url),
        }
    }

    fn network_first(
        &self,
        request: &Request,
        category: RequestCategory,
    ) -> Result<(Response, Served), FetchError> {
        let key = self.key_for(request, category);
        match self.network.fetch(request) {
            Ok(response) => {
                if response.is_success()
                    && let Err(e) = self.store.put(&self.version, &key, &response)
                {
                    logging::warn("proxy", "cache_write_failed", Some(&format!("{key}: {e:#}")));
                }
                Ok((response, Served::Network))
            }
            Err(network_err) => match self.store.lookup(&self.version, &key) {
                Ok(Some(cached)) => {
                    logging::info(
                        "proxy",
                        "served_stale",
                        Some(&format!("{key}: {network_err}")),
                    );
                    Ok((cached, Served::Cache))
                }
                Ok(None) => Err(network_err),
                Err(e) => {
                    logging::warn("proxy", "cache_read_failed", Some(&format!("{key}: {e:#}")));
                    Err(network_err)
                }
            },
        }
    }

    fn cache_first(
        &self,
        request: &Request,
        category: RequestCategory,
    ) -> Result<(Response, Served), FetchError> {
        let key = self.key_for(request, category);
        match self.store.lookup(&self.version, &key) {
            Ok(Some(hit)) => return Ok((hit, Served::Cache)),
            Ok(None) => {}
            Err(e) => logging::warn("proxy", "cache_read_failed", Some(&format!("{key}: {e:#}"))),
        }
        self.network.fetch(request).map(|r| (r, Served::Network))
    }
}

impl<N: Fetch, S: CacheStore> Fetch for OfflineCacheProxy<N, S> {
    fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.intercept(request).map(|(response, _)| response)
    }
}
