//! Ownership of the live proxy across installs and version rollovers.

use std::time::Duration;

use anyhow::Result;

use crate::config::{self, PaceboardConfig};
use crate::logging;
use crate::proxy::{
    ActivationReport, CacheStore, DiskStore, Fetch, LifecycleState, OfflineCacheProxy, UreqNetwork,
};

/// The proxy used by the server and the CLI.
pub type LiveProxy = OfflineCacheProxy<UreqNetwork, DiskStore>;

/// Build a proxy for `config`, bound to its cache version and origin.
pub fn live_proxy(config: &PaceboardConfig) -> Result<LiveProxy> {
    let network = UreqNetwork::new(Duration::from_millis(config.source.timeout_ms));
    let store = DiskStore::new(config::cache_dir(config)?);
    Ok(OfflineCacheProxy::new(
        config.cache.version.clone(),
        config::app_shell_urls(config)?,
        &config::data_url(&config.source)?,
        network,
        store,
    ))
}

/// Holds the current proxy and the policy for (re)installing it.
///
/// While `enabled` is false the proxy is never installed, so it stays in
/// `Installing` and passes every request straight through.
pub struct ProxyHost<N, S> {
    current: OfflineCacheProxy<N, S>,
    enabled: bool,
}

impl<N: Fetch, S: CacheStore> ProxyHost<N, S> {
    pub fn new(proxy: OfflineCacheProxy<N, S>, enabled: bool) -> Self {
        Self {
            current: proxy,
            enabled,
        }
    }

    pub fn proxy(&self) -> &OfflineCacheProxy<N, S> {
        &self.current
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Bring the current proxy to `Active` if it is not there yet.
    ///
    /// Prefers resuming from an already populated store; otherwise runs a
    /// full install. A failed install is logged and retried on the next
    /// call.
    pub fn ensure_installed(&mut self) -> Option<ActivationReport> {
        if !self.enabled || self.current.state() != LifecycleState::Installing {
            return None;
        }
        match self.current.resume() {
            Ok(Some(report)) => return Some(report),
            Ok(None) => {}
            Err(e) => logging::warn("proxy", "resume_failed", Some(&format!("{e:#}"))),
        }
        match self.current.install() {
            Ok(report) => Some(report),
            Err(e) => {
                logging::warn("proxy", "install_failed", Some(&format!("{e:#}")));
                None
            }
        }
    }

    /// Hand over to `next`.
    ///
    /// With caching enabled, `next` must install before it replaces the
    /// current proxy; until then the current one keeps serving, and an
    /// install failure leaves it in place. The replaced proxy is
    /// superseded.
    pub fn roll_over(
        &mut self,
        mut next: OfflineCacheProxy<N, S>,
        enabled: bool,
    ) -> Result<Option<ActivationReport>> {
        let report = if enabled { Some(next.install()?) } else { None };
        let mut previous = std::mem::replace(&mut self.current, next);
        previous.supersede();
        self.enabled = enabled;
        logging::info(
            "proxy",
            "rolled_over",
            Some(&format!("{} -> {}", previous.version(), self.current.version())),
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::proxy::{FetchError, MemoryStore, Request, Response};

    #[derive(Default)]
    struct Switch {
        offline: Mutex<bool>,
    }

    impl Switch {
        fn set_offline(&self, offline: bool) {
            *self.offline.lock().unwrap() = offline;
        }
    }

    impl Fetch for Switch {
        fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
            if *self.offline.lock().unwrap() {
                return Err(FetchError::Network {
                    url: request.url.clone(),
                    reason: "offline".to_string(),
                });
            }
            Ok(Response::new(200, request.url.clone().into_bytes()))
        }
    }

    fn proxy<'a>(
        version: &str,
        net: &'a Switch,
        store: &'a MemoryStore,
    ) -> OfflineCacheProxy<&'a Switch, &'a MemoryStore> {
        OfflineCacheProxy::new(
            version,
            vec!["http://o/app.js".to_string()],
            "http://o/data.json",
            net,
            store,
        )
    }

    #[test]
    fn failed_install_is_retried() {
        let net = Switch::default();
        let store = MemoryStore::new();
        let mut host = ProxyHost::new(proxy("v1", &net, &store), true);

        net.set_offline(true);
        assert!(host.ensure_installed().is_none());
        assert_eq!(host.proxy().state(), LifecycleState::Installing);

        net.set_offline(false);
        assert!(host.ensure_installed().is_some());
        assert_eq!(host.proxy().state(), LifecycleState::Active);
        assert!(host.ensure_installed().is_none());
    }

    #[test]
    fn disabled_host_never_installs() {
        let net = Switch::default();
        let store = MemoryStore::new();
        let mut host = ProxyHost::new(proxy("v1", &net, &store), false);
        assert!(host.ensure_installed().is_none());
        assert_eq!(host.proxy().state(), LifecycleState::Installing);
    }

    #[test]
    fn roll_over_keeps_old_proxy_until_new_one_installs() {
        let net = Switch::default();
        let store = MemoryStore::new();
        let mut host = ProxyHost::new(proxy("v1", &net, &store), true);
        host.ensure_installed();

        net.set_offline(true);
        assert!(host.roll_over(proxy("v2", &net, &store), true).is_err());
        assert_eq!(host.proxy().version(), "v1");
        assert_eq!(host.proxy().state(), LifecycleState::Active);

        net.set_offline(false);
        let report = host.roll_over(proxy("v2", &net, &store), true).unwrap().unwrap();
        assert_eq!(report.deleted_stores, vec!["v1"]);
        assert_eq!(host.proxy().version(), "v2");
        assert_eq!(store.store_names().unwrap(), vec!["v2"]);
    }
}
