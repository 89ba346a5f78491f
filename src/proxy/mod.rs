//! Offline cache proxy.
//!
//! Sits between the dashboard (and the browser, when serving) and the
//! network. Static assets are served cache-first; the data snapshot is
//! fetched network-first with the last good copy as the offline fallback.
//! The policy is a [`strategy::StrategyTable`] keyed by request category,
//! independent of where requests come from.

pub mod http;
pub mod lifecycle;
pub mod network;
pub mod store;
pub mod strategy;

pub use http::{CacheMode, Fetch, FetchError, Method, Request, Response};
pub use lifecycle::{ActivationReport, LifecycleState, OfflineCacheProxy, Served};
pub use network::UreqNetwork;
pub use store::{CacheStore, DiskStore, MemoryStore};
pub use strategy::{RequestCategory, Strategy, StrategyTable};
