//! Personal running dashboard with an offline cache proxy.
//!
//! The exporter publishes a JSON snapshot of running statistics next to a
//! static app shell. This crate renders that snapshot as KPI cards, four
//! charts, and a run log, and keeps the shell and the last good snapshot
//! available offline.

pub mod chart;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod present;
pub mod proxy;
pub mod snapshot;
pub mod web;
