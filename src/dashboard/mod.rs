//! Load/refresh orchestration.
//!
//! [`Dashboard`] owns the view and drives it through
//! `Loading → Loaded | Empty | Error` on every load or manual refresh. All
//! retrieval failures (transport error, non-2xx status, unparseable body)
//! land in the same `Error` phase; the cause goes to the event log and is
//! kept for diagnostics, never propagated.
//!
//! Refreshes are not versioned: whichever response is applied last is what
//! the view shows.

pub mod install;
pub mod page;
pub mod view;

use thiserror::Error;

use crate::chart::DrawSurface;
use crate::logging;
use crate::proxy::{CacheMode, Fetch, FetchError, Request};
use crate::snapshot::Snapshot;

pub use install::{DeferredSlot, InstallOffer};
pub use view::{ChartPalette, ChartSurfaces, DashboardView};

/// Empty-state text when the exporter reports no data and gives no reason.
pub const NO_DATA_MESSAGE: &str = "No data file found yet.";

/// Empty-state text for any retrieval failure.
pub const LOAD_FAILED_MESSAGE: &str =
    "Could not load dashboard data. Run the exporter and check that the origin is reachable.";

/// Why a snapshot could not be obtained.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("snapshot request returned HTTP {0}")]
    Status(u16),
    #[error("snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Loaded,
    Empty,
    Error,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "loading"),
            Self::Loaded => write!(f, "loaded"),
            Self::Empty => write!(f, "empty"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Fetch the snapshot with no-store freshness and parse it.
pub fn fetch_snapshot<F: Fetch + ?Sized>(fetcher: &F, data_url: &str) -> Result<Snapshot, LoadError> {
    let request = Request::get(data_url).with_cache(CacheMode::NoStore);
    let response = fetcher.fetch(&request)?;
    if !response.is_success() {
        return Err(LoadError::Status(response.status));
    }
    Ok(Snapshot::from_slice(&response.body)?)
}

/// The dashboard page state machine over surfaces of type `S`.
pub struct Dashboard<S> {
    data_url: String,
    palette: ChartPalette,
    view: DashboardView<S>,
    phase: Phase,
    last_error: Option<String>,
}

impl<S: DrawSurface> Dashboard<S> {
    pub fn new(data_url: impl Into<String>, charts: ChartSurfaces<S>, palette: ChartPalette) -> Self {
        Self {
            data_url: data_url.into(),
            palette,
            view: DashboardView::new(charts),
            phase: Phase::Loading,
            last_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> &DashboardView<S> {
        &self.view
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    /// Cause of the most recent `Error` phase.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Run one full load cycle against `fetcher`.
    pub fn refresh<F: Fetch + ?Sized>(&mut self, fetcher: &F) -> Phase {
        self.phase = Phase::Loading;
        self.view.show_loading();
        match fetch_snapshot(fetcher, &self.data_url) {
            Ok(snapshot) => self.apply(&snapshot),
            Err(e) => self.fail(&e),
        }
    }

    /// Apply an already obtained snapshot.
    pub fn apply(&mut self, snapshot: &Snapshot) -> Phase {
        if snapshot.has_data {
            self.view.show_snapshot(snapshot, &self.palette);
            self.phase = Phase::Loaded;
            self.last_error = None;
            logging::debug("dashboard", "loaded", snapshot.generated_at.as_deref());
        } else {
            let message = snapshot.message.as_deref().unwrap_or(NO_DATA_MESSAGE);
            let status = match snapshot.generated_at.as_deref() {
                Some(ts) => view::generated_label(Some(ts)),
                None => NO_DATA_MESSAGE.to_string(),
            };
            self.view.show_empty(message, status);
            self.phase = Phase::Empty;
            self.last_error = None;
            logging::info("dashboard", "no_data", Some(message));
        }
        self.phase
    }

    /// Enter the `Error` phase for `err`.
    pub fn fail(&mut self, err: &LoadError) -> Phase {
        let cause = err.to_string();
        self.view
            .show_empty(LOAD_FAILED_MESSAGE, LOAD_FAILED_MESSAGE.to_string());
        self.phase = Phase::Error;
        logging::error("dashboard", "load_failed", Some(&cause));
        self.last_error = Some(cause);
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::scene::Scene;
    use crate::proxy::Response;

    struct Fixed(Result<Response, ()>);

    impl Fetch for Fixed {
        fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
            assert_eq!(request.cache, CacheMode::NoStore);
            self.0.clone().map_err(|_| FetchError::Network {
                url: request.url.clone(),
                reason: "offline".to_string(),
            })
        }
    }

    fn dashboard() -> Dashboard<Scene> {
        Dashboard::new(
            "http://o/data.json",
            ChartSurfaces::from_ids(|_| Scene::default()),
            ChartPalette::default(),
        )
    }

    #[test]
    fn non_success_status_is_error() {
        let mut d = dashboard();
        assert_eq!(d.refresh(&Fixed(Ok(Response::new(404, "")))), Phase::Error);
        assert_eq!(d.last_error(), Some("snapshot request returned HTTP 404"));
        assert!(!d.view().content_visible);
    }

    #[test]
    fn parse_failure_is_error() {
        let mut d = dashboard();
        assert_eq!(d.refresh(&Fixed(Ok(Response::new(200, "<html>")))), Phase::Error);
        assert!(d.last_error().unwrap().starts_with("snapshot is not valid JSON"));
    }

    #[test]
    fn network_failure_is_error() {
        let mut d = dashboard();
        assert_eq!(d.refresh(&Fixed(Err(()))), Phase::Error);
        assert!(d.view().empty_state_visible);
        assert_eq!(d.view().empty_message, LOAD_FAILED_MESSAGE);
    }

    #[test]
    fn payload_message_wins_over_default() {
        let mut d = dashboard();
        let body = r#"{"has_data": false, "message": "No running workouts available."}"#;
        assert_eq!(d.refresh(&Fixed(Ok(Response::new(200, body)))), Phase::Empty);
        assert_eq!(d.view().empty_message, "No running workouts available.");
        assert_eq!(d.view().status, NO_DATA_MESSAGE);
    }

    #[test]
    fn recovers_after_error() {
        let mut d = dashboard();
        d.refresh(&Fixed(Err(())));
        let body = r#"{"has_data": true, "generated_at": "2024-06-01T07:00:00"}"#;
        assert_eq!(d.refresh(&Fixed(Ok(Response::new(200, body)))), Phase::Loaded);
        assert_eq!(d.last_error(), None);
        assert_eq!(d.view().status, "Generated: 2024-06-01T07:00:00");
        assert!(d.view().content_visible);
    }
}
