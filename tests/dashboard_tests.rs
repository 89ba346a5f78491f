/// Dashboard load cycle tests.
///
/// Feeds snapshots through `Dashboard` (directly and through the offline
/// cache proxy) and checks what each mount point ends up showing.
use std::sync::Mutex;

use paceboard::chart::scene::Scene;
use paceboard::chart::svg::SvgSurface;
use paceboard::dashboard::page::{PageOptions, render_page};
use paceboard::dashboard::{
    ChartPalette, ChartSurfaces, Dashboard, DeferredSlot, InstallOffer, NO_DATA_MESSAGE, Phase,
};
use paceboard::proxy::{
    Fetch, FetchError, MemoryStore, OfflineCacheProxy, Request, Response,
};
use paceboard::snapshot::Snapshot;

const DATA: &str = "http://127.0.0.1:8000/pwa/data/dashboard_data.json";

const FULL: &str = r#"{
  "has_data": true,
  "generated_at": "2024-06-01T07:30:00",
  "kpis": {
    "total_runs": 3,
    "lifetime_distance_km": 27.4,
    "weekly_mileage_km": 15.2,
    "training_load_ratio": 1.1234,
    "latest_run_date": "2024-01-10",
    "latest_run_pace": 5.5
  },
  "series": {
    "monthly_mileage": [
      {"month": "2023-12", "distance_km": 12.0},
      {"month": "2024-01", "distance_km": 15.4}
    ],
    "pace_vs_hr": [
      {"avg_hr": 140, "avg_pace_min_per_km": 6.1},
      {"avg_hr": 160, "avg_pace_min_per_km": 5.2}
    ],
    "cadence_trend": [
      {"workout_date": "2024-01-02", "avg_cadence": 168},
      {"workout_date": "2024-01-05", "avg_cadence": 172},
      {"workout_date": "2024-01-10", "avg_cadence": 170}
    ],
    "distance_trend": [
      {"workout_date": "2024-01-02", "distance_km": 0},
      {"workout_date": "2024-01-05", "distance_km": 10.2},
      {"workout_date": "2024-01-10", "distance_km": 5.2}
    ],
    "run_table": [
      {"workout_date": "2024-01-02", "distance_km": 12.0, "avg_pace_min_per_km": 5.999},
      {"workout_date": "2024-01-10", "distance_km": 5.2, "avg_hr": "151"},
      {"workout_date": "2024-01-05", "distance_km": 10.2}
    ]
  }
}"#;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Serves `body` until switched offline.
struct Origin {
    body: Mutex<Option<String>>,
}

impl Origin {
    fn serving(body: &str) -> Self {
        Self {
            body: Mutex::new(Some(body.to_string())),
        }
    }

    fn go_offline(&self) {
        *self.body.lock().unwrap() = None;
    }
}

impl Fetch for Origin {
    fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        match self.body.lock().unwrap().as_ref() {
            Some(body) => Ok(Response::new(200, body.clone())),
            None => Err(FetchError::Network {
                url: request.url.clone(),
                reason: "offline".to_string(),
            }),
        }
    }
}

fn scene_dashboard() -> Dashboard<Scene> {
    Dashboard::new(
        DATA,
        ChartSurfaces::from_ids(|_| Scene::default()),
        ChartPalette::default(),
    )
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

#[test]
fn no_data_snapshot_shows_empty_state() {
    let mut dashboard = scene_dashboard();
    let origin = Origin::serving(r#"{"has_data": false, "generated_at": "2024-01-01"}"#);

    assert_eq!(dashboard.refresh(&origin), Phase::Empty);
    let view = dashboard.view();
    assert!(view.empty_state_visible);
    assert!(!view.content_visible);
    assert_eq!(view.empty_message, NO_DATA_MESSAGE);
    assert_eq!(view.status, "Generated: 2024-01-01");
}

#[test]
fn full_snapshot_populates_every_mount() {
    let mut dashboard = scene_dashboard();
    assert_eq!(dashboard.refresh(&Origin::serving(FULL)), Phase::Loaded);

    let view = dashboard.view();
    assert!(view.content_visible);
    assert!(!view.empty_state_visible);
    assert_eq!(view.status, "Generated: 2024-06-01T07:30:00");

    let kpis: Vec<(&str, &str)> = view
        .kpis
        .cards()
        .iter()
        .map(|c| (c.label, c.value.as_str()))
        .collect();
    assert_eq!(kpis[0], ("Total Runs", "3"));
    assert_eq!(kpis[1], ("Lifetime Distance", "27.4 km"));
    assert_eq!(kpis[3], ("7d vs 28d Ratio", "1.12"));
    assert_eq!(kpis[5], ("Latest Pace", "5:30 /km"));

    assert_eq!(view.charts.monthly.polylines().count(), 1);
    assert_eq!(view.charts.monthly.circles().count(), 2);
    assert_eq!(view.charts.scatter.circles().count(), 2);
    assert_eq!(view.charts.cadence.circles().count(), 3);
    assert_eq!(view.charts.distance.rects().count(), 3);
    assert_eq!(view.table.rows().len(), 3);
}

#[test]
fn run_table_is_newest_first_with_per_field_formatting() {
    let mut dashboard = scene_dashboard();
    dashboard.refresh(&Origin::serving(FULL));

    let rows = dashboard.view().table.rows();
    let dates: Vec<&str> = rows.iter().map(|r| r.date()).collect();
    assert_eq!(dates, vec!["2024-01-10", "2024-01-05", "2024-01-02"]);

    // Numeric strings are coerced; missing fields render the placeholder.
    assert_eq!(rows[0].cells[3], "151");
    assert_eq!(rows[0].cells[6], "-");
    // 5.999 min/km rounds its seconds up into the next minute.
    assert_eq!(rows[2].cells[6], "6:00 /km");
}

#[test]
fn zero_distance_bar_stays_visible() {
    let mut dashboard = scene_dashboard();
    dashboard.refresh(&Origin::serving(FULL));

    let heights: Vec<f64> = dashboard
        .view()
        .charts
        .distance
        .rects()
        .map(|(_, _, _, h)| h)
        .collect();
    assert!(heights[0] >= 1.0);
    assert!(heights[1] > heights[2]);
}

#[test]
fn unparseable_body_enters_error_phase() {
    let mut dashboard = scene_dashboard();
    assert_eq!(
        dashboard.refresh(&Origin::serving("<!doctype html>")),
        Phase::Error
    );
    assert!(dashboard.view().empty_state_visible);
    assert!(dashboard.last_error().is_some());
}

#[test]
fn refresh_replaces_previous_content() {
    let mut dashboard = scene_dashboard();
    dashboard.refresh(&Origin::serving(FULL));
    dashboard.refresh(&Origin::serving(
        r#"{"has_data": true, "series": {"run_table": [{"workout_date": "2025-02-02"}]}}"#,
    ));

    let view = dashboard.view();
    assert_eq!(view.table.rows().len(), 1);
    assert_eq!(view.charts.distance.rects().count(), 0);
    assert_eq!(view.kpis.cards()[0].value, "-");
}

// ---------------------------------------------------------------------------
// Through the offline cache proxy
// ---------------------------------------------------------------------------

#[test]
fn offline_refresh_shows_last_good_snapshot() {
    let origin = Origin::serving(FULL);
    let store = MemoryStore::new();
    let mut proxy = OfflineCacheProxy::new("paceboard-v1", Vec::new(), DATA, &origin, &store);
    proxy.install().unwrap();

    let mut dashboard = scene_dashboard();
    assert_eq!(dashboard.refresh(&proxy), Phase::Loaded);

    origin.go_offline();
    let mut fresh_page = scene_dashboard();
    assert_eq!(fresh_page.refresh(&proxy), Phase::Loaded);
    assert_eq!(fresh_page.view().status, "Generated: 2024-06-01T07:30:00");
}

#[test]
fn offline_without_cache_is_error() {
    let origin = Origin::serving(FULL);
    origin.go_offline();
    let store = MemoryStore::new();
    let mut proxy = OfflineCacheProxy::new("paceboard-v1", Vec::new(), DATA, &origin, &store);
    proxy.install().unwrap();

    let mut dashboard = scene_dashboard();
    assert_eq!(dashboard.refresh(&proxy), Phase::Error);
}

// ---------------------------------------------------------------------------
// Page and install slot
// ---------------------------------------------------------------------------

#[test]
fn rendered_page_contains_every_mount_point() {
    let mut dashboard = Dashboard::new(
        DATA,
        ChartSurfaces::from_ids(SvgSurface::new),
        ChartPalette::default(),
    );
    let snapshot = Snapshot::from_slice(FULL.as_bytes()).unwrap();
    dashboard.apply(&snapshot);

    let html = render_page(
        dashboard.view(),
        PageOptions {
            interactive: true,
            install_visible: false,
        },
    );
    for id in [
        "kpis",
        "runTable",
        "monthlyChart",
        "scatterChart",
        "cadenceChart",
        "distanceChart",
        "emptyState",
        "content",
        "generatedAt",
        "refreshBtn",
        "installBtn",
    ] {
        assert!(html.contains(&format!(r#"id="{id}""#)), "missing mount {id}");
    }
    assert!(html.contains("<td>2024-01-10</td>"));
    assert!(html.contains(r#"<section id="emptyState" class="empty" hidden>"#));
}

#[test]
fn install_offer_is_consumed_once() {
    let mut slot = DeferredSlot::new();
    assert!(slot.offer(InstallOffer::new(vec!["web".to_string()])));
    assert!(!slot.offer(InstallOffer::new(Vec::new())));

    let offer = slot.take().unwrap();
    assert_eq!(offer.platforms, vec!["web"]);
    assert!(slot.take().is_none());
}
