//! The dashboard's mount points and how a snapshot paints them.

use crate::chart::{self, ChartStyle, DrawSurface};
use crate::config::schema::ChartsConfig;
use crate::present::{KpiPanel, RunTable};
use crate::snapshot::{Field, Snapshot};

/// The four chart surfaces, one per series.
#[derive(Debug, Clone)]
pub struct ChartSurfaces<S> {
    pub monthly: S,
    pub scatter: S,
    pub cadence: S,
    pub distance: S,
}

impl<S> ChartSurfaces<S> {
    /// Build each surface from its mount id.
    pub fn from_ids(mut make: impl FnMut(&'static str) -> S) -> Self {
        Self {
            monthly: make("monthlyChart"),
            scatter: make("scatterChart"),
            cadence: make("cadenceChart"),
            distance: make("distanceChart"),
        }
    }
}

/// Chart styles derived from `[charts]`.
#[derive(Debug, Clone)]
pub struct ChartPalette {
    pub monthly: ChartStyle,
    pub scatter: ChartStyle,
    pub cadence: ChartStyle,
    pub distance: ChartStyle,
}

impl From<&ChartsConfig> for ChartPalette {
    fn from(config: &ChartsConfig) -> Self {
        Self {
            monthly: ChartStyle::line(&config.monthly_color),
            scatter: ChartStyle::scatter(&config.scatter_color),
            cadence: ChartStyle::line(&config.cadence_color),
            distance: ChartStyle::bars(&config.distance_color),
        }
    }
}

impl Default for ChartPalette {
    fn default() -> Self {
        Self::from(&ChartsConfig::default())
    }
}

/// Everything the page displays.
#[derive(Debug, Clone)]
pub struct DashboardView<S> {
    pub kpis: KpiPanel,
    pub charts: ChartSurfaces<S>,
    pub table: RunTable,
    pub empty_state_visible: bool,
    pub content_visible: bool,
    /// Text of the `generatedAt` status element.
    pub status: String,
    /// Message shown inside the empty state.
    pub empty_message: String,
}

impl<S: DrawSurface> DashboardView<S> {
    pub fn new(charts: ChartSurfaces<S>) -> Self {
        Self {
            kpis: KpiPanel::default(),
            charts,
            table: RunTable::default(),
            empty_state_visible: false,
            content_visible: false,
            status: "Loading…".to_string(),
            empty_message: String::new(),
        }
    }

    /// Reveal content and repaint every renderer from `snapshot`.
    pub fn show_snapshot(&mut self, snapshot: &Snapshot, palette: &ChartPalette) {
        self.empty_state_visible = false;
        self.content_visible = true;
        self.status = generated_label(snapshot.generated_at.as_deref());

        let series = &snapshot.series;
        self.kpis.render(&snapshot.kpis);
        chart::render_line(
            &mut self.charts.monthly,
            &series.monthly_mileage,
            Field::DistanceKm,
            &palette.monthly,
        );
        chart::render_scatter(&mut self.charts.scatter, &series.pace_vs_hr, &palette.scatter);
        chart::render_line(
            &mut self.charts.cadence,
            &series.cadence_trend,
            Field::AvgCadence,
            &palette.cadence,
        );
        chart::render_bars(
            &mut self.charts.distance,
            &series.distance_trend,
            Field::DistanceKm,
            &palette.distance,
        );
        self.table.render(&series.run_table);
    }

    /// Hide content and show the empty state with `message`.
    pub fn show_empty(&mut self, message: &str, status: String) {
        self.empty_state_visible = true;
        self.content_visible = false;
        self.empty_message = message.to_string();
        self.status = status;
    }

    pub fn show_loading(&mut self) {
        self.status = "Loading…".to_string();
    }
}

/// `Generated: <ts>`, or `Generated: -` when the snapshot has no timestamp.
pub fn generated_label(generated_at: Option<&str>) -> String {
    format!("Generated: {}", generated_at.unwrap_or("-"))
}
