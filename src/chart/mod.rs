//! Chart rendering against a small declarative drawing interface.
//!
//! The renderers in this module know nothing about SVG, canvases, or
//! terminals. They map [`RunPoint`] sequences into a fixed 640 x 280 logical
//! frame and emit primitives through [`DrawSurface`]. Concrete targets live
//! in the submodules:
//!
//! - [`scene::Scene`] — records primitives (inspection and tests)
//! - [`svg::SvgSurface`] — inline SVG markup for the web page
//! - [`terminal::TerminalSurface`] — character grid for `paceboard show`
//!
//! Every renderer clears the surface and draws the axis guide before
//! anything else, so the frame is visible even with no data.

pub mod scale;
pub mod scene;
pub mod svg;
pub mod terminal;

use crate::snapshot::{Field, RunPoint};

use scale::{finite_range, scale_index, scale_value};

/// Logical chart width.
pub const CHART_WIDTH: f64 = 640.0;
/// Logical chart height.
pub const CHART_HEIGHT: f64 = 280.0;
/// Padding between the frame edge and the plotting area.
pub const CHART_PADDING: f64 = 28.0;

// ---------------------------------------------------------------------------
// Drawing interface
// ---------------------------------------------------------------------------

/// Fixed plotting frame shared by all charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl ChartFrame {
    pub const STANDARD: Self = Self {
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        padding: CHART_PADDING,
    };

    /// Width available for data between the left and right padding.
    pub fn plot_width(&self) -> f64 {
        self.width - self.padding * 2.0
    }

    /// Height available for data between the top and bottom padding.
    pub fn plot_height(&self) -> f64 {
        self.height - self.padding * 2.0
    }

    /// Y coordinate of the x axis.
    pub fn baseline(&self) -> f64 {
        self.height - self.padding
    }
}

impl Default for ChartFrame {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Fill or stroke colour with opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: String,
    pub opacity: f64,
}

impl Paint {
    pub fn new(color: impl Into<String>, opacity: f64) -> Self {
        Self {
            color: color.into(),
            opacity,
        }
    }
}

/// Stroke used for polylines.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

/// Target for chart primitives.
///
/// Coordinates are logical units inside the surface's [`ChartFrame`].
pub trait DrawSurface {
    /// The frame this surface draws into.
    fn frame(&self) -> ChartFrame {
        ChartFrame::STANDARD
    }

    /// Remove everything previously drawn.
    fn clear(&mut self);

    /// Left and bottom axis lines.
    fn axis_guide(&mut self, frame: &ChartFrame);

    /// Connected line through `points`.
    fn polyline(&mut self, points: &[(f64, f64)], stroke: &Stroke);

    fn circle(&mut self, cx: f64, cy: f64, r: f64, paint: &Paint);

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint);
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

/// Visual style of one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub color: String,
    pub line_width: f64,
    pub marker_radius: f64,
    pub opacity: f64,
}

impl ChartStyle {
    /// Line chart style with the default stroke and markers.
    pub fn line(color: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.5,
            marker_radius: 3.5,
            opacity: 0.85,
        }
    }

    /// Bar chart style.
    pub fn bars(color: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 0.0,
            marker_radius: 0.0,
            opacity: 0.85,
        }
    }

    /// Scatter plot style.
    pub fn scatter(color: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 0.0,
            marker_radius: 4.0,
            opacity: 0.75,
        }
    }

    fn paint(&self) -> Paint {
        Paint::new(self.color.clone(), self.opacity)
    }

    fn stroke(&self) -> Stroke {
        Stroke {
            color: self.color.clone(),
            width: self.line_width,
        }
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

fn begin<S: DrawSurface + ?Sized>(surface: &mut S) -> ChartFrame {
    let frame = surface.frame();
    surface.clear();
    surface.axis_guide(&frame);
    frame
}

/// Line chart of `field` by rank, with a marker at every plotted point.
///
/// Points whose value is absent are skipped; they still occupy their rank
/// slot so the x spacing reflects the full sequence.
pub fn render_line<S: DrawSurface + ?Sized>(
    surface: &mut S,
    points: &[RunPoint],
    field: Field,
    style: &ChartStyle,
) {
    let frame = begin(surface);
    let Some((min, max)) = finite_range(points.iter().filter_map(|p| field.value(p))) else {
        return;
    };

    let total = points.len();
    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            let v = field.value(p)?;
            Some((
                scale_index(i, total, frame.width, frame.padding),
                scale_value(v, min, max, frame.height, frame.padding),
            ))
        })
        .collect();

    if coords.len() >= 2 {
        surface.polyline(&coords, &style.stroke());
    }

    let paint = style.paint();
    for &(x, y) in &coords {
        surface.circle(x, y, style.marker_radius, &paint);
    }
}

/// Bar chart of `field`, one bar per point standing on the baseline.
///
/// The scale maximum never drops below 1, and every drawn bar is at least
/// one unit tall so zero values stay visible. Absent values draw no bar.
pub fn render_bars<S: DrawSurface + ?Sized>(
    surface: &mut S,
    points: &[RunPoint],
    field: Field,
    style: &ChartStyle,
) {
    let frame = begin(surface);
    if points.is_empty() {
        return;
    }

    let max = points
        .iter()
        .filter_map(|p| field.value(p))
        .fold(1.0_f64, f64::max);
    let slot = frame.plot_width() / points.len() as f64;
    let bar_width = (slot - 2.0).max(2.0);
    let paint = style.paint();

    for (i, point) in points.iter().enumerate() {
        let Some(value) = field.value(point) else {
            continue;
        };
        let top = scale_value(value, 0.0, max, frame.height, frame.padding);
        let height = (frame.baseline() - top).max(1.0);
        let x = frame.padding + i as f64 * slot + 1.0;
        surface.rect(x, frame.baseline() - height, bar_width, height, &paint);
    }
}

/// Heart rate (x) against pace (y) scatter plot.
///
/// Each axis is scaled over its own range; a zero range divides by 1. The
/// pace axis is not inverted: smaller paces are faster and plot higher.
pub fn render_scatter<S: DrawSurface + ?Sized>(
    surface: &mut S,
    points: &[RunPoint],
    style: &ChartStyle,
) {
    let frame = begin(surface);

    let pairs: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| Some((Field::AvgHr.value(p)?, Field::AvgPace.value(p)?)))
        .collect();
    let Some((min_x, max_x)) = finite_range(pairs.iter().map(|&(x, _)| x)) else {
        return;
    };
    let Some((min_y, max_y)) = finite_range(pairs.iter().map(|&(_, y)| y)) else {
        return;
    };
    let span_x = nonzero_span(max_x - min_x);
    let span_y = nonzero_span(max_y - min_y);
    let paint = style.paint();

    for (hr, pace) in pairs {
        let x = frame.padding + (hr - min_x) / span_x * frame.plot_width();
        let y = frame.padding + (pace - min_y) / span_y * frame.plot_height();
        surface.circle(x, y, style.marker_radius, &paint);
    }
}

fn nonzero_span(span: f64) -> f64 {
    if span == 0.0 { 1.0 } else { span }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::scene::{Primitive, Scene};
    use super::*;

    fn point_with(field: Field, value: f64) -> RunPoint {
        let mut p = RunPoint::default();
        match field {
            Field::DistanceKm => p.distance_km = Some(value),
            Field::AvgCadence => p.avg_cadence = Some(value),
            _ => unreachable!("test helper only covers distance and cadence"),
        }
        p
    }

    #[test]
    fn line_with_single_point_centers_marker() {
        let mut scene = Scene::default();
        render_line(
            &mut scene,
            &[point_with(Field::AvgCadence, 170.0)],
            Field::AvgCadence,
            &ChartStyle::line("#0c4a3a"),
        );
        assert_eq!(scene.polylines().count(), 0);
        let circles: Vec<_> = scene.circles().collect();
        assert_eq!(circles.len(), 1);
        assert_eq!((circles[0].0, circles[0].1), (320.0, 140.0));
    }

    #[test]
    fn line_skips_absent_values_but_keeps_rank() {
        let points = vec![
            point_with(Field::DistanceKm, 4.0),
            RunPoint::default(),
            point_with(Field::DistanceKm, 8.0),
        ];
        let mut scene = Scene::default();
        render_line(&mut scene, &points, Field::DistanceKm, &ChartStyle::line("#b45709"));
        let line = scene.polylines().next().unwrap();
        assert_eq!(line, vec![(28.0, 252.0), (612.0, 28.0)]);
    }

    #[test]
    fn bars_use_floor_of_one_for_max() {
        let points = vec![point_with(Field::DistanceKm, 0.5)];
        let mut scene = Scene::default();
        render_bars(&mut scene, &points, Field::DistanceKm, &ChartStyle::bars("#296f8f"));
        let rects: Vec<_> = scene.rects().collect();
        assert_eq!(rects.len(), 1);
        // Half of the 224-unit plot height.
        assert!((rects[0].3 - 112.0).abs() < 1e-9);
        assert!((rects[0].1 + rects[0].3 - 252.0).abs() < 1e-9);
    }

    #[test]
    fn scatter_plots_faster_pace_higher() {
        let fast = RunPoint {
            avg_hr: Some(150.0),
            avg_pace_min_per_km: Some(4.5),
            ..RunPoint::default()
        };
        let slow = RunPoint {
            avg_hr: Some(140.0),
            avg_pace_min_per_km: Some(6.0),
            ..RunPoint::default()
        };
        let mut scene = Scene::default();
        render_scatter(&mut scene, &[fast, slow], &ChartStyle::scatter("#1f7a63"));
        let circles: Vec<_> = scene.circles().collect();
        assert_eq!(circles.len(), 2);
        assert_eq!((circles[0].0, circles[0].1), (612.0, 28.0));
        assert_eq!((circles[1].0, circles[1].1), (28.0, 252.0));
    }

    #[test]
    fn every_renderer_starts_with_axes() {
        let mut scene = Scene::default();
        render_scatter(&mut scene, &[], &ChartStyle::scatter("#000"));
        assert!(matches!(scene.primitives()[0], Primitive::AxisGuide(_)));
        assert_eq!(scene.primitives().len(), 1);
    }
}
