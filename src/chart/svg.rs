//! Inline SVG rendering target.

use std::fmt::Write as _;

use super::{ChartFrame, DrawSurface, Paint, Stroke};
use crate::present::escape_html;

const AXIS_COLOR: &str = "#a8b3ac";

/// An SVG element built up from drawing primitives.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    id: String,
    frame: ChartFrame,
    body: String,
}

impl SvgSurface {
    /// Create an empty surface with the given element id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            frame: ChartFrame::STANDARD,
            body: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Child elements only, without the enclosing `<svg>`.
    pub fn inner(&self) -> &str {
        &self.body
    }

    /// Complete `<svg>` element.
    pub fn to_markup(&self) -> String {
        format!(
            r#"<svg id="{id}" viewBox="0 0 {w} {h}" preserveAspectRatio="none" role="img">{body}</svg>"#,
            id = escape_html(&self.id),
            w = coord(self.frame.width),
            h = coord(self.frame.height),
            body = self.body,
        )
    }
}

/// Format a coordinate with at most two decimals and no trailing zeros.
fn coord(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

impl DrawSurface for SvgSurface {
    fn frame(&self) -> ChartFrame {
        self.frame
    }

    fn clear(&mut self) {
        self.body.clear();
    }

    fn axis_guide(&mut self, frame: &ChartFrame) {
        let _ = write!(
            self.body,
            r#"<path d="M {p} {p} V {b} H {r}" stroke="{AXIS_COLOR}" fill="none" stroke-width="1"/>"#,
            p = coord(frame.padding),
            b = coord(frame.baseline()),
            r = coord(frame.width - frame.padding),
        );
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &Stroke) {
        if points.is_empty() {
            return;
        }
        let d: Vec<String> = points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                let cmd = if i == 0 { "M" } else { "L" };
                format!("{cmd} {} {}", coord(x), coord(y))
            })
            .collect();
        let _ = write!(
            self.body,
            r#"<path d="{d}" fill="none" stroke="{color}" stroke-width="{w}"/>"#,
            d = d.join(" "),
            color = escape_html(&stroke.color),
            w = coord(stroke.width),
        );
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, paint: &Paint) {
        let _ = write!(
            self.body,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}" opacity="{}"/>"#,
            coord(cx),
            coord(cy),
            coord(r),
            escape_html(&paint.color),
            coord(paint.opacity),
        );
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint) {
        let _ = write!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}" opacity="{}"/>"#,
            coord(x),
            coord(y),
            coord(width),
            coord(height),
            escape_html(&paint.color),
            coord(paint.opacity),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_trims_trailing_zeros() {
        assert_eq!(coord(28.0), "28");
        assert_eq!(coord(3.5), "3.5");
        assert_eq!(coord(1.0 / 3.0), "0.33");
        assert_eq!(coord(-0.001), "0");
    }

    #[test]
    fn axis_guide_matches_frame() {
        let mut svg = SvgSurface::new("monthlyChart");
        svg.axis_guide(&ChartFrame::STANDARD);
        assert!(svg.inner().contains(r#"d="M 28 28 V 252 H 612""#));
    }

    #[test]
    fn clear_removes_previous_content() {
        let mut svg = SvgSurface::new("c");
        svg.circle(1.0, 2.0, 3.0, &Paint::new("#fff", 1.0));
        svg.clear();
        assert!(svg.inner().is_empty());
        assert!(svg.to_markup().starts_with(r#"<svg id="c" viewBox="0 0 640 280""#));
    }
}
