//! Declarative recording surface.

use super::{ChartFrame, DrawSurface, Paint, Stroke};

/// One recorded drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    AxisGuide(ChartFrame),
    Polyline {
        points: Vec<(f64, f64)>,
        stroke: Stroke,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        paint: Paint,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        paint: Paint,
    },
}

/// A surface that keeps the primitives it receives, in order.
///
/// Useful for inspecting renderer output and for replaying a chart onto
/// another surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    primitives: Vec<Primitive>,
}

impl Scene {
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Draw every recorded primitive onto `target`, after clearing it.
    pub fn replay<S: DrawSurface + ?Sized>(&self, target: &mut S) {
        target.clear();
        for primitive in &self.primitives {
            match primitive {
                Primitive::AxisGuide(frame) => target.axis_guide(frame),
                Primitive::Polyline { points, stroke } => target.polyline(points, stroke),
                Primitive::Circle { cx, cy, r, paint } => target.circle(*cx, *cy, *r, paint),
                Primitive::Rect {
                    x,
                    y,
                    width,
                    height,
                    paint,
                } => target.rect(*x, *y, *width, *height, paint),
            }
        }
    }

    pub fn polylines(&self) -> impl Iterator<Item = Vec<(f64, f64)>> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Polyline { points, .. } => Some(points.clone()),
            _ => None,
        })
    }

    /// `(cx, cy, r)` of every circle.
    pub fn circles(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Circle { cx, cy, r, .. } => Some((*cx, *cy, *r)),
            _ => None,
        })
    }

    /// `(x, y, width, height)` of every rectangle.
    pub fn rects(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Rect {
                x,
                y,
                width,
                height,
                ..
            } => Some((*x, *y, *width, *height)),
            _ => None,
        })
    }
}

impl DrawSurface for Scene {
    fn clear(&mut self) {
        self.primitives.clear();
    }

    fn axis_guide(&mut self, frame: &ChartFrame) {
        self.primitives.push(Primitive::AxisGuide(*frame));
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &Stroke) {
        self.primitives.push(Primitive::Polyline {
            points: points.to_vec(),
            stroke: stroke.clone(),
        });
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, paint: &Paint) {
        self.primitives.push(Primitive::Circle {
            cx,
            cy,
            r,
            paint: paint.clone(),
        });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint) {
        self.primitives.push(Primitive::Rect {
            x,
            y,
            width,
            height,
            paint: paint.clone(),
        });
    }
}
