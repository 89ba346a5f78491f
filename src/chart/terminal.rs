//! Character-grid rendering target for terminal output.

use colored::Colorize;

use super::{ChartFrame, DrawSurface, Paint, Stroke};

const AXIS_COLOR: &str = "#a8b3ac";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    glyph: char,
    color: Option<(u8, u8, u8)>,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    color: None,
};

/// A fixed-size character grid that approximates the logical chart frame.
#[derive(Debug, Clone)]
pub struct TerminalSurface {
    frame: ChartFrame,
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl TerminalSurface {
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(2);
        let rows = rows.max(2);
        Self {
            frame: ChartFrame::STANDARD,
            cols,
            rows,
            cells: vec![BLANK; cols * rows],
        }
    }

    /// Render the grid as text, one line per row.
    ///
    /// With `colorize`, glyphs carry their paint as 24-bit ANSI colour.
    pub fn render(&self, colorize: bool) -> String {
        let mut out = String::with_capacity(self.cells.len() * 2);
        for row in self.cells.chunks(self.cols) {
            let line: String = row
                .iter()
                .map(|cell| match (colorize, cell.color) {
                    (true, Some((r, g, b))) => cell.glyph.to_string().truecolor(r, g, b).to_string(),
                    _ => cell.glyph.to_string(),
                })
                .collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    fn col(&self, x: f64) -> Option<usize> {
        to_cell(x, self.frame.width, self.cols)
    }

    fn row(&self, y: f64) -> Option<usize> {
        to_cell(y, self.frame.height, self.rows)
    }

    fn plot(&mut self, col: usize, row: usize, glyph: char, color: &str) {
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = Cell {
                glyph,
                color: parse_hex(color),
            };
        }
    }

    fn plot_logical(&mut self, x: f64, y: f64, glyph: char, color: &str) {
        if let (Some(c), Some(r)) = (self.col(x), self.row(y)) {
            self.plot(c, r, glyph, color);
        }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new(64, 14)
    }
}

fn to_cell(v: f64, extent: f64, cells: usize) -> Option<usize> {
    if !v.is_finite() || extent <= 0.0 {
        return None;
    }
    let idx = (v / extent * (cells - 1) as f64).round();
    if idx < 0.0 || idx > (cells - 1) as f64 {
        None
    } else {
        Some(idx as usize)
    }
}

/// `#rrggbb` to an RGB triple.
fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

impl DrawSurface for TerminalSurface {
    fn frame(&self) -> ChartFrame {
        self.frame
    }

    fn clear(&mut self) {
        self.cells.fill(BLANK);
    }

    fn axis_guide(&mut self, frame: &ChartFrame) {
        let (Some(left), Some(top), Some(bottom), Some(right)) = (
            self.col(frame.padding),
            self.row(frame.padding),
            self.row(frame.baseline()),
            self.col(frame.width - frame.padding),
        ) else {
            return;
        };
        for r in top..bottom {
            self.plot(left, r, '│', AXIS_COLOR);
        }
        for c in left + 1..=right {
            self.plot(c, bottom, '─', AXIS_COLOR);
        }
        self.plot(left, bottom, '└', AXIS_COLOR);
    }

    fn polyline(&mut self, points: &[(f64, f64)], stroke: &Stroke) {
        for pair in points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            // Sample densely enough to touch every column and row in between.
            let steps = (self.cols.max(self.rows) * 2).max(1);
            for s in 0..=steps {
                let t = s as f64 / steps as f64;
                self.plot_logical(x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, '·', &stroke.color);
            }
        }
    }

    fn circle(&mut self, cx: f64, cy: f64, _r: f64, paint: &Paint) {
        self.plot_logical(cx, cy, '●', &paint.color);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint) {
        let (Some(c0), Some(c1), Some(r0), Some(r1)) = (
            self.col(x),
            self.col(x + width),
            self.row(y),
            self.row(y + height),
        ) else {
            return;
        };
        for r in r0..=r1 {
            for c in c0..=c1.max(c0) {
                self.plot(c, r, '█', &paint.color);
            }
        }
    }
}
