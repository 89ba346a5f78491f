use crate::snapshot::RunPoint;

use super::format::{PLACEHOLDER, format_number, format_pace};

/// Column headings, in display order.
pub const COLUMNS: [&str; 10] = [
    "Date",
    "Distance (km)",
    "Duration (min)",
    "Avg HR",
    "Max HR",
    "Cadence",
    "Pace",
    "HR Efficiency",
    "Calories",
    "Temp (°C)",
];

/// One formatted row of the run log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: [String; 10],
}

impl TableRow {
    /// Format every column independently; a bad field never affects its
    /// neighbours.
    pub fn from_point(p: &RunPoint) -> Self {
        Self {
            cells: [
                p.workout_date
                    .clone()
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
                format_number(p.distance_km, 2),
                format_number(p.duration_min, 1),
                format_number(p.avg_hr, 0),
                format_number(p.max_hr, 0),
                format_number(p.avg_cadence, 1),
                format_pace(p.avg_pace_min_per_km),
                format_number(p.hr_efficiency, 4),
                format_number(p.calories, 0),
                format_number(p.avg_temperature, 1),
            ],
        }
    }

    pub fn date(&self) -> &str {
        &self.cells[0]
    }
}

/// The table body mount point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTable {
    rows: Vec<TableRow>,
}

impl RunTable {
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Replace the body with `points`, newest `workout_date` first.
    ///
    /// Dates compare as plain strings, which orders correctly only for
    /// zero-padded `YYYY-MM-DD`. Rows without a date sort last.
    pub fn render(&mut self, points: &[RunPoint]) {
        let mut sorted: Vec<&RunPoint> = points.iter().collect();
        sorted.sort_by(|a, b| b.workout_date.cmp(&a.workout_date));
        self.rows = sorted.into_iter().map(TableRow::from_point).collect();
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
