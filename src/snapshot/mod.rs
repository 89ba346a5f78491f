//! Dashboard snapshot data model.
//!
//! A snapshot is the single JSON document produced by the external exporter.
//! Every measurement is optional: sensor dropouts, missing columns, and
//! non-numeric junk all deserialize to `None` instead of failing the parse.
//! Only structurally broken JSON is rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The complete dashboard payload at a point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// `false` when the exporter found no running workouts yet.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub has_data: bool,
    #[serde(default, deserialize_with = "lenient_string")]
    pub generated_at: Option<String>,
    /// Optional human-readable reason accompanying `has_data: false`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kpis: KpiSet,
    #[serde(default, deserialize_with = "null_as_default")]
    pub series: SeriesSet,
}

impl Snapshot {
    /// Parse a snapshot from raw response bytes.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// Headline statistics shown as KPI cards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KpiSet {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_runs: Option<u64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lifetime_distance_km: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weekly_mileage_km: Option<f64>,
    /// 7-day over 28-day mileage ratio.
    #[serde(default, deserialize_with = "lenient_number")]
    pub training_load_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub latest_run_date: Option<String>,
    /// Minutes per kilometre.
    #[serde(default, deserialize_with = "lenient_number")]
    pub latest_run_pace: Option<f64>,
}

/// One ordered sequence per chart plus the run log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesSet {
    #[serde(default, deserialize_with = "null_as_default")]
    pub monthly_mileage: Vec<RunPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pace_vs_hr: Vec<RunPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cadence_trend: Vec<RunPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub distance_trend: Vec<RunPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub run_table: Vec<RunPoint>,
}

/// A single workout's measurements. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunPoint {
    #[serde(default, deserialize_with = "lenient_string")]
    pub workout_date: Option<String>,
    /// Month label (`YYYY-MM`) used by the monthly mileage series.
    #[serde(default, deserialize_with = "lenient_string")]
    pub month: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub distance_km: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub duration_min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_hr: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub max_hr: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_cadence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_pace_min_per_km: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hr_efficiency: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_temperature: Option<f64>,
}

// ---------------------------------------------------------------------------
// Field selection
// ---------------------------------------------------------------------------

/// Selects one numeric measurement of a [`RunPoint`] for plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DistanceKm,
    DurationMin,
    AvgHr,
    MaxHr,
    AvgCadence,
    AvgPace,
    HrEfficiency,
    Calories,
    AvgTemperature,
}

impl Field {
    /// Read the field, returning `None` for absent or non-finite values.
    pub fn value(self, point: &RunPoint) -> Option<f64> {
        let raw = match self {
            Self::DistanceKm => point.distance_km,
            Self::DurationMin => point.duration_min,
            Self::AvgHr => point.avg_hr,
            Self::MaxHr => point.max_hr,
            Self::AvgCadence => point.avg_cadence,
            Self::AvgPace => point.avg_pace_min_per_km,
            Self::HrEfficiency => point.hr_efficiency,
            Self::Calories => point.calories,
            Self::AvgTemperature => point.avg_temperature,
        };
        raw.filter(|v| v.is_finite())
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DistanceKm => write!(f, "distance_km"),
            Self::DurationMin => write!(f, "duration_min"),
            Self::AvgHr => write!(f, "avg_hr"),
            Self::MaxHr => write!(f, "max_hr"),
            Self::AvgCadence => write!(f, "avg_cadence"),
            Self::AvgPace => write!(f, "avg_pace_min_per_km"),
            Self::HrEfficiency => write!(f, "hr_efficiency"),
            Self::Calories => write!(f, "calories"),
            Self::AvgTemperature => write!(f, "avg_temperature"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient deserializers
// ---------------------------------------------------------------------------

/// Coerce a JSON value to a number: numbers pass, numeric strings parse,
/// everything else is absent.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Some(n) = value.as_u64() {
        return Ok(Some(n));
    }
    Ok(coerce_number(&value)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0)
        .map(|v| v as u64))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_snapshot() {
        let snap = Snapshot::from_slice(br#"{"has_data": false, "generated_at": "2024-01-01"}"#)
            .unwrap();
        assert!(!snap.has_data);
        assert_eq!(snap.generated_at.as_deref(), Some("2024-01-01"));
        assert!(snap.series.run_table.is_empty());
        assert_eq!(snap.kpis.total_runs, None);
    }

    #[test]
    fn non_numeric_fields_become_absent() {
        let json = r#"{
            "workout_date": "2024-03-01",
            "distance_km": "5.25",
            "avg_hr": "n/a",
            "max_hr": null,
            "avg_cadence": true,
            "calories": "",
            "duration_min": [1, 2]
        }"#;
        let point: RunPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.distance_km, Some(5.25));
        assert_eq!(point.avg_hr, None);
        assert_eq!(point.max_hr, None);
        assert_eq!(point.avg_cadence, None);
        assert_eq!(point.calories, None);
        assert_eq!(point.duration_min, None);
        assert_eq!(point.avg_temperature, None);
    }

    #[test]
    fn null_series_is_empty() {
        let snap = Snapshot::from_slice(
            br#"{"has_data": true, "kpis": null, "series": {"pace_vs_hr": null}}"#,
        )
        .unwrap();
        assert!(snap.has_data);
        assert!(snap.series.pace_vs_hr.is_empty());
    }

    #[test]
    fn total_runs_accepts_integral_float() {
        let kpis: KpiSet = serde_json::from_str(r#"{"total_runs": 12.0}"#).unwrap();
        assert_eq!(kpis.total_runs, Some(12));
        let kpis: KpiSet = serde_json::from_str(r#"{"total_runs": -3}"#).unwrap();
        assert_eq!(kpis.total_runs, None);
    }

    #[test]
    fn field_selector_reads_values() {
        let point = RunPoint {
            avg_cadence: Some(172.0),
            avg_pace_min_per_km: Some(f64::NAN),
            ..RunPoint::default()
        };
        assert_eq!(Field::AvgCadence.value(&point), Some(172.0));
        assert_eq!(Field::AvgPace.value(&point), None);
        assert_eq!(Field::DistanceKm.value(&point), None);
    }

    #[test]
    fn broken_json_is_rejected() {
        assert!(Snapshot::from_slice(b"{not json").is_err());
    }
}
