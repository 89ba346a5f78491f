//! Number and pace formatting for display.

/// Placeholder shown for any value that cannot be displayed.
pub const PLACEHOLDER: &str = "-";

/// Fixed-decimal representation, or [`PLACEHOLDER`] for absent and
/// non-finite values.
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Pace in `M:SS /km`.
///
/// Seconds are rounded to the nearest integer; a rounding result of 60
/// carries into the minutes (`6.9999` is `7:00 /km`, never `6:60 /km`).
pub fn format_pace(minutes_per_km: Option<f64>) -> String {
    let Some(pace) = minutes_per_km.filter(|v| v.is_finite()) else {
        return PLACEHOLDER.to_string();
    };
    let mut minutes = pace.floor() as i64;
    let mut seconds = ((pace - pace.floor()) * 60.0).round() as i64;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    format!("{minutes}:{seconds:02} /km")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_uses_exact_decimals() {
        assert_eq!(format_number(Some(5.0), 1), "5.0");
        assert_eq!(format_number(Some(5.257), 2), "5.26");
        assert_eq!(format_number(Some(151.6), 0), "152");
        assert_eq!(format_number(Some(0.123456), 4), "0.1235");
    }

    #[test]
    fn format_number_placeholder_for_missing_and_nan() {
        assert_eq!(format_number(None, 1), "-");
        assert_eq!(format_number(Some(f64::NAN), 2), "-");
        assert_eq!(format_number(Some(f64::INFINITY), 2), "-");
    }

    #[test]
    fn format_number_decimal_count_holds_across_magnitudes() {
        for v in [0.0, 1.0, -2.5, 12345.678, 1e-7] {
            for d in 0..5 {
                let s = format_number(Some(v), d);
                let digits = s.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0);
                assert_eq!(digits, d, "{v} with {d} decimals gave {s}");
            }
        }
    }

    #[test]
    fn format_pace_regular_values() {
        assert_eq!(format_pace(Some(5.5)), "5:30 /km");
        assert_eq!(format_pace(Some(4.0)), "4:00 /km");
        assert_eq!(format_pace(Some(6.25)), "6:15 /km");
    }

    #[test]
    fn format_pace_carries_sixty_seconds() {
        assert_eq!(format_pace(Some(6.9999)), "7:00 /km");
        assert_eq!(format_pace(Some(4.995)), "5:00 /km");
    }

    #[test]
    fn format_pace_placeholder_for_missing() {
        assert_eq!(format_pace(None), "-");
        assert_eq!(format_pace(Some(f64::NAN)), "-");
    }
}
