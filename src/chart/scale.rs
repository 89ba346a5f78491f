//! Linear scaling of data into plot coordinates.

/// Map `value` into `[padding, axis_len - padding]`, inverted so larger
/// values land on smaller coordinates ("up" on screen).
///
/// A flat range (`max == min`) returns the axis midpoint `axis_len / 2` for
/// any input. That keeps flat series drawable; the position carries no
/// information.
pub fn scale_value(value: f64, min: f64, max: f64, axis_len: f64, padding: f64) -> f64 {
    if max == min {
        return axis_len / 2.0;
    }
    let pct = (value - min) / (max - min);
    axis_len - padding - pct * (axis_len - padding * 2.0)
}

/// Position of the `index`-th of `total` items along an axis by rank.
///
/// `total <= 1` returns the axis midpoint.
pub fn scale_index(index: usize, total: usize, axis_len: f64, padding: f64) -> f64 {
    if total <= 1 {
        return axis_len / 2.0;
    }
    let pct = index as f64 / (total - 1) as f64;
    padding + pct * (axis_len - padding * 2.0)
}

/// Minimum and maximum of the finite values, or `None` when there are none.
pub fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_value_maps_extremes_to_padded_edges() {
        assert_eq!(scale_value(0.0, 0.0, 10.0, 280.0, 28.0), 252.0);
        assert_eq!(scale_value(10.0, 0.0, 10.0, 280.0, 28.0), 28.0);
        assert_eq!(scale_value(5.0, 0.0, 10.0, 280.0, 28.0), 140.0);
    }

    #[test]
    fn scale_value_flat_range_returns_midpoint() {
        for x in [-3.0, 0.0, 5.0, 1e9] {
            assert_eq!(scale_value(x, 5.0, 5.0, 280.0, 28.0), 140.0);
        }
    }

    #[test]
    fn scale_index_spreads_across_axis() {
        assert_eq!(scale_index(0, 3, 640.0, 28.0), 28.0);
        assert_eq!(scale_index(1, 3, 640.0, 28.0), 320.0);
        assert_eq!(scale_index(2, 3, 640.0, 28.0), 612.0);
    }

    #[test]
    fn scale_index_single_item_is_centered() {
        assert_eq!(scale_index(0, 1, 640.0, 28.0), 320.0);
        assert_eq!(scale_index(7, 1, 640.0, 28.0), 320.0);
        assert_eq!(scale_index(0, 0, 640.0, 28.0), 320.0);
    }

    #[test]
    fn finite_range_ignores_nan() {
        assert_eq!(finite_range([3.0, f64::NAN, -1.0, 8.0]), Some((-1.0, 8.0)));
        assert_eq!(finite_range([f64::NAN]), None);
        assert_eq!(finite_range(Vec::new()), None);
    }
}
