use crate::snapshot::KpiSet;

use super::format::{PLACEHOLDER, format_number, format_pace};

/// One labelled headline statistic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiCard {
    pub label: &'static str,
    pub value: String,
}

/// The KPI mount point: a fixed-order list of cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KpiPanel {
    cards: Vec<KpiCard>,
}

impl KpiPanel {
    pub fn cards(&self) -> &[KpiCard] {
        &self.cards
    }

    /// Replace all cards with the six KPIs, in display order.
    pub fn render(&mut self, kpis: &KpiSet) {
        self.cards = vec![
            card(
                "Total Runs",
                kpis.total_runs
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
            ),
            card("Lifetime Distance", with_unit(kpis.lifetime_distance_km, 1, "km")),
            card("Weekly Mileage", with_unit(kpis.weekly_mileage_km, 1, "km")),
            card("7d vs 28d Ratio", format_number(kpis.training_load_ratio, 2)),
            card(
                "Latest Run",
                kpis.latest_run_date
                    .clone()
                    .unwrap_or_else(|| PLACEHOLDER.to_string()),
            ),
            card("Latest Pace", format_pace(kpis.latest_run_pace)),
        ];
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }
}

fn card(label: &'static str, value: String) -> KpiCard {
    KpiCard { label, value }
}

/// `12.3 km`, or the bare placeholder when the value is missing.
fn with_unit(value: Option<f64>, decimals: usize, unit: &str) -> String {
    let formatted = format_number(value, decimals);
    if formatted == PLACEHOLDER {
        formatted
    } else {
        format!("{formatted} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KpiSet {
        KpiSet {
            total_runs: Some(42),
            lifetime_distance_km: Some(512.345),
            weekly_mileage_km: Some(31.0),
            training_load_ratio: Some(1.234),
            latest_run_date: Some("2024-05-01".to_string()),
            latest_run_pace: Some(5.25),
        }
    }

    #[test]
    fn renders_six_cards_in_order() {
        let mut panel = KpiPanel::default();
        panel.render(&sample());
        let labels: Vec<_> = panel.cards().iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            [
                "Total Runs",
                "Lifetime Distance",
                "Weekly Mileage",
                "7d vs 28d Ratio",
                "Latest Run",
                "Latest Pace"
            ]
        );
        let values: Vec<_> = panel.cards().iter().map(|c| c.value.as_str()).collect();
        assert_eq!(
            values,
            ["42", "512.3 km", "31.0 km", "1.23", "2024-05-01", "5:15 /km"]
        );
    }

    #[test]
    fn repeated_render_replaces_content() {
        let mut panel = KpiPanel::default();
        panel.render(&sample());
        panel.render(&KpiSet::default());
        assert_eq!(panel.cards().len(), 6);
        assert!(panel.cards().iter().all(|c| c.value == "-"));
    }
}
