use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;
use crate::buffer::RollingSeries;
use crate::data::Symbol;

pub const X_AXIS_TITLE: &str = "Date";
pub const Y_AXIS_TITLE: &str = "Price (USD)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceChange {
    pub difference: Decimal,
    pub percentage: Decimal,
}

pub fn price_change(previous: Decimal, current: Decimal) -> PriceChange {
    let difference = current - previous;
    let percentage = difference
        .checked_div(previous)
        .map(|ratio| ratio * Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO);

    PriceChange { difference, percentage }
}

fn usd(value: Decimal) -> String {
    format!("{:.2}", value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Line chart state for the symbol on screen. Updated in place on every redraw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chart {
    pub title: String,
    pub labels: Vec<String>,
    pub prices: Vec<Decimal>,
    pub revision: u64,
}

impl Chart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, symbol: Symbol, series: &RollingSeries) {
        self.title = format!("{} Prices", symbol);
        self.labels.clear();
        self.labels.extend(series.labels().iter().cloned());
        self.prices.clear();
        self.prices.extend(series.prices().iter().copied());
        self.revision += 1;
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Hover text for a point, compared against the point drawn just before it.
    pub fn tooltip(&self, index: usize) -> Option<Vec<String>> {
        let current = *self.prices.get(index)?;
        let mut lines = vec![format!("Price: ${}", usd(current))];

        if index > 0 {
            let change = price_change(self.prices[index - 1], current);
            let change_text = if change.percentage > Decimal::ZERO {
                format!("↑ +{}%", usd(change.percentage))
            } else {
                format!("↓ {}%", usd(change.percentage))
            };
            lines.push(format!("Difference: ${} ({})", usd(change.difference), change_text));
        }

        Some(lines)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} [{} | {}]", self.title, X_AXIS_TITLE, Y_AXIS_TITLE);

        if self.is_empty() {
            let _ = writeln!(out, "  (no data)");
            return out;
        }

        for (label, price) in self.labels.iter().zip(&self.prices) {
            let _ = writeln!(out, "  {:<20} ${:>10}", label, usd(*price));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_with(prices: &[i64]) -> Chart {
        let mut series = RollingSeries::new(10);
        for (i, cents) in prices.iter().enumerate() {
            series.push(format!("t{}", i), Decimal::new(*cents, 2));
        }
        let mut chart = Chart::new();
        chart.update(Symbol::Bitcoin, &series);
        chart
    }

    #[test]
    fn first_point_shows_price_only() {
        let chart = chart_with(&[10000, 11000]);
        assert_eq!(chart.tooltip(0).unwrap(), vec!["Price: $100.00".to_string()]);
        assert_eq!(chart.title, "Bitcoin Prices");
    }

    #[test]
    fn rising_point_shows_up_arrow() {
        let chart = chart_with(&[10000, 11000]);
        assert_eq!(
            chart.tooltip(1).unwrap(),
            vec![
                "Price: $110.00".to_string(),
                "Difference: $10.00 (↑ +10.00%)".to_string(),
            ]
        );
    }

    #[test]
    fn falling_or_flat_point_shows_down_arrow() {
        let chart = chart_with(&[20000, 15000, 15000]);
        assert_eq!(chart.tooltip(1).unwrap()[1], "Difference: $-50.00 (↓ -25.00%)");
        assert_eq!(chart.tooltip(2).unwrap()[1], "Difference: $0.00 (↓ 0.00%)");
    }

    #[test]
    fn out_of_range_index_has_no_tooltip() {
        assert!(chart_with(&[10000]).tooltip(3).is_none());
    }

    #[test]
    fn update_replaces_data_in_place() {
        let mut chart = chart_with(&[10000, 11000, 12000]);
        let mut series = RollingSeries::new(10);
        series.push("only".into(), Decimal::new(500, 0));
        chart.update(Symbol::Ripple, &series);

        assert_eq!(chart.revision, 2);
        assert_eq!(chart.labels, vec!["only".to_string()]);
        assert_eq!(chart.title, "Ripple Prices");
        assert!(chart.render().contains("500.00"));
    }

    #[test]
    fn midpoints_round_away_from_zero() {
        let chart = chart_with(&[80000, 80100, 80000]);
        assert_eq!(chart.tooltip(1).unwrap()[1], "Difference: $1.00 (↑ +0.13%)");
        assert_eq!(chart.tooltip(2).unwrap()[1], "Difference: $-1.00 (↓ -0.12%)");
    }

    #[test]
    fn deltas_use_displayed_neighbour_after_eviction() {
        let mut series = RollingSeries::new(10);
        for i in 0..11 {
            series.push(format!("t{}", i), Decimal::from(100 + 10 * i));
        }
        let mut chart = Chart::new();
        chart.update(Symbol::Bitcoin, &series);

        assert_eq!(chart.len(), 10);
        // 100 was evicted, so 110 is now the first point and has no delta
        assert_eq!(chart.tooltip(0).unwrap(), vec!["Price: $110.00".to_string()]);
        assert_eq!(
            chart.tooltip(1).unwrap(),
            vec![
                "Price: $120.00".to_string(),
                "Difference: $10.00 (↑ +9.09%)".to_string(),
            ]
        );
    }

    #[test]
    fn percentage_is_relative_to_previous() {
        let change = price_change(Decimal::new(200, 0), Decimal::new(250, 0));
        assert_eq!(change.difference, Decimal::new(50, 0));
        assert_eq!(change.percentage, Decimal::new(25, 0));
    }
}
