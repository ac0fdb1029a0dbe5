//! ROC (Rate of Change) indicator.
//!
//! ROC(n)[i] = ((P[i] - P[i-n]) / P[i-n]) * 100
//! Warmup: first n prices invalid. n == 0 is never valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::prices::PriceSeries;

pub fn calculate_roc(prices: &PriceSeries, period: usize) -> IndicatorSeries {
    let points = prices.points();
    let mut values = Vec::with_capacity(points.len());

    for (i, point) in points.iter().enumerate() {
        let valid = period > 0 && i >= period;

        // PriceSeries guarantees a positive denominator.
        let value = if valid {
            let prev = points[i - period].price;
            ((point.price - prev) / prev) * 100.0
        } else {
            0.0
        };

        values.push(IndicatorPoint {
            date: point.date,
            valid,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Roc(period),
        values,
    }
}
