//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(P[i-j] for j in 0..n) / n
//! Warmup: first (n-1) prices are invalid. n == 0 is never valid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::prices::PriceSeries;

pub fn calculate_sma(prices: &PriceSeries, period: usize) -> IndicatorSeries {
    let points = prices.points();
    let mut values = Vec::with_capacity(points.len());
    let mut window_sum = 0.0;

    for (i, point) in points.iter().enumerate() {
        window_sum += point.price;
        if period > 0 && i >= period {
            window_sum -= points[i - period].price;
        }

        let valid = period > 0 && i + 1 >= period;
        values.push(IndicatorPoint {
            date: point.date,
            valid,
            value: if valid { window_sum / period as f64 } else { 0.0 },
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}
