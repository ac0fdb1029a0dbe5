//! Signals, positions and strategy returns.
//!
//! A signal on day t may only be acted on from day t+1, so a position is
//! the signal lagged by exactly one period and the first position is always
//! flat. Strategy returns pair each position with the same day's return.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::returns::{ReturnPoint, ReturnSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Exposure {
    #[default]
    Flat,
    Long,
}

impl Exposure {
    pub fn as_f64(self) -> f64 {
        match self {
            Exposure::Flat => 0.0,
            Exposure::Long => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposurePoint {
    pub date: NaiveDate,
    pub exposure: Exposure,
}

/// Exposure decided from information available at or before each date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signal {
    pub points: Vec<ExposurePoint>,
}

/// Exposure actually held on each date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Position {
    pub points: Vec<ExposurePoint>,
}

impl Signal {
    pub fn exposures(&self) -> Vec<Exposure> {
        self.points.iter().map(|p| p.exposure).collect()
    }

    /// `position[0] = Flat`, `position[t] = signal[t-1]`.
    pub fn to_position(&self) -> Position {
        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| ExposurePoint {
                date: point.date,
                exposure: if i == 0 {
                    Exposure::Flat
                } else {
                    self.points[i - 1].exposure
                },
            })
            .collect();
        Position { points }
    }
}

impl Position {
    pub fn exposures(&self) -> Vec<Exposure> {
        self.points.iter().map(|p| p.exposure).collect()
    }

    /// `position[t] * return[t]` for every return date. A return date with
    /// no recorded position earns nothing.
    pub fn apply(&self, returns: &ReturnSeries) -> ReturnSeries {
        let by_date: HashMap<NaiveDate, Exposure> =
            self.points.iter().map(|p| (p.date, p.exposure)).collect();

        ReturnSeries::new(
            returns
                .points()
                .iter()
                .map(|r| ReturnPoint {
                    date: r.date,
                    value: by_date.get(&r.date).copied().unwrap_or_default().as_f64() * r.value,
                })
                .collect(),
        )
    }
}
