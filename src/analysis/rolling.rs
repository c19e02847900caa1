//! Trailing-window means over an ordered series.
//!
//! Windows shrink at the start of the series (minimum one day). Missing values
//! inside a window are skipped; a window holding no values yields `None`.

use crate::model::{Parameter, Series};

/// Short precipitation and soil-moisture window, in days.
pub const SHORT_WINDOW_DAYS: usize = 7;

/// Long precipitation window, in days.
pub const LONG_WINDOW_DAYS: usize = 30;

/// Mean of the trailing `window` values ending at each index.
pub fn trailing_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let (sum, count) = values[start..=i]
                .iter()
                .flatten()
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            (count > 0).then(|| sum / count as f64)
        })
        .collect()
}

/// The three rolling aggregates the context classifier consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingAggregates {
    pub precip_7day_avg: Vec<Option<f64>>,
    /// Diagnostic only; not consulted when scoring.
    pub precip_30day_avg: Vec<Option<f64>>,
    pub soil_moisture_7day_avg: Vec<Option<f64>>,
}

impl RollingAggregates {
    pub fn compute(series: &Series) -> Self {
        let precip = series.values(Parameter::Precipitation);
        let soil = series.values(Parameter::RootZoneWetness);
        let long_window = LONG_WINDOW_DAYS.min(series.len());

        Self {
            precip_7day_avg: trailing_mean(&precip, SHORT_WINDOW_DAYS),
            precip_30day_avg: trailing_mean(&precip, long_window),
            soil_moisture_7day_avg: trailing_mean(&soil, SHORT_WINDOW_DAYS),
        }
    }
}
