/// Drought classification pipeline.
///
/// Submodules:
/// - `point`: stateless single-day risk scorer (the "basic" category).
/// - `context`: sequential pass adding trend and rolling-window signals
///   (the "advanced" category).
///
/// `run` is the entry point: it augments the series with derived features,
/// computes rolling aggregates, and returns one `DayClassification` per day.

pub mod context;
pub mod point;

use chrono::NaiveDate;
use serde::Serialize;

use crate::analysis::derived;
use crate::analysis::rolling::RollingAggregates;
use crate::logging::{self, Source};
use crate::model::{DerivedFeatures, DroughtCategory, DroughtError, Series};

/// Everything computed for one day, enough for a report without recomputation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayClassification {
    pub date: NaiveDate,
    pub basic_score: u32,
    pub basic_category: DroughtCategory,
    pub advanced_risk: f64,
    pub advanced_category: DroughtCategory,
    pub precip_7day_avg: Option<f64>,
    pub precip_30day_avg: Option<f64>,
    pub soil_moisture_7day_avg: Option<f64>,
    pub derived: DerivedFeatures,
}

/// Classifies a series that has already been augmented.
pub fn classify_detailed(series: &Series) -> Result<Vec<DayClassification>, DroughtError> {
    if series.is_empty() {
        return Err(DroughtError::NoInputData);
    }

    let aggregates = RollingAggregates::compute(series);
    let assessments = context::assess_series(series, &aggregates)?;

    let days = series
        .records()
        .iter()
        .zip(assessments)
        .enumerate()
        .map(|(i, (record, assessment))| DayClassification {
            date: record.date,
            basic_score: assessment.basic.score,
            basic_category: assessment.basic.category,
            advanced_risk: assessment.risk,
            advanced_category: assessment.category,
            precip_7day_avg: aggregates.precip_7day_avg[i],
            precip_30day_avg: aggregates.precip_30day_avg[i],
            soil_moisture_7day_avg: aggregates.soil_moisture_7day_avg[i],
            derived: record.derived().copied().unwrap_or_default(),
        })
        .collect();

    Ok(days)
}

/// Final (advanced) category per day, same length and order as the series.
pub fn classify_series(series: &Series) -> Result<Vec<DroughtCategory>, DroughtError> {
    Ok(classify_detailed(series)?
        .into_iter()
        .map(|d| d.advanced_category)
        .collect())
}

/// Runs the derived-feature calculator, then classifies every day.
pub fn run(series: &mut Series) -> Result<Vec<DayClassification>, DroughtError> {
    if series.is_empty() {
        return Err(DroughtError::NoInputData);
    }
    derived::augment(series);
    let days = classify_detailed(series)?;

    logging::debug(
        Source::Classifier,
        None,
        &format!("classified {} days", days.len()),
    );
    Ok(days)
}
