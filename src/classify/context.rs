//! Temporal context classifier.
//!
//! Rescales each day's basic score and adds trend and rolling-window signals.
//! Day `i` reads day `i - 1` by index from the immutable series; nothing
//! computed for earlier days is modified.

use crate::analysis::rolling::RollingAggregates;
use crate::classify::point::{self, PointScore};
use crate::model::{DroughtCategory, DroughtError, Parameter, Series};

/// Weight applied to the basic score.
pub const BASIC_SCORE_WEIGHT: f64 = 0.6;

/// Soil drying: today's root-zone wetness below this fraction of yesterday's.
pub const SOIL_DROP_RATIO: f64 = 0.9;
pub const SOIL_DROP_POINTS: f64 = 2.0;

/// Precipitation dropping: today's precipitation below this fraction of yesterday's.
pub const PRECIP_DROP_RATIO: f64 = 0.5;
pub const PRECIP_DROP_POINTS: f64 = 1.0;

pub const DRY_WEEK_PRECIP_MM: f64 = 1.0;
pub const DRY_WEEK_POINTS: f64 = 2.0;

pub const DRY_SOIL_WEEK_WETNESS: f64 = 0.25;
pub const DRY_SOIL_WEEK_POINTS: f64 = 2.0;

/// Context-adjusted assessment of one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextAssessment {
    pub basic: PointScore,
    pub risk: f64,
    pub category: DroughtCategory,
}

/// Maps an accumulated context risk to its drought category.
pub fn category_for_risk(risk: f64) -> DroughtCategory {
    if risk >= 4.0 {
        DroughtCategory::Extreme
    } else if risk >= 2.5 {
        DroughtCategory::Severe
    } else if risk >= 1.5 {
        DroughtCategory::Moderate
    } else {
        DroughtCategory::NoDrought
    }
}

/// `true` when both values are present and `today < ratio * yesterday`.
fn dropped(today: Option<f64>, yesterday: Option<f64>, ratio: f64) -> bool {
    match (today, yesterday) {
        (Some(t), Some(y)) => t < ratio * y,
        _ => false,
    }
}

fn below(value: Option<f64>, threshold: f64) -> bool {
    value.map(|v| v < threshold).unwrap_or(false)
}

/// Assesses every day of an augmented series, in order.
pub fn assess_series(
    series: &Series,
    aggregates: &RollingAggregates,
) -> Result<Vec<ContextAssessment>, DroughtError> {
    if let Some(index) = series.records().iter().position(|r| r.derived().is_none()) {
        return Err(DroughtError::NotAugmented { index });
    }

    let records = series.records();
    let mut assessments = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let basic = point::score_day(record);
        let mut risk = BASIC_SCORE_WEIGHT * basic.score as f64;

        if i > 0 {
            let previous = &records[i - 1];
            if dropped(
                record.get(Parameter::RootZoneWetness),
                previous.get(Parameter::RootZoneWetness),
                SOIL_DROP_RATIO,
            ) {
                risk += SOIL_DROP_POINTS;
            }
            if dropped(
                record.get(Parameter::Precipitation),
                previous.get(Parameter::Precipitation),
                PRECIP_DROP_RATIO,
            ) {
                risk += PRECIP_DROP_POINTS;
            }
        }

        if below(aggregates.precip_7day_avg[i], DRY_WEEK_PRECIP_MM) {
            risk += DRY_WEEK_POINTS;
        }
        if below(aggregates.soil_moisture_7day_avg[i], DRY_SOIL_WEEK_WETNESS) {
            risk += DRY_SOIL_WEEK_POINTS;
        }

        assessments.push(ContextAssessment {
            basic,
            risk,
            category: category_for_risk(risk),
        });
    }

    Ok(assessments)
}
