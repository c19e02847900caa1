//! Point risk scorer.
//!
//! Maps one day's record to an additive risk score and a drought category,
//! without looking at any other day. Missing fields fall back to the per-factor
//! defaults below; those defaults sit outside every scoring band, so an
//! all-default record scores zero.

use crate::model::{DailyRecord, DroughtCategory, Parameter};

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    /// value < threshold
    Below,
    /// value > threshold
    Above,
}

/// A single-parameter rule. Bands are ordered from most to least severe and
/// only the first matching band contributes.
struct Factor {
    name: &'static str,
    parameter: Parameter,
    default: f64,
    band: Band,
    thresholds: &'static [(f64, u32)],
}

const FACTORS: &[Factor] = &[
    Factor {
        name: "root_zone_wetness",
        parameter: Parameter::RootZoneWetness,
        default: 1.0,
        band: Band::Below,
        thresholds: &[(0.2, 4), (0.3, 3), (0.4, 1)],
    },
    Factor {
        name: "surface_wetness",
        parameter: Parameter::SurfaceWetness,
        default: 1.0,
        band: Band::Below,
        thresholds: &[(0.15, 2)],
    },
    Factor {
        name: "precipitation",
        parameter: Parameter::Precipitation,
        default: 5.0,
        band: Band::Below,
        thresholds: &[(0.5, 3), (2.0, 2), (5.0, 1)],
    },
    Factor {
        name: "consecutive_dry_days",
        parameter: Parameter::ConsecutiveDryDays,
        default: 0.0,
        band: Band::Above,
        thresholds: &[(30.0, 4), (20.0, 3), (10.0, 2), (5.0, 1)],
    },
    Factor {
        name: "temperature",
        parameter: Parameter::Temperature,
        default: 20.0,
        band: Band::Above,
        thresholds: &[(35.0, 3), (30.0, 2), (25.0, 1)],
    },
    Factor {
        name: "surface_temp_max",
        parameter: Parameter::SurfaceTempMax,
        default: 25.0,
        band: Band::Above,
        thresholds: &[(38.0, 2)],
    },
    Factor {
        name: "surface_temp_min",
        parameter: Parameter::SurfaceTempMin,
        default: 15.0,
        band: Band::Above,
        thresholds: &[(28.0, 2)],
    },
    Factor {
        name: "solar_radiation",
        parameter: Parameter::SolarRadiation,
        default: 15.0,
        band: Band::Above,
        thresholds: &[(25.0, 2), (20.0, 1)],
    },
    Factor {
        name: "relative_humidity",
        parameter: Parameter::RelativeHumidity,
        default: 50.0,
        band: Band::Below,
        thresholds: &[(25.0, 2), (35.0, 1)],
    },
    // The >8 and >5 wind bands both carry +1; applied as one band they can
    // never add more than 1, so a single >5 threshold is equivalent.
    Factor {
        name: "wind_speed",
        parameter: Parameter::WindSpeed10m,
        default: 2.0,
        band: Band::Above,
        thresholds: &[(5.0, 1)],
    },
    Factor {
        name: "evapotranspiration",
        parameter: Parameter::Evapotranspiration,
        default: 3.0,
        band: Band::Above,
        thresholds: &[(6.0, 2), (4.0, 1)],
    },
];

const WATER_BALANCE_THRESHOLDS: &[(f64, u32)] = &[(-3.0, 3), (-1.0, 2)];
const VPD_THRESHOLDS: &[(f64, u32)] = &[(25.0, 2)];

fn band_points(value: f64, band: Band, thresholds: &[(f64, u32)]) -> u32 {
    thresholds
        .iter()
        .find(|(threshold, _)| match band {
            Band::Below => value < *threshold,
            Band::Above => value > *threshold,
        })
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Points one rule added to a day's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    pub factor: &'static str,
    pub points: u32,
}

/// Basic (single-day) score and the category it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointScore {
    pub score: u32,
    pub category: DroughtCategory,
}

/// Evaluates every rule against `record`, including rules contributing 0.
pub fn score_breakdown(record: &DailyRecord) -> Vec<Contribution> {
    let mut contributions: Vec<Contribution> = FACTORS
        .iter()
        .map(|f| Contribution {
            factor: f.name,
            points: band_points(record.get_or(f.parameter, f.default), f.band, f.thresholds),
        })
        .collect();

    let water_balance = record.get_or(Parameter::Precipitation, 0.0)
        - record.get_or(Parameter::Evapotranspiration, 0.0);
    contributions.push(Contribution {
        factor: "water_balance",
        points: band_points(water_balance, Band::Below, WATER_BALANCE_THRESHOLDS),
    });

    // Unscored when the derived value is absent.
    let vpd_points = record
        .derived()
        .and_then(|d| d.vpd)
        .filter(|v| !v.is_nan())
        .map(|vpd| band_points(vpd, Band::Above, VPD_THRESHOLDS))
        .unwrap_or(0);
    contributions.push(Contribution {
        factor: "vpd",
        points: vpd_points,
    });

    contributions
}

/// Maps a basic score to its drought category.
pub fn category_for_score(score: u32) -> DroughtCategory {
    match score {
        s if s >= 15 => DroughtCategory::Extreme,
        s if s >= 10 => DroughtCategory::Severe,
        s if s >= 6 => DroughtCategory::Moderate,
        _ => DroughtCategory::NoDrought,
    }
}

/// Scores a single day.
pub fn score_day(record: &DailyRecord) -> PointScore {
    let score: u32 = score_breakdown(record).iter().map(|c| c.points).sum();
    PointScore {
        score,
        category: category_for_score(score),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
