//! Derived-feature calculator.
//!
//! Every quantity here depends only on the same day's raw values, so the
//! calculator is a plain map over the series. Running it twice recomputes the
//! same values from the same inputs.

use crate::model::{DailyRecord, DerivedFeatures, Parameter, Series};

/// Offset added to evapotranspiration in the evaporation-ratio denominator.
pub const EVAP_RATIO_EPSILON: f64 = 0.001;

/// Saturation vapor pressure (hPa) at air temperature `t_c` (°C).
pub fn saturation_vapor_pressure(t_c: f64) -> f64 {
    6.11 * 10f64.powf((7.5 * t_c) / (237.3 + t_c))
}

/// Vapor pressure deficit (hPa) from temperature (°C) and relative humidity (%).
pub fn vapor_pressure_deficit(t_c: f64, rh_percent: f64) -> f64 {
    let es = saturation_vapor_pressure(t_c);
    let ea = es * (rh_percent / 100.0);
    es - ea
}

/// Computes the four derived fields for a single day.
pub fn compute(record: &DailyRecord) -> DerivedFeatures {
    let precip = record.get(Parameter::Precipitation);
    let evap = record.get(Parameter::Evapotranspiration);

    let (water_balance, water_deficit, evap_ratio) = match (precip, evap) {
        (Some(p), Some(e)) => (
            Some(p - e),
            Some((e - p).max(0.0)),
            Some(p / (e + EVAP_RATIO_EPSILON)),
        ),
        _ => (None, None, None),
    };

    let vpd = match (
        record.get(Parameter::Temperature),
        record.get(Parameter::RelativeHumidity),
    ) {
        (Some(t), Some(rh)) => Some(vapor_pressure_deficit(t, rh)).filter(|v| v.is_finite()),
        _ => None,
    };

    DerivedFeatures {
        water_balance,
        water_deficit,
        evap_ratio,
        vpd,
    }
}

/// Attaches derived features to every record of the series.
pub fn augment(series: &mut Series) {
    for record in series.records_mut() {
        let derived = compute(record);
        record.set_derived(derived);
    }
}
