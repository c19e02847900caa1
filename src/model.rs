/// DailyRecord, Series, DroughtCategory, DroughtError
/// core data structures and error handling
///
/// Core data types for the drought classification service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no scoring logic and no I/O. Missing measurements are
/// represented by absence; the provider sentinel never survives `DailyRecord::set`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Parameter codes
// ---------------------------------------------------------------------------

/// Value the weather-data provider emits for "no measurement".
pub const MISSING_SENTINEL: f64 = -999.0;

/// Returns `true` if `value` must be treated as missing: NaN, or the
/// provider sentinel.
pub fn is_missing_value(value: f64) -> bool {
    value.is_nan() || (value - MISSING_SENTINEL).abs() < 1e-6
}

/// Daily point parameters understood by the classifier.
///
/// Serialized by their provider code, e.g. `"PRECTOTCORR"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "PRECTOTCORR")]
    Precipitation,
    #[serde(rename = "EVPTRNS")]
    Evapotranspiration,
    #[serde(rename = "EVLAND")]
    LandEvaporation,
    #[serde(rename = "GWETROOT")]
    RootZoneWetness,
    #[serde(rename = "GWETTOP")]
    SurfaceWetness,
    #[serde(rename = "GWETPROF")]
    ProfileWetness,
    #[serde(rename = "T2M")]
    Temperature,
    #[serde(rename = "TS_MAX")]
    SurfaceTempMax,
    #[serde(rename = "TS_MIN")]
    SurfaceTempMin,
    #[serde(rename = "ALLSKY_SFC_SW_DWN")]
    SolarRadiation,
    #[serde(rename = "RH2M")]
    RelativeHumidity,
    #[serde(rename = "QV2M")]
    SpecificHumidity,
    #[serde(rename = "CDD0")]
    ConsecutiveDryDays,
    #[serde(rename = "WS10M")]
    WindSpeed10m,
    /// Accepted on input only; the scorer reads `WS10M`.
    #[serde(rename = "WS2M")]
    WindSpeed2m,
    #[serde(rename = "PS")]
    SurfacePressure,
}

impl Parameter {
    /// The parameter set requested from the provider, in request order.
    pub const PROVIDER_SET: [Parameter; 15] = [
        Parameter::Precipitation,
        Parameter::Evapotranspiration,
        Parameter::LandEvaporation,
        Parameter::RootZoneWetness,
        Parameter::SurfaceWetness,
        Parameter::ProfileWetness,
        Parameter::Temperature,
        Parameter::SurfaceTempMax,
        Parameter::SurfaceTempMin,
        Parameter::SolarRadiation,
        Parameter::RelativeHumidity,
        Parameter::SpecificHumidity,
        Parameter::ConsecutiveDryDays,
        Parameter::WindSpeed10m,
        Parameter::SurfacePressure,
    ];

    /// Provider code for this parameter.
    pub fn code(&self) -> &'static str {
        match self {
            Parameter::Precipitation => "PRECTOTCORR",
            Parameter::Evapotranspiration => "EVPTRNS",
            Parameter::LandEvaporation => "EVLAND",
            Parameter::RootZoneWetness => "GWETROOT",
            Parameter::SurfaceWetness => "GWETTOP",
            Parameter::ProfileWetness => "GWETPROF",
            Parameter::Temperature => "T2M",
            Parameter::SurfaceTempMax => "TS_MAX",
            Parameter::SurfaceTempMin => "TS_MIN",
            Parameter::SolarRadiation => "ALLSKY_SFC_SW_DWN",
            Parameter::RelativeHumidity => "RH2M",
            Parameter::SpecificHumidity => "QV2M",
            Parameter::ConsecutiveDryDays => "CDD0",
            Parameter::WindSpeed10m => "WS10M",
            Parameter::WindSpeed2m => "WS2M",
            Parameter::SurfacePressure => "PS",
        }
    }

    /// Looks up a parameter by provider code. Returns `None` if unknown.
    pub fn from_code(code: &str) -> Option<Parameter> {
        Parameter::PROVIDER_SET
            .iter()
            .chain(std::iter::once(&Parameter::WindSpeed2m))
            .find(|p| p.code() == code)
            .copied()
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// Physical quantities computed from a single day's raw parameters.
///
/// Each field is `None` when one of its raw inputs is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    /// precip − evapotranspiration (mm/day)
    pub water_balance: Option<f64>,
    /// max(0, evapotranspiration − precip)
    pub water_deficit: Option<f64>,
    /// precip / (evapotranspiration + ε)
    pub evap_ratio: Option<f64>,
    /// saturation minus actual vapor pressure (hPa)
    pub vpd: Option<f64>,
}

/// One day's observations at the configured point.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    values: BTreeMap<Parameter, f64>,
    derived: Option<DerivedFeatures>,
}

impl DailyRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
            derived: None,
        }
    }

    /// Builder form of `set`, convenient for fixtures.
    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        self.set(parameter, value);
        self
    }

    /// Stores a measurement. Sentinel and NaN values are stored as missing.
    pub fn set(&mut self, parameter: Parameter, value: f64) {
        if is_missing_value(value) {
            self.values.remove(&parameter);
        } else {
            self.values.insert(parameter, value);
        }
    }

    /// Present, numeric value of `parameter`, if any.
    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        self.values
            .get(&parameter)
            .copied()
            .filter(|v| !is_missing_value(*v))
    }

    /// Value of `parameter`, or `default` when missing.
    pub fn get_or(&self, parameter: Parameter, default: f64) -> f64 {
        self.get(parameter).unwrap_or(default)
    }

    pub fn has(&self, parameter: Parameter) -> bool {
        self.get(parameter).is_some()
    }

    /// Derived features, once the calculator has run over this record.
    pub fn derived(&self) -> Option<&DerivedFeatures> {
        self.derived.as_ref()
    }

    pub(crate) fn set_derived(&mut self, derived: DerivedFeatures) {
        self.derived = Some(derived);
    }

    /// Flat `code -> value` view of every present raw and derived value.
    pub fn to_flat_map(&self) -> BTreeMap<String, f64> {
        let mut flat: BTreeMap<String, f64> = self
            .values
            .iter()
            .filter(|(_, v)| !is_missing_value(**v))
            .map(|(p, v)| (p.code().to_string(), *v))
            .collect();

        if let Some(d) = &self.derived {
            let named = [
                ("water_balance", d.water_balance),
                ("water_deficit", d.water_deficit),
                ("evap_ratio", d.evap_ratio),
                ("vpd", d.vpd),
            ];
            for (name, value) in named {
                if let Some(v) = value {
                    flat.insert(name.to_string(), v);
                }
            }
        }
        flat
    }
}

/// Chronologically ordered daily records for one location.
///
/// Dates are strictly ascending; index `i` is always the i-th day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    records: Vec<DailyRecord>,
}

impl Series {
    /// Builds a series, rejecting out-of-order or duplicate dates.
    pub fn new(records: Vec<DailyRecord>) -> Result<Self, DroughtError> {
        for (index, pair) in records.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(DroughtError::UnorderedSeries { index: index + 1 });
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [DailyRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DailyRecord> {
        self.records.get(index)
    }

    /// Per-day values of `parameter`, `None` where missing.
    pub fn values(&self, parameter: Parameter) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.get(parameter)).collect()
    }

    /// `true` once every record carries derived features.
    pub fn is_augmented(&self) -> bool {
        self.records.iter().all(|r| r.derived.is_some())
    }

    /// Appends forecast days dated strictly after the last observed day.
    ///
    /// Records overlapping the observed range, or out of order among
    /// themselves, are skipped. Returns the number of records appended.
    pub fn extend_forecast(&mut self, forecast: Vec<DailyRecord>) -> usize {
        let mut appended = 0;
        for record in forecast {
            let after_last = self
                .records
                .last()
                .map(|last| record.date > last.date)
                .unwrap_or(true);
            if after_last {
                self.records.push(record);
                appended += 1;
            }
        }
        appended
    }
}

// ---------------------------------------------------------------------------
// Category types
// ---------------------------------------------------------------------------

/// Drought severity levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DroughtCategory {
    NoDrought = 0,
    Moderate = 1,
    Severe = 2,
    Extreme = 3,
}

impl DroughtCategory {
    pub const ALL: [DroughtCategory; 4] = [
        DroughtCategory::NoDrought,
        DroughtCategory::Moderate,
        DroughtCategory::Severe,
        DroughtCategory::Extreme,
    ];

    /// Ordinal level, 0 (no drought) through 3 (extreme).
    pub fn level(&self) -> u8 {
        *self as u8
    }

    /// Category for an ordinal level. Returns `None` above 3.
    pub fn from_level(level: u8) -> Option<DroughtCategory> {
        DroughtCategory::ALL.get(level as usize).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            DroughtCategory::NoDrought => "No Drought",
            DroughtCategory::Moderate => "Moderate",
            DroughtCategory::Severe => "Severe",
            DroughtCategory::Extreme => "Extreme",
        }
    }
}

impl std::fmt::Display for DroughtCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching, loading, or classifying a series.
#[derive(Debug, PartialEq)]
pub enum DroughtError {
    /// Non-2xx HTTP response from a data provider.
    HttpError(u16),
    /// The request never produced a response (DNS, TLS, timeout).
    Transport(String),
    /// The response body or a date key could not be parsed.
    ParseError(String),
    /// The payload carried no parameter data, or no usable days.
    NoInputData,
    /// Record at `index` is not strictly after its predecessor.
    UnorderedSeries { index: usize },
    /// Record at `index` has not been through the derived-feature calculator.
    NotAugmented { index: usize },
    /// The configuration file could not be read or parsed.
    Config(String),
    /// An external predictor rejected its input.
    Model(String),
}

impl std::fmt::Display for DroughtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DroughtError::HttpError(code) => write!(f, "HTTP error: {}", code),
            DroughtError::Transport(msg) => write!(f, "Transport error: {}", msg),
            DroughtError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DroughtError::NoInputData => write!(f, "No input data: payload has no parameter values"),
            DroughtError::UnorderedSeries { index } => {
                write!(f, "Series dates not strictly ascending at index {}", index)
            }
            DroughtError::NotAugmented { index } => {
                write!(f, "Record {} has no derived features; run the calculator first", index)
            }
            DroughtError::Config(msg) => write!(f, "Config error: {}", msg),
            DroughtError::Model(msg) => write!(f, "Model error: {}", msg),
        }
    }
}

impl std::error::Error for DroughtError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
