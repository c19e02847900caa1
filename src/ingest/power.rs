/// NASA POWER daily point API client
///
/// Retrieves the daily land-surface and atmospheric parameter series for a
/// single point. The response nests values as
/// `properties.parameter.<CODE>.<YYYYMMDD> = value`, with -999 marking days
/// the provider has no value for.
///
/// API Documentation: https://power.larc.nasa.gov/docs/services/api/temporal/daily/

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::config::{ClassifierConfig, Location, ProviderConfig};
use crate::logging::{self, Source};
use crate::model::{DailyRecord, DroughtError, Parameter, Series};

const DAILY_POINT_PATH: &str = "/api/temporal/daily/point";

/// Date key format used by the provider, e.g. "20250917".
const DATE_KEY_FORMAT: &str = "%Y%m%d";

// ============================================================================
// Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: Option<PowerProperties>,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: Option<BTreeMap<String, BTreeMap<String, Option<f64>>>>,
}

// ============================================================================
// URL Construction
// ============================================================================

/// Builds the daily point request URL for `location` over `[start, end]`.
pub fn build_daily_url(
    provider: &ProviderConfig,
    location: &Location,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    let codes: Vec<&str> = provider.parameters.iter().map(|p| p.code()).collect();
    format!(
        "{}{}?parameters={}&community={}&longitude={}&latitude={}&start={}&end={}&format=JSON",
        provider.base_url.trim_end_matches('/'),
        DAILY_POINT_PATH,
        codes.join(","),
        provider.community,
        location.longitude,
        location.latitude,
        start.format(DATE_KEY_FORMAT),
        end.format(DATE_KEY_FORMAT),
    )
}

// ============================================================================
// Parsing
// ============================================================================

pub fn parse_date_key(key: &str) -> Result<NaiveDate, DroughtError> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT)
        .map_err(|e| DroughtError::ParseError(format!("bad date key '{}': {}", key, e)))
}

/// Parses a daily point response body into a chronologically ordered series.
///
/// Every date key seen under any parameter becomes a day; a parameter absent
/// from the payload, or carrying the sentinel, is missing on that day.
/// Unrecognized parameter codes are ignored. A payload in which no recognized
/// parameter carries a single value is `NoInputData`.
pub fn parse_daily_response(body: &str) -> Result<Series, DroughtError> {
    let response: PowerResponse =
        serde_json::from_str(body).map_err(|e| DroughtError::ParseError(e.to_string()))?;

    let parameters = response
        .properties
        .and_then(|p| p.parameter)
        .filter(|p| !p.is_empty())
        .ok_or(DroughtError::NoInputData)?;

    let mut dates = BTreeSet::new();
    for values in parameters.values() {
        for key in values.keys() {
            dates.insert(parse_date_key(key)?);
        }
    }
    if dates.is_empty() {
        return Err(DroughtError::NoInputData);
    }

    let mut records: BTreeMap<NaiveDate, DailyRecord> = dates
        .into_iter()
        .map(|d| (d, DailyRecord::new(d)))
        .collect();

    let mut recognized_values = 0;
    for (code, values) in &parameters {
        let Some(parameter) = Parameter::from_code(code) else {
            logging::debug(Source::Power, None, &format!("ignoring unknown parameter {}", code));
            continue;
        };
        for (key, value) in values {
            let date = parse_date_key(key)?;
            if let (Some(record), Some(v)) = (records.get_mut(&date), value) {
                record.set(parameter, *v);
                if record.has(parameter) {
                    recognized_values += 1;
                }
            }
        }
    }
    if recognized_values == 0 {
        logging::warn(Source::Power, None, "payload holds no values for any known parameter");
        return Err(DroughtError::NoInputData);
    }

    Series::new(records.into_values().collect())
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetches the raw response body for the configured window at `location`.
pub fn fetch_body(
    client: &reqwest::blocking::Client,
    config: &ClassifierConfig,
    location: &Location,
) -> Result<String, DroughtError> {
    let url = build_daily_url(
        &config.provider,
        location,
        config.window.start()?,
        config.window.end,
    );
    logging::debug(Source::Power, Some(&location.name), &format!("GET {}", url));

    let response = client
        .get(&url)
        .timeout(Duration::from_secs(config.provider.timeout_secs))
        .header("Accept", "application/json")
        .send()
        .map_err(|e| DroughtError::Transport(e.to_string()))?;

    if !response.status().is_success() {
        return Err(DroughtError::HttpError(response.status().as_u16()));
    }

    response
        .text()
        .map_err(|e| DroughtError::Transport(e.to_string()))
}

/// Fetches and parses the configured window for `location`.
pub fn fetch_series(
    client: &reqwest::blocking::Client,
    config: &ClassifierConfig,
    location: &Location,
) -> Result<Series, DroughtError> {
    let body = fetch_body(client, config, location)?;
    let series = parse_daily_response(&body)?;
    logging::info(
        Source::Power,
        Some(&location.name),
        &format!("received {} days", series.len()),
    );
    Ok(series)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [44.0669, 9.5612, 1334.0]},
        "properties": {
            "parameter": {
                "PRECTOTCORR": {"20250916": 0.0, "20250917": 1.25, "20250918": -999.0},
                "GWETROOT": {"20250916": 0.31, "20250917": 0.3, "20250918": 0.29},
                "T2M": {"20250916": 24.1, "20250917": 25.6, "20250918": 26.0},
                "SNODP": {"20250916": 0.0, "20250917": 0.0, "20250918": 0.0}
            }
        },
        "header": {"fill_value": -999.0}
    }"#;

    #[test]
    fn test_build_daily_url_contains_all_parts() {
        let provider = ProviderConfig::default();
        let url = build_daily_url(
            &provider,
            &Location::reference(),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 30).unwrap(),
        );
        assert!(url.starts_with("https://power.larc.nasa.gov/api/temporal/daily/point?"));
        assert!(url.contains("parameters=PRECTOTCORR,EVPTRNS,EVLAND,GWETROOT"));
        assert!(url.contains("community=AG"));
        assert!(url.contains("longitude=44.0669&latitude=9.5612"));
        assert!(url.contains("start=20250901&end=20250930"));
        assert!(url.ends_with("format=JSON"));
    }

    #[test]
    fn test_trailing_slash_in_base_url_is_tolerated() {
        let provider = ProviderConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..ProviderConfig::default()
        };
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let url = build_daily_url(&provider, &Location::reference(), date, date);
        assert!(url.starts_with("http://localhost:8080/api/temporal/daily/point?"));
    }

    #[test]
    fn test_parse_sample_response() {
        let series = parse_daily_response(SAMPLE).expect("sample should parse");
        assert_eq!(series.len(), 3);
        let first = series.get(0).unwrap();
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 9, 16).unwrap());
        assert_eq!(first.get(Parameter::RootZoneWetness), Some(0.31));
        assert_eq!(series.get(1).unwrap().get(Parameter::Precipitation), Some(1.25));
    }

    #[test]
    fn test_sentinel_is_normalized_to_missing() {
        let series = parse_daily_response(SAMPLE).unwrap();
        let last = series.get(2).unwrap();
        assert_eq!(last.get(Parameter::Precipitation), None);
        assert_eq!(last.get(Parameter::Temperature), Some(26.0));
    }

    #[test]
    fn test_absent_parameter_is_missing_every_day() {
        let series = parse_daily_response(SAMPLE).unwrap();
        assert!(series.records().iter().all(|r| !r.has(Parameter::ConsecutiveDryDays)));
    }

    #[test]
    fn test_missing_parameter_block_is_no_input_data() {
        let body = r#"{"properties": {}, "messages": ["no data"]}"#;
        assert_eq!(parse_daily_response(body), Err(DroughtError::NoInputData));

        let body = r#"{"type": "Feature"}"#;
        assert_eq!(parse_daily_response(body), Err(DroughtError::NoInputData));
    }

    #[test]
    fn test_empty_parameter_block_is_no_input_data() {
        let body = r#"{"properties": {"parameter": {}}}"#;
        assert_eq!(parse_daily_response(body), Err(DroughtError::NoInputData));
    }

    #[test]
    fn test_only_unknown_parameters_is_no_input_data() {
        let body = r#"{"properties": {"parameter": {
            "SNODP": {"20250101": 0.0, "20250102": 0.0}
        }}}"#;
        assert_eq!(parse_daily_response(body), Err(DroughtError::NoInputData));
    }

    #[test]
    fn test_all_sentinel_known_parameters_is_no_input_data() {
        let body = r#"{"properties": {"parameter": {
            "T2M": {"20250101": -999.0, "20250102": -999.0},
            "SNODP": {"20250101": 1.0}
        }}}"#;
        assert_eq!(parse_daily_response(body), Err(DroughtError::NoInputData));
    }

    #[test]
    fn test_unknown_parameter_alongside_known_is_ignored() {
        let body = r#"{"properties": {"parameter": {
            "SNODP": {"20250101": 3.0},
            "T2M": {"20250101": 22.0}
        }}}"#;
        let series = parse_daily_response(body).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.get(0).unwrap().get(Parameter::Temperature), Some(22.0));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let result = parse_daily_response("<html>Service Unavailable</html>");
        assert!(matches!(result, Err(DroughtError::ParseError(_))));
    }

    #[test]
    fn test_bad_date_key_is_parse_error() {
        let body = r#"{"properties": {"parameter": {"T2M": {"2025-09-16": 24.0}}}}"#;
        assert!(matches!(parse_daily_response(body), Err(DroughtError::ParseError(_))));
    }

    #[test]
    fn test_null_values_are_missing() {
        let body = r#"{"properties": {"parameter": {"RH2M": {"20250101": null, "20250102": 41.0}}}}"#;
        let series = parse_daily_response(body).unwrap();
        assert_eq!(series.get(0).unwrap().get(Parameter::RelativeHumidity), None);
        assert_eq!(series.get(1).unwrap().get(Parameter::RelativeHumidity), Some(41.0));
    }
}
