/// Weatherbit agweather forecast client
///
/// Maps the agricultural forecast onto the same parameters the observed
/// series uses, so forecast days can be appended and scored alongside
/// history. The forecast has no dry-day count, so `CDD0` stays missing and the
/// scorer's default applies.
///
/// API Documentation: https://www.weatherbit.io/api/ag-weather-forecast-api

use chrono::NaiveDate;
use serde::Deserialize;
use std::env;

use crate::config::Location;
use crate::logging::{self, Source};
use crate::model::{DailyRecord, DroughtError, Parameter};

const WEATHERBIT_AG_URL: &str = "https://api.weatherbit.io/v2.0/forecast/agweather";

/// Land evaporation is approximated as this fraction of evapotranspiration.
const LAND_EVAPORATION_FACTOR: f64 = 0.9;

// ============================================================================
// Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct AgWeatherResponse {
    data: Option<Vec<AgWeatherDay>>,
}

#[derive(Debug, Deserialize)]
struct AgWeatherDay {
    valid_date: String,
    soilm_0_10cm: Option<f64>,
    soilm_10_40cm: Option<f64>,
    soilm_40_100cm: Option<f64>,
    precip: Option<f64>,
    evapotranspiration: Option<f64>,
    temp_2m_avg: Option<f64>,
    skin_temp_max: Option<f64>,
    skin_temp_min: Option<f64>,
    dswrf_avg: Option<f64>,
    relative_humidity: Option<f64>,
    wind_10m_spd_avg: Option<f64>,
    specific_humidity: Option<f64>,
    pres_avg: Option<f64>,
}

impl AgWeatherDay {
    fn into_record(self) -> Result<DailyRecord, DroughtError> {
        let date = NaiveDate::parse_from_str(&self.valid_date, "%Y-%m-%d").map_err(|e| {
            DroughtError::ParseError(format!("bad valid_date '{}': {}", self.valid_date, e))
        })?;

        let mapped = [
            (Parameter::RootZoneWetness, self.soilm_40_100cm),
            (Parameter::SurfaceWetness, self.soilm_0_10cm),
            (Parameter::ProfileWetness, self.soilm_10_40cm),
            (Parameter::Precipitation, self.precip),
            (Parameter::Evapotranspiration, self.evapotranspiration),
            (
                Parameter::LandEvaporation,
                self.evapotranspiration.map(|e| e * LAND_EVAPORATION_FACTOR),
            ),
            (Parameter::Temperature, self.temp_2m_avg),
            (Parameter::SurfaceTempMax, self.skin_temp_max),
            (Parameter::SurfaceTempMin, self.skin_temp_min),
            (Parameter::SolarRadiation, self.dswrf_avg),
            (Parameter::RelativeHumidity, self.relative_humidity),
            (Parameter::WindSpeed10m, self.wind_10m_spd_avg),
            (Parameter::SpecificHumidity, self.specific_humidity),
            (Parameter::SurfacePressure, self.pres_avg),
        ];

        let mut record = DailyRecord::new(date);
        for (parameter, value) in mapped {
            if let Some(v) = value {
                record.set(parameter, v);
            }
        }
        Ok(record)
    }
}

// ============================================================================
// API Client Functions
// ============================================================================

pub fn build_forecast_url(location: &Location, api_key: &str) -> String {
    format!(
        "{}?lat={}&lon={}&key={}",
        WEATHERBIT_AG_URL, location.latitude, location.longitude, api_key
    )
}

/// Parses a forecast body into date-ordered records.
///
/// A body without a `data` array is an empty forecast, not an error.
pub fn parse_forecast_response(body: &str) -> Result<Vec<DailyRecord>, DroughtError> {
    let response: AgWeatherResponse =
        serde_json::from_str(body).map_err(|e| DroughtError::ParseError(e.to_string()))?;

    let mut records = response
        .data
        .unwrap_or_default()
        .into_iter()
        .map(AgWeatherDay::into_record)
        .collect::<Result<Vec<_>, _>>()?;
    records.sort_by_key(|r| r.date);
    records.dedup_by_key(|r| r.date);
    Ok(records)
}

/// Fetches the forecast for `location` using `WEATHERBIT_API_KEY`.
pub fn fetch_forecast(
    client: &reqwest::blocking::Client,
    location: &Location,
) -> Result<Vec<DailyRecord>, DroughtError> {
    let api_key = env::var("WEATHERBIT_API_KEY")
        .map_err(|_| DroughtError::Config("WEATHERBIT_API_KEY not set (API key)".into()))?;

    let url = build_forecast_url(location, &api_key);
    logging::debug(Source::Weatherbit, Some(&location.name), "requesting agweather forecast");

    let response = client
        .get(&url)
        .send()
        .map_err(|e| DroughtError::Transport(e.to_string()))?;

    if !response.status().is_success() {
        return Err(DroughtError::HttpError(response.status().as_u16()));
    }

    let body = response
        .text()
        .map_err(|e| DroughtError::Transport(e.to_string()))?;
    parse_forecast_response(&body)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_forecast_maps_fields() {
        let body = r#"{
            "data": [
                {
                    "valid_date": "2025-10-03",
                    "soilm_0_10cm": 0.12, "soilm_10_40cm": 0.2, "soilm_40_100cm": 0.22,
                    "precip": 0.0, "evapotranspiration": 5.0,
                    "temp_2m_avg": 29.5, "skin_temp_max": 39.0, "skin_temp_min": 18.0,
                    "dswrf_avg": 24.0, "relative_humidity": 28.0,
                    "wind_10m_spd_avg": 6.1, "specific_humidity": 0.009, "pres_avg": 860.0
                },
                {"valid_date": "2025-10-02", "precip": 1.5}
            ]
        }"#;
        let records = parse_forecast_response(body).expect("forecast should parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2025, 10, 2).unwrap());

        let day = &records[1];
        assert_eq!(day.get(Parameter::RootZoneWetness), Some(0.22));
        assert_eq!(day.get(Parameter::SurfaceWetness), Some(0.12));
        assert_relative_eq!(day.get(Parameter::LandEvaporation).unwrap(), 4.5);
        assert_eq!(day.get(Parameter::ConsecutiveDryDays), None);
    }

    #[test]
    fn test_missing_data_array_is_empty_forecast() {
        let records = parse_forecast_response(r#"{"error": "API key not valid"}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_bad_valid_date_is_parse_error() {
        let body = r#"{"data": [{"valid_date": "20251003"}]}"#;
        assert!(matches!(
            parse_forecast_response(body),
            Err(DroughtError::ParseError(_))
        ));
    }

    #[test]
    fn test_build_forecast_url() {
        let url = build_forecast_url(&Location::reference(), "abc123");
        assert_eq!(
            url,
            "https://api.weatherbit.io/v2.0/forecast/agweather?lat=9.5612&lon=44.0669&key=abc123"
        );
    }
}
