/// Integration tests for the full classification pipeline
///
/// Tests verify:
/// 1. A provider payload parses into an ordered series with sentinels removed
/// 2. Derived features, rolling aggregates, and both categories are produced per day
/// 3. The documented single-day and two-day scenarios
/// 4. Refusal to classify a payload with no parameter data
///
/// No network access required; payloads are inline fixtures.

use approx::assert_relative_eq;
use chrono::NaiveDate;

use drought_monitor::analysis::derived;
use drought_monitor::classify::{self, point};
use drought_monitor::config::Location;
use drought_monitor::ingest::power;
use drought_monitor::model::{DailyRecord, DroughtCategory, DroughtError, Parameter, Series};
use drought_monitor::report::Summary;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Eight days drying out at the reference location; day 4 has a sentinel
/// precipitation value.
const DRYING_WEEK: &str = r#"{
    "properties": {
        "parameter": {
            "PRECTOTCORR": {"20250901": 6.0, "20250902": 4.0, "20250903": 1.0, "20250904": -999.0,
                            "20250905": 0.2, "20250906": 0.1, "20250907": 0.0, "20250908": 0.0},
            "GWETROOT":    {"20250901": 0.45, "20250902": 0.44, "20250903": 0.38, "20250904": 0.33,
                            "20250905": 0.29, "20250906": 0.25, "20250907": 0.21, "20250908": 0.18},
            "GWETTOP":     {"20250901": 0.40, "20250902": 0.35, "20250903": 0.25, "20250904": 0.2,
                            "20250905": 0.16, "20250906": 0.14, "20250907": 0.12, "20250908": 0.10},
            "EVPTRNS":     {"20250901": 3.0, "20250902": 3.2, "20250903": 3.8, "20250904": 4.2,
                            "20250905": 4.6, "20250906": 5.0, "20250907": 5.4, "20250908": 6.2},
            "T2M":         {"20250901": 26.0, "20250902": 27.5, "20250903": 29.0, "20250904": 31.0,
                            "20250905": 32.5, "20250906": 34.0, "20250907": 35.5, "20250908": 36.2},
            "RH2M":        {"20250901": 48.0, "20250902": 44.0, "20250903": 39.0, "20250904": 33.0,
                            "20250905": 29.0, "20250906": 26.0, "20250907": 22.0, "20250908": 19.0},
            "CDD0":        {"20250901": 0.0, "20250902": 1.0, "20250903": 2.0, "20250904": 3.0,
                            "20250905": 4.0, "20250906": 5.0, "20250907": 6.0, "20250908": 7.0}
        }
    }
}"#;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn test_payload_to_per_day_classification() {
    let mut series = power::parse_daily_response(DRYING_WEEK).expect("fixture should parse");
    assert_eq!(series.len(), 8);

    let days = classify::run(&mut series).expect("classification should succeed");
    assert_eq!(days.len(), 8);
    assert_eq!(days[0].date, date(2025, 9, 1));
    assert_eq!(days[7].date, date(2025, 9, 8));

    // Wet start, parched end.
    assert_eq!(days[0].basic_category, DroughtCategory::NoDrought);
    assert_eq!(days[7].basic_category, DroughtCategory::Extreme);
    assert_eq!(days[7].advanced_category, DroughtCategory::Extreme);
}

#[test]
fn test_sentinel_day_has_no_water_balance() {
    let mut series = power::parse_daily_response(DRYING_WEEK).unwrap();
    let days = classify::run(&mut series).unwrap();
    assert_eq!(days[3].derived.water_balance, None);
    assert!(days[3].derived.vpd.is_some());
}

#[test]
fn test_rolling_precip_skips_missing_day() {
    let mut series = power::parse_daily_response(DRYING_WEEK).unwrap();
    let days = classify::run(&mut series).unwrap();

    assert_eq!(days[0].precip_7day_avg, Some(6.0));
    // Days 1..=7 minus the sentinel: 4.0 + 1.0 + 0.2 + 0.1 + 0.0 + 0.0 over 6 values
    assert_relative_eq!(days[7].precip_7day_avg.unwrap(), 5.3 / 6.0, epsilon = 1e-12);
    // 30-day window spans the whole series here
    assert_relative_eq!(days[7].precip_30day_avg.unwrap(), 11.3 / 7.0, epsilon = 1e-12);
}

#[test]
fn test_thirty_day_average_is_reported_but_not_scored() {
    // 31 identical days: the 30-day mean is below every precipitation
    // threshold yet adds nothing beyond the 7-day rule.
    let start = date(2025, 1, 1);
    let records: Vec<DailyRecord> = (0..31)
        .map(|i| {
            DailyRecord::new(start + chrono::Duration::days(i))
                .with(Parameter::Precipitation, 0.5)
                .with(Parameter::RootZoneWetness, 0.5)
        })
        .collect();
    let mut series = Series::new(records).unwrap();
    let days = classify::run(&mut series).unwrap();
    let last = days.last().unwrap();

    assert_relative_eq!(last.precip_30day_avg.unwrap(), 0.5);
    // basic: precip 0.5 -> +2; advanced: 0.6 * 2 + dry week 2
    assert_eq!(last.basic_score, 2);
    assert_relative_eq!(last.advanced_risk, 3.2, epsilon = 1e-12);
    assert_eq!(last.advanced_category, DroughtCategory::Severe);
}

// ---------------------------------------------------------------------------
// Documented scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_scenario_extreme_single_day() {
    let record = DailyRecord::new(date(2025, 8, 1))
        .with(Parameter::RootZoneWetness, 0.1)
        .with(Parameter::SurfaceWetness, 0.1)
        .with(Parameter::Precipitation, 0.2)
        .with(Parameter::Evapotranspiration, 4.0)
        .with(Parameter::ConsecutiveDryDays, 35.0)
        .with(Parameter::Temperature, 37.0)
        .with(Parameter::SurfaceTempMax, 40.0)
        .with(Parameter::SurfaceTempMin, 30.0)
        .with(Parameter::SolarRadiation, 27.0)
        .with(Parameter::RelativeHumidity, 20.0)
        .with(Parameter::WindSpeed10m, 9.0);
    let score = point::score_day(&record);
    assert!(score.score >= 15);
    assert_eq!(score.category, DroughtCategory::Extreme);
}

#[test]
fn test_scenario_two_day_trend() {
    let records = vec![
        DailyRecord::new(date(2025, 8, 1))
            .with(Parameter::RootZoneWetness, 0.5)
            .with(Parameter::Precipitation, 10.0),
        DailyRecord::new(date(2025, 8, 2))
            .with(Parameter::RootZoneWetness, 0.4)
            .with(Parameter::Precipitation, 4.0),
    ];
    let mut series = Series::new(records).unwrap();
    let days = classify::run(&mut series).unwrap();

    let basic = days[1].basic_score as f64;
    assert_relative_eq!(days[1].advanced_risk, 0.6 * basic + 2.0 + 1.0, epsilon = 1e-12);
}

#[test]
fn test_scenario_missing_root_zone_scores_as_wet() {
    let with = DailyRecord::new(date(2025, 8, 1))
        .with(Parameter::RootZoneWetness, 1.0)
        .with(Parameter::Temperature, 31.0);
    let without = DailyRecord::new(date(2025, 8, 1)).with(Parameter::Temperature, 31.0);
    assert_eq!(point::score_day(&with), point::score_day(&without));
}

#[test]
fn test_derived_calculator_is_idempotent_on_parsed_payload() {
    let mut series = power::parse_daily_response(DRYING_WEEK).unwrap();
    derived::augment(&mut series);
    let once = series.clone();
    derived::augment(&mut series);
    assert_eq!(series, once);
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

#[test]
fn test_payload_without_parameters_refuses_to_run() {
    let body = r#"{"messages": ["The POWER API returned no data"], "properties": {}}"#;
    assert_eq!(power::parse_daily_response(body), Err(DroughtError::NoInputData));
}

#[test]
fn test_payload_with_only_unscored_codes_refuses_to_run() {
    let body = r#"{"properties": {"parameter": {
        "SNODP": {"20250701": 0.0, "20250702": 0.0}
    }}}"#;
    assert_eq!(power::parse_daily_response(body), Err(DroughtError::NoInputData));
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[test]
fn test_summary_counts_every_day_once() {
    let mut series = power::parse_daily_response(DRYING_WEEK).unwrap();
    let days = classify::run(&mut series).unwrap();
    let summary = Summary::from_classifications(&Location::reference(), &series, &days);

    let counted: usize = summary.distribution.iter().map(|c| c.days).sum();
    assert_eq!(counted, 8);
    assert_eq!(summary.worst(), Some(DroughtCategory::Extreme));
    assert_relative_eq!(summary.mean_precip_mm.unwrap(), 11.3 / 7.0, epsilon = 1e-12);
}
