//! Payload Coverage Verification
//!
//! Checks a provider payload against the configured parameter list to show
//! which parameters actually carry values, and how many days are complete.
//!
//! Run this before trusting a new location or window: a parameter that is
//! missing everywhere is silently replaced by the scorer's default.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::ingest::power;
use crate::model::{DroughtError, Parameter, Series};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageReport {
    pub timestamp: String,
    pub total_days: usize,
    pub complete_days: usize,
    pub parameters: Vec<ParameterCoverage>,
    pub summary: CoverageSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub parameters_total: usize,
    pub parameters_complete: usize,
    pub parameters_partial: usize,
    pub parameters_failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterCoverage {
    pub parameter: Parameter,
    pub status: VerificationStatus,
    pub days_present: usize,
    pub days_missing: usize,
    pub first_missing: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Coverage
// ============================================================================

/// Number of days on which every `required` parameter is present.
pub fn complete_days(series: &Series, required: &[Parameter]) -> usize {
    series
        .records()
        .iter()
        .filter(|r| required.iter().all(|p| r.has(*p)))
        .count()
}

fn parameter_coverage(series: &Series, parameter: Parameter) -> ParameterCoverage {
    let days_present = series.records().iter().filter(|r| r.has(parameter)).count();
    let days_missing = series.len() - days_present;
    let first_missing = series
        .records()
        .iter()
        .find(|r| !r.has(parameter))
        .map(|r| r.date.to_string());

    let status = if days_missing == 0 {
        VerificationStatus::Success
    } else if days_present > 0 {
        VerificationStatus::PartialSuccess
    } else {
        VerificationStatus::Failed
    };

    ParameterCoverage {
        parameter,
        status,
        days_present,
        days_missing,
        first_missing,
    }
}

/// Coverage of `expected` over an already-parsed series.
pub fn verify_series(series: &Series, expected: &[Parameter]) -> CoverageReport {
    let parameters: Vec<ParameterCoverage> = expected
        .iter()
        .map(|p| parameter_coverage(series, *p))
        .collect();

    let count = |status: VerificationStatus| parameters.iter().filter(|c| c.status == status).count();
    let summary = CoverageSummary {
        parameters_total: parameters.len(),
        parameters_complete: count(VerificationStatus::Success),
        parameters_partial: count(VerificationStatus::PartialSuccess),
        parameters_failed: count(VerificationStatus::Failed),
    };

    CoverageReport {
        timestamp: Utc::now().to_rfc3339(),
        total_days: series.len(),
        complete_days: complete_days(series, expected),
        parameters,
        summary,
    }
}

/// Parses a daily point payload and reports coverage of `expected`.
pub fn verify_payload(body: &str, expected: &[Parameter]) -> Result<CoverageReport, DroughtError> {
    let series = power::parse_daily_response(body)?;
    Ok(verify_series(&series, expected))
}

// ============================================================================
// Tests
// ============================================================================
