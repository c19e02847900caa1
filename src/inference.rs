//! Single-record inference seam for an externally trained model.
//!
//! The model and its feature scaling live outside this crate. This module
//! only shapes one record into the model's expected feature order. Absent
//! features are filled with 0, not with the rule-based scorer's per-field
//! defaults.

use std::collections::BTreeMap;

use crate::model::{DailyRecord, DroughtCategory, DroughtError};

/// A fitted classifier that consumes a fixed, ordered feature list.
pub trait DroughtModel {
    /// Feature names in the order `predict` expects them.
    fn feature_names(&self) -> &[String];

    fn predict(&self, features: &[f64]) -> Result<DroughtCategory, DroughtError>;
}

/// Orders `flat` by `feature_names`, filling absent or NaN features with 0.
pub fn feature_vector(flat: &BTreeMap<String, f64>, feature_names: &[String]) -> Vec<f64> {
    feature_names
        .iter()
        .map(|name| flat.get(name).copied().filter(|v| !v.is_nan()).unwrap_or(0.0))
        .collect()
}

/// Runs `model` on one record.
pub fn predict_record<M: DroughtModel + ?Sized>(
    model: &M,
    record: &DailyRecord,
) -> Result<DroughtCategory, DroughtError> {
    let features = feature_vector(&record.to_flat_map(), model.feature_names());
    model.predict(&features)
}
