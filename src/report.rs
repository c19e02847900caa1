/// Summary report for a classified series.
///
/// Category distribution plus a handful of means, rendered as plain text for
/// the CLI or serialized as JSON.

use serde::Serialize;
use std::fmt;

use crate::classify::DayClassification;
use crate::config::Location;
use crate::model::{DroughtCategory, Parameter, Series};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: DroughtCategory,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub location: Location,
    pub data_points: usize,
    /// Advanced-category counts, one entry per category in ascending order.
    pub distribution: Vec<CategoryCount>,
    /// Category of the truncated mean basic level.
    pub overall_basic: DroughtCategory,
    pub mean_precip_mm: Option<f64>,
    pub mean_root_zone_wetness: Option<f64>,
    pub mean_temperature_c: Option<f64>,
}

fn mean_of(series: &Series, parameter: Parameter) -> Option<f64> {
    let values: Vec<f64> = series.values(parameter).into_iter().flatten().collect();
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

impl Summary {
    pub fn from_classifications(location: &Location, series: &Series, days: &[DayClassification]) -> Self {
        let distribution = DroughtCategory::ALL
            .iter()
            .map(|c| CategoryCount {
                category: *c,
                days: days.iter().filter(|d| d.advanced_category == *c).count(),
            })
            .collect();

        let overall_basic = if days.is_empty() {
            DroughtCategory::NoDrought
        } else {
            let total: u32 = days.iter().map(|d| d.basic_category.level() as u32).sum();
            let mean_level = (total as usize / days.len()) as u8;
            DroughtCategory::from_level(mean_level).unwrap_or(DroughtCategory::Extreme)
        };

        Self {
            location: location.clone(),
            data_points: days.len(),
            distribution,
            overall_basic,
            mean_precip_mm: mean_of(series, Parameter::Precipitation),
            mean_root_zone_wetness: mean_of(series, Parameter::RootZoneWetness),
            mean_temperature_c: mean_of(series, Parameter::Temperature),
        }
    }

    /// Most severe advanced category seen on any day.
    pub fn worst(&self) -> Option<DroughtCategory> {
        self.distribution
            .iter()
            .filter(|c| c.days > 0)
            .map(|c| c.category)
            .max()
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "n/a".to_string())
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{}", rule)?;
        writeln!(f, "DROUGHT CLASSIFICATION RESULTS")?;
        writeln!(f, "{}", rule)?;
        writeln!(
            f,
            "Location: {} (Lat {}, Lon {})",
            self.location.name, self.location.latitude, self.location.longitude
        )?;
        writeln!(f, "Data Points: {}", self.data_points)?;
        writeln!(f)?;
        writeln!(f, "Drought Distribution:")?;
        for c in &self.distribution {
            writeln!(f, "  {:<12} {}", c.category.label(), c.days)?;
        }
        writeln!(f)?;
        writeln!(f, "Key Statistics:")?;
        writeln!(f, "  Drought: {}", self.overall_basic)?;
        writeln!(f, "  Average Precipitation: {} mm/day", fmt_opt(self.mean_precip_mm, 2))?;
        writeln!(f, "  Average Soil Moisture: {}", fmt_opt(self.mean_root_zone_wetness, 3))?;
        write!(f, "  Average Temperature: {}°C", fmt_opt(self.mean_temperature_c, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify;
    use crate::model::DailyRecord;
    use chrono::{Duration, NaiveDate};

    fn classified(precip: &[f64]) -> (Series, Vec<DayClassification>) {
        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let records = precip
            .iter()
            .enumerate()
            .map(|(i, p)| {
                DailyRecord::new(start + Duration::days(i as i64))
                    .with(Parameter::Precipitation, *p)
                    .with(Parameter::RootZoneWetness, 0.5)
            })
            .collect();
        let mut series = Series::new(records).unwrap();
        let days = classify::run(&mut series).unwrap();
        (series, days)
    }

    #[test]
    fn test_distribution_lists_every_category() {
        let (series, days) = classified(&[10.0, 10.0, 10.0]);
        let summary = Summary::from_classifications(&Location::reference(), &series, &days);
        assert_eq!(summary.distribution.len(), 4);
        assert_eq!(summary.distribution[0].days, 3);
        assert!(summary.distribution[1..].iter().all(|c| c.days == 0));
        assert_eq!(summary.worst(), Some(DroughtCategory::NoDrought));
    }

    #[test]
    fn test_means_skip_missing_values() {
        let (series, days) = classified(&[2.0, 4.0]);
        let summary = Summary::from_classifications(&Location::reference(), &series, &days);
        assert_eq!(summary.mean_precip_mm, Some(3.0));
        assert_eq!(summary.mean_temperature_c, None);
    }

    #[test]
    fn test_display_renders_labels_and_missing_means() {
        let (series, days) = classified(&[10.0]);
        let text = Summary::from_classifications(&Location::reference(), &series, &days).to_string();
        assert!(text.contains("Location: Hargeisa"));
        assert!(text.contains("No Drought"));
        assert!(text.contains("Average Temperature: n/a"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::from_classifications(&Location::reference(), &Series::default(), &[]);
        assert_eq!(summary.data_points, 0);
        assert_eq!(summary.overall_basic, DroughtCategory::NoDrought);
        assert_eq!(summary.worst(), None);
    }
}
