//! Seasonal utilization forecast from historical plan records.
//!
//! Each target month is predicted as the mean utilization of plans recorded
//! for the same calendar month in earlier years. No trend or growth term is
//! modelled.

use crate::plan::CapacityPlan;
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

const HIGH_CONFIDENCE: f64 = 0.8;
const LOW_CONFIDENCE: f64 = 0.6;
/// Samples needed, exclusive, before a prediction counts as high confidence.
const HIGH_CONFIDENCE_SAMPLES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub predicted_utilization: f64,
    pub confidence_level: f64,
    pub sample_size: usize,
}

/// Predictions keyed by `YYYY-MM`. Months without matching history are absent.
pub type ForecastResult = BTreeMap<String, ForecastEntry>;

/// Forecasts `months_ahead` calendar months starting at `reference`'s month.
#[instrument(skip(history), fields(history = history.len()))]
pub fn forecast(
    months_ahead: u32,
    reference: NaiveDate,
    history: &[CapacityPlan],
) -> ForecastResult {
    let mut result = ForecastResult::new();
    let Some(first) = reference.with_day(1) else {
        return result;
    };
    for offset in 0..months_ahead {
        let Some(target) = first.checked_add_months(Months::new(offset)) else {
            break;
        };
        let (month, year) = (target.month(), target.year());
        let samples: Vec<f64> = history
            .iter()
            .filter(|plan| plan.month == month && plan.year < year)
            .map(|plan| plan.utilization_rate)
            .collect();
        if samples.is_empty() {
            continue;
        }
        let predicted_utilization = samples.iter().sum::<f64>() / samples.len() as f64;
        let confidence_level = if samples.len() > HIGH_CONFIDENCE_SAMPLES {
            HIGH_CONFIDENCE
        } else {
            LOW_CONFIDENCE
        };
        result.insert(
            format!("{year}-{month:02}"),
            ForecastEntry {
                predicted_utilization,
                confidence_level,
                sample_size: samples.len(),
            },
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(month: u32, year: i32, utilization_rate: f64) -> CapacityPlan {
        CapacityPlan {
            resource_id: "r1".into(),
            project_id: "p1".into(),
            month,
            year,
            planned_capacity: 10.0,
            utilization_rate,
            efficiency_score: 0.5,
            strategy: None,
        }
    }

    #[test]
    fn same_year_history_is_ignored() {
        let reference = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let history = [plan(3, 2025, 0.9)];
        assert!(forecast(1, reference, &history).is_empty());
    }

    #[test]
    fn wraps_into_next_year() {
        let reference = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let history = [plan(1, 2024, 0.4), plan(12, 2024, 0.6)];
        let result = forecast(2, reference, &history);
        assert_eq!(result.len(), 2);
        assert_eq!(result["2025-12"].predicted_utilization, 0.6);
        assert_eq!(result["2026-01"].predicted_utilization, 0.4);
    }
}
