use crate::plan::CapacityPlan;
use crate::validation::ValidationError;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("no plans stored")]
    NotFound,
}

impl From<ValidationError> for PersistenceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.message().to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Append-only history of produced capacity plans.
pub trait PlanStore {
    fn append_plans(&self, plans: &[CapacityPlan]) -> PersistenceResult<()>;
    fn load_plans(&self) -> PersistenceResult<Vec<CapacityPlan>>;

    fn plans_for_month(&self, month: u32, year: i32) -> PersistenceResult<Vec<CapacityPlan>> {
        Ok(self
            .load_plans()?
            .into_iter()
            .filter(|plan| plan.month == month && plan.year == year)
            .collect())
    }
}

pub fn validate_plans(plans: &[CapacityPlan]) -> PersistenceResult<()> {
    for plan in plans {
        if plan.resource_id.trim().is_empty() || plan.project_id.trim().is_empty() {
            return Err(PersistenceError::InvalidData(
                "plan record requires resource_id and project_id".to_string(),
            ));
        }
        if !(1..=12).contains(&plan.month) {
            return Err(PersistenceError::InvalidData(format!(
                "plan {}/{} has invalid month {}",
                plan.resource_id, plan.project_id, plan.month
            )));
        }
        if !plan.planned_capacity.is_finite() || plan.planned_capacity <= 0.0 {
            return Err(PersistenceError::InvalidData(format!(
                "plan {}/{} has non-positive planned_capacity {}",
                plan.resource_id, plan.project_id, plan.planned_capacity
            )));
        }
        if !plan.utilization_rate.is_finite() || plan.utilization_rate < 0.0 {
            return Err(PersistenceError::InvalidData(format!(
                "plan {}/{} has invalid utilization_rate {}",
                plan.resource_id, plan.project_id, plan.utilization_rate
            )));
        }
        if !(0.0..=1.0).contains(&plan.efficiency_score) {
            return Err(PersistenceError::InvalidData(format!(
                "plan {}/{} has efficiency_score {} outside [0, 1]",
                plan.resource_id, plan.project_id, plan.efficiency_score
            )));
        }
    }
    Ok(())
}

#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod file;

pub use file::{
    InputBundle, load_bundle_from_json, load_plans_from_csv, load_plans_from_json,
    load_projects_from_csv, load_resources_from_csv, load_tasks_from_csv, save_bundle_to_json,
    save_plans_to_csv, save_plans_to_json, save_projects_to_csv, save_resources_to_csv,
    save_tasks_to_csv,
};
