//! Monthly utilization report over stored plan records.

use crate::plan::CapacityPlan;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("report column {0} missing")]
    MissingColumn(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUtilization {
    pub resource_id: String,
    pub total_planned_capacity: f64,
    pub average_utilization_rate: f64,
    pub average_efficiency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAllocation {
    pub project_id: String,
    pub total_allocated_capacity: f64,
    pub resources_assigned: i64,
    pub average_efficiency_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationReport {
    pub month: u32,
    pub year: i32,
    pub total_plans: usize,
    pub resources: Vec<ResourceUtilization>,
    pub projects: Vec<ProjectAllocation>,
}

fn plans_frame(plans: &[&CapacityPlan]) -> PolarsResult<DataFrame> {
    df![
        "resource_id" => plans.iter().map(|p| p.resource_id.as_str()).collect::<Vec<_>>(),
        "project_id" => plans.iter().map(|p| p.project_id.as_str()).collect::<Vec<_>>(),
        "planned_capacity" => plans.iter().map(|p| p.planned_capacity).collect::<Vec<_>>(),
        "utilization_rate" => plans.iter().map(|p| p.utilization_rate).collect::<Vec<_>>(),
        "efficiency_score" => plans.iter().map(|p| p.efficiency_score).collect::<Vec<_>>(),
    ]
}

fn str_column(frame: &DataFrame, name: &'static str) -> Result<Vec<String>, ReportError> {
    let column = frame
        .column(name)
        .map_err(|_| ReportError::MissingColumn(name))?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect())
}

fn f64_column(frame: &DataFrame, name: &'static str) -> Result<Vec<f64>, ReportError> {
    let column = frame
        .column(name)
        .map_err(|_| ReportError::MissingColumn(name))?;
    Ok(column
        .f64()?
        .into_iter()
        .map(|value| value.unwrap_or(0.0))
        .collect())
}

fn i64_column(frame: &DataFrame, name: &'static str) -> Result<Vec<i64>, ReportError> {
    let column = frame
        .column(name)
        .map_err(|_| ReportError::MissingColumn(name))?;
    Ok(column
        .i64()?
        .into_iter()
        .map(|value| value.unwrap_or(0))
        .collect())
}

/// Per-resource and per-project breakdown of the plans recorded for one month.
///
/// Groups keep the order in which resources and projects first appear.
#[instrument(skip(plans), fields(plans = plans.len()))]
pub fn utilization_report(
    plans: &[CapacityPlan],
    month: u32,
    year: i32,
) -> Result<UtilizationReport, ReportError> {
    let selected: Vec<&CapacityPlan> = plans
        .iter()
        .filter(|p| p.month == month && p.year == year)
        .collect();
    if selected.is_empty() {
        return Ok(UtilizationReport {
            month,
            year,
            total_plans: 0,
            resources: Vec::new(),
            projects: Vec::new(),
        });
    }

    let frame = plans_frame(&selected)?;

    let by_resource = frame
        .clone()
        .lazy()
        .group_by_stable([col("resource_id")])
        .agg([
            col("planned_capacity").sum().alias("total_planned_capacity"),
            col("utilization_rate").mean().alias("average_utilization_rate"),
            col("efficiency_score").mean().alias("average_efficiency_score"),
        ])
        .collect()?;

    let by_project = frame
        .lazy()
        .group_by_stable([col("project_id")])
        .agg([
            col("planned_capacity").sum().alias("total_allocated_capacity"),
            col("resource_id")
                .n_unique()
                .cast(DataType::Int64)
                .alias("resources_assigned"),
            col("efficiency_score").mean().alias("average_efficiency_score"),
        ])
        .collect()?;

    let resources = str_column(&by_resource, "resource_id")?
        .into_iter()
        .zip(f64_column(&by_resource, "total_planned_capacity")?)
        .zip(f64_column(&by_resource, "average_utilization_rate")?)
        .zip(f64_column(&by_resource, "average_efficiency_score")?)
        .map(
            |(((resource_id, total), utilization), efficiency)| ResourceUtilization {
                resource_id,
                total_planned_capacity: total,
                average_utilization_rate: utilization,
                average_efficiency_score: efficiency,
            },
        )
        .collect();

    let projects = str_column(&by_project, "project_id")?
        .into_iter()
        .zip(f64_column(&by_project, "total_allocated_capacity")?)
        .zip(i64_column(&by_project, "resources_assigned")?)
        .zip(f64_column(&by_project, "average_efficiency_score")?)
        .map(
            |(((project_id, total), assigned), efficiency)| ProjectAllocation {
                project_id,
                total_allocated_capacity: total,
                resources_assigned: assigned,
                average_efficiency_score: efficiency,
            },
        )
        .collect();

    Ok(UtilizationReport {
        month,
        year,
        total_plans: selected.len(),
        resources,
        projects,
    })
}
