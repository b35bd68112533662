//! Day-by-day packing of task hours into a work week.

mod advisory;
mod fallback;

pub use advisory::{
    AdvisoryProposal, AdvisoryRejection, ValidatedProposal, extract_json_object,
    validate_proposal,
};

use crate::calendar::{DayCapacity, WorkWeekConfig, round_to};
use crate::task::Task;
use crate::validation::{self, ValidationError};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

pub(crate) const HOURS_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSegment {
    pub task_key: String,
    pub allocated_hours: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkDay {
    pub day: Weekday,
    pub available_hours: f64,
    pub segments: Vec<ScheduledSegment>,
}

impl WorkDay {
    pub fn allocated_hours(&self) -> f64 {
        self.segments.iter().map(|s| s.allocated_hours).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnassignedTask {
    pub task_key: String,
    pub remaining_hours: f64,
    pub reason: String,
}

/// Where the final schedule came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleSource {
    Fallback,
    Advisory,
    AdvisoryRepaired { days: Vec<Weekday> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_tasks: usize,
    pub total_task_hours: f64,
    pub available_hours: f64,
    pub allocated_hours: f64,
    pub utilization_percentage: f64,
    pub source: ScheduleSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub schedule: Vec<WorkDay>,
    pub unassigned_tasks: Vec<UnassignedTask>,
    pub utilization_percentage: f64,
    pub summary: ScheduleSummary,
}

impl ScheduleResult {
    pub fn day(&self, day: Weekday) -> Option<&WorkDay> {
        self.schedule.iter().find(|work_day| work_day.day == day)
    }

    /// Hours given to `task_key` across the whole week.
    pub fn allocated_to(&self, task_key: &str) -> f64 {
        self.schedule
            .iter()
            .flat_map(|day| &day.segments)
            .filter(|segment| segment.task_key == task_key)
            .map(|segment| segment.allocated_hours)
            .sum()
    }
}

/// Schedules `tasks` over `week`, preferring a valid advisory proposal.
///
/// Rejected proposals fall back to the deterministic priority packing. Days
/// of an accepted proposal that break a rule are repaired in place.
#[instrument(
    skip(tasks, week, proposal),
    fields(tasks = tasks.len(), days = week.work_days.len())
)]
pub fn schedule(
    tasks: &[Task],
    week: &WorkWeekConfig,
    proposal: AdvisoryProposal,
) -> Result<ScheduleResult, ValidationError> {
    validation::validate_tasks(tasks)?;
    validation::validate_work_week(week)?;
    let capacities = week.day_capacities();

    let validated = match proposal {
        AdvisoryProposal::None => None,
        AdvisoryProposal::Unvalidated(raw) => {
            match validate_proposal(&raw, tasks, &capacities) {
                Ok(validated) => Some(validated),
                Err(err) => {
                    warn!(error = %err, "advisory proposal rejected, using fallback");
                    None
                }
            }
        }
        AdvisoryProposal::Validated(validated) => {
            if !validated.fits(&capacities) {
                let error = AdvisoryRejection::WeekMismatch;
                warn!(error = %error, "advisory proposal rejected, using fallback");
                None
            } else if !validated.covers(tasks) {
                let error = AdvisoryRejection::TaskMismatch;
                warn!(error = %error, "advisory proposal rejected, using fallback");
                None
            } else {
                Some(validated)
            }
        }
    };

    let result = match validated {
        Some(validated) => from_proposal(tasks, &capacities, validated),
        None => {
            let ordered = fallback::fallback_order(tasks);
            let (days, unassigned) = fallback::pack(&ordered, &capacities);
            assemble(tasks, days, unassigned, ScheduleSource::Fallback)
        }
    };
    info!(
        utilization = result.utilization_percentage,
        unassigned = result.unassigned_tasks.len(),
        "week scheduled"
    );
    Ok(result)
}

fn from_proposal(
    tasks: &[Task],
    capacities: &[DayCapacity],
    validated: ValidatedProposal,
) -> ScheduleResult {
    let source = if validated.repaired_days().is_empty() {
        ScheduleSource::Advisory
    } else {
        ScheduleSource::AdvisoryRepaired {
            days: validated.repaired_days().to_vec(),
        }
    };
    debug_assert!(validated.fits(capacities));
    let days = validated.into_days();

    let mut allocated: HashMap<&str, f64> = HashMap::new();
    for segment in days.iter().flat_map(|day| &day.segments) {
        *allocated.entry(segment.task_key.as_str()).or_insert(0.0) += segment.allocated_hours;
    }
    let unassigned = tasks
        .iter()
        .filter_map(|task| {
            let given = allocated.get(task.key.as_str()).copied().unwrap_or(0.0);
            let outstanding = task.remaining_hours - given;
            (outstanding > HOURS_EPSILON).then(|| fallback::unassigned(task, outstanding))
        })
        .collect();
    assemble(tasks, days, unassigned, source)
}

fn assemble(
    tasks: &[Task],
    schedule: Vec<WorkDay>,
    unassigned_tasks: Vec<UnassignedTask>,
    source: ScheduleSource,
) -> ScheduleResult {
    let available_hours: f64 = schedule.iter().map(|day| day.available_hours).sum();
    let allocated_hours: f64 = schedule.iter().map(WorkDay::allocated_hours).sum();
    let utilization_percentage = if available_hours > 0.0 {
        round_to(allocated_hours / available_hours * 100.0, 1)
    } else {
        0.0
    };
    ScheduleResult {
        summary: ScheduleSummary {
            total_tasks: tasks.len(),
            total_task_hours: tasks.iter().map(|task| task.remaining_hours).sum(),
            available_hours,
            allocated_hours,
            utilization_percentage,
            source,
        },
        schedule,
        unassigned_tasks,
        utilization_percentage,
    }
}
