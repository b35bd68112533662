//! Validation and repair of externally proposed day schedules.
//!
//! A proposal is untrusted until [`validate_proposal`] has checked it against
//! the task list and each day's capacity. Days that break a rule are discarded
//! and re-packed from the tasks they mentioned.

use super::fallback::empty_days;
use super::{HOURS_EPSILON, ScheduledSegment, WorkDay};
use crate::calendar::{DayCapacity, day_name};
use crate::task::Task;
use chrono::Weekday;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

const ADVISORY_REASON: &str = "Proposed by advisory service";

/// Schedule proposal from an advisory collaborator.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AdvisoryProposal {
    #[default]
    None,
    /// Raw proposal JSON, not yet checked.
    Unvalidated(Value),
    Validated(ValidatedProposal),
}

impl AdvisoryProposal {
    /// Pulls a proposal out of free-form advisory text. Text without a JSON
    /// object yields `None`.
    pub fn from_text(text: &str) -> Self {
        match extract_json_object(text) {
            Some(value) => AdvisoryProposal::Unvalidated(value),
            None => AdvisoryProposal::None,
        }
    }
}

/// A proposal that satisfies every day's capacity and every task's remaining hours.
///
/// Only [`validate_proposal`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProposal {
    days: Vec<WorkDay>,
    repaired_days: Vec<Weekday>,
}

impl ValidatedProposal {
    pub fn days(&self) -> &[WorkDay] {
        &self.days
    }

    /// Days whose proposed segments were discarded and re-packed.
    pub fn repaired_days(&self) -> &[Weekday] {
        &self.repaired_days
    }

    pub(crate) fn fits(&self, capacities: &[DayCapacity]) -> bool {
        self.days.len() == capacities.len()
            && self.days.iter().zip(capacities).all(|(day, capacity)| {
                day.day == capacity.day
                    && (day.available_hours - capacity.available_hours).abs() <= HOURS_EPSILON
            })
    }

    /// True when every segment names one of `tasks` and no task gets more
    /// hours than it has left.
    pub(crate) fn covers(&self, tasks: &[Task]) -> bool {
        let remaining: HashMap<&str, f64> = tasks
            .iter()
            .map(|task| (task.key.as_str(), task.remaining_hours))
            .collect();
        let mut allocated: HashMap<&str, f64> = HashMap::new();
        for segment in self.days.iter().flat_map(|day| &day.segments) {
            let Some(&limit) = remaining.get(segment.task_key.as_str()) else {
                return false;
            };
            let total = allocated.entry(segment.task_key.as_str()).or_insert(0.0);
            *total += segment.allocated_hours;
            if *total > limit + HOURS_EPSILON {
                return false;
            }
        }
        true
    }

    pub(crate) fn into_days(self) -> Vec<WorkDay> {
        self.days
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdvisoryRejection {
    #[error("advisory proposal is not a JSON object")]
    NotAnObject,
    #[error("advisory proposal has no schedule object")]
    MissingSchedule,
    #[error("validated proposal was built for a different work week")]
    WeekMismatch,
    #[error("validated proposal does not match the task list")]
    TaskMismatch,
}

/// Returns the outermost `{...}` span of `text` parsed as JSON.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

struct ProposedDay {
    segments: Vec<(String, f64, Option<String>)>,
    well_formed: bool,
}

fn parse_segment(value: &Value) -> Option<(String, f64, Option<String>)> {
    let object = value.as_object()?;
    let key = object
        .get("task_key")
        .or_else(|| object.get("taskKey"))?
        .as_str()?
        .to_string();
    let hours = object
        .get("allocated_hours")
        .or_else(|| object.get("allocatedHours"))?
        .as_f64()?;
    let reason = object
        .get("reason")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some((key, hours, reason))
}

fn parse_days(
    schedule: &serde_json::Map<String, Value>,
    capacities: &[DayCapacity],
) -> HashMap<Weekday, ProposedDay> {
    let mut proposed: HashMap<Weekday, ProposedDay> = HashMap::new();
    for (name, entries) in schedule {
        let Ok(day) = name.trim().parse::<Weekday>() else {
            debug!(day = %name, "ignoring unknown day in advisory proposal");
            continue;
        };
        if !capacities.iter().any(|capacity| capacity.day == day) {
            debug!(day = %name, "ignoring non-work day in advisory proposal");
            continue;
        }
        let slot = proposed.entry(day).or_insert_with(|| ProposedDay {
            segments: Vec::new(),
            well_formed: true,
        });
        let Some(entries) = entries.as_array() else {
            slot.well_formed = false;
            continue;
        };
        for entry in entries {
            match parse_segment(entry) {
                Some(segment) => slot.segments.push(segment),
                None => slot.well_formed = false,
            }
        }
    }
    proposed
}

/// Checks `raw` against `tasks` and `capacities`, repairing any day that
/// breaks a rule.
///
/// A day is accepted as proposed when every segment names a known task with a
/// positive finite number of hours, the day's total fits its capacity, and no
/// task is given more hours than it has left. Other days are re-packed from the
/// tasks they mentioned, in task-list order, using what each task still needs.
pub fn validate_proposal(
    raw: &Value,
    tasks: &[Task],
    capacities: &[DayCapacity],
) -> Result<ValidatedProposal, AdvisoryRejection> {
    let object = raw.as_object().ok_or(AdvisoryRejection::NotAnObject)?;
    let schedule = object
        .get("schedule")
        .and_then(Value::as_object)
        .ok_or(AdvisoryRejection::MissingSchedule)?;

    let remaining: HashMap<&str, f64> = tasks
        .iter()
        .map(|task| (task.key.as_str(), task.remaining_hours))
        .collect();
    let proposed = parse_days(schedule, capacities);

    let mut days = empty_days(capacities);
    let mut allocated: HashMap<&str, f64> = HashMap::new();
    let mut repaired_days = Vec::new();

    for day in days.iter_mut() {
        let Some(proposal) = proposed.get(&day.day) else {
            continue;
        };
        let mut tentative: HashMap<&str, f64> = HashMap::new();
        let mut total = 0.0;
        let mut acceptable = proposal.well_formed;
        for (key, hours, _) in &proposal.segments {
            let Some((&known, &limit)) = remaining.get_key_value(key.as_str()) else {
                acceptable = false;
                break;
            };
            if !hours.is_finite() || *hours <= 0.0 {
                acceptable = false;
                break;
            }
            total += hours;
            let cumulative = tentative.entry(known).or_insert_with(|| {
                allocated.get(known).copied().unwrap_or(0.0)
            });
            *cumulative += hours;
            if *cumulative > limit + HOURS_EPSILON {
                acceptable = false;
                break;
            }
        }
        if acceptable && total > day.available_hours + HOURS_EPSILON {
            acceptable = false;
        }

        if acceptable {
            for (key, hours, reason) in &proposal.segments {
                day.segments.push(ScheduledSegment {
                    task_key: key.clone(),
                    allocated_hours: *hours,
                    reason: reason.clone().unwrap_or_else(|| ADVISORY_REASON.to_string()),
                });
            }
            allocated.extend(tentative);
        } else {
            warn!(
                day = day_name(day.day),
                proposed_hours = total,
                available_hours = day.available_hours,
                "advisory day rejected, re-packing its tasks"
            );
            repaired_days.push(day.day);
        }
    }

    for day in days.iter_mut() {
        if !repaired_days.contains(&day.day) {
            continue;
        }
        let Some(proposal) = proposed.get(&day.day) else {
            continue;
        };
        let mut used = 0.0;
        for task in tasks {
            let mentioned = proposal
                .segments
                .iter()
                .any(|(key, _, _)| *key == task.key);
            if !mentioned {
                continue;
            }
            let already = allocated.get(task.key.as_str()).copied().unwrap_or(0.0);
            let outstanding = task.remaining_hours - already;
            let free = day.available_hours - used;
            if outstanding <= HOURS_EPSILON || free <= HOURS_EPSILON {
                continue;
            }
            let hours = outstanding.min(free);
            day.segments.push(ScheduledSegment {
                task_key: task.key.clone(),
                allocated_hours: hours,
                reason: format!("Redistributed: {hours}h allocated"),
            });
            used += hours;
            *allocated.entry(task.key.as_str()).or_insert(0.0) += hours;
        }
    }

    Ok(ValidatedProposal {
        days,
        repaired_days,
    })
}
