//! Ports to the outside collaborators of week planning.
//!
//! The engine never reaches an issue tracker, calendar, or advisory model on its
//! own. Callers hand in an implementation of each port for every call.

use crate::calendar::{DayCapacity, Meeting, MeetingSummary};
use crate::config::PlannerConfig;
use crate::scheduling::{self, AdvisoryProposal, ScheduleResult};
use crate::task::Task;
use crate::validation::ValidationError;
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{source_name}: {message}")]
pub struct SourceError {
    pub source_name: String,
    pub message: String,
}

impl SourceError {
    pub fn new(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("failed to fetch tasks: {0}")]
    Tasks(SourceError),
    #[error("failed to fetch calendar: {0}")]
    Calendar(SourceError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub trait TaskSource {
    fn fetch_tasks(&self) -> Result<Vec<Task>, SourceError>;
}

pub trait CalendarSource {
    /// Meetings for each of `work_days`. Days without meetings may be omitted.
    fn fetch_meetings(
        &self,
        work_days: &[Weekday],
    ) -> Result<HashMap<Weekday, Vec<Meeting>>, SourceError>;
}

pub trait AdvisoryService {
    /// Free-form text that should contain a JSON schedule proposal.
    fn propose_schedule(&self, tasks: &[Task], days: &[DayCapacity])
    -> Result<String, SourceError>;
}

impl TaskSource for Vec<Task> {
    fn fetch_tasks(&self) -> Result<Vec<Task>, SourceError> {
        Ok(self.clone())
    }
}

impl CalendarSource for HashMap<Weekday, Vec<Meeting>> {
    fn fetch_meetings(
        &self,
        work_days: &[Weekday],
    ) -> Result<HashMap<Weekday, Vec<Meeting>>, SourceError> {
        Ok(self
            .iter()
            .filter(|(day, _)| work_days.contains(day))
            .map(|(day, meetings)| (*day, meetings.clone()))
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizedWeek {
    pub result: ScheduleResult,
    pub meetings: MeetingSummary,
}

/// Fetches tasks and meetings, asks the advisory service for a proposal and
/// schedules the week.
///
/// Task and calendar failures abort. Advisory failures only cost the proposal.
#[instrument(skip_all)]
pub fn organize_week(
    tasks: &dyn TaskSource,
    calendar: Option<&dyn CalendarSource>,
    advisory: Option<&dyn AdvisoryService>,
    config: &PlannerConfig,
) -> Result<OrganizedWeek, OrchestrationError> {
    let tasks = tasks.fetch_tasks().map_err(OrchestrationError::Tasks)?;

    let mut week = config.work_week.clone();
    if let Some(calendar) = calendar {
        let meetings = calendar
            .fetch_meetings(&week.work_days)
            .map_err(OrchestrationError::Calendar)?;
        week.set_meetings(meetings);
    }
    let capacities = week.day_capacities();

    let proposal = match advisory {
        Some(service) => match service.propose_schedule(&tasks, &capacities) {
            Ok(text) => {
                let proposal = AdvisoryProposal::from_text(&text);
                if matches!(proposal, AdvisoryProposal::None) {
                    warn!("advisory response held no JSON object, using fallback");
                }
                proposal
            }
            Err(err) => {
                warn!(error = %err, "advisory service failed, using fallback");
                AdvisoryProposal::None
            }
        },
        None => AdvisoryProposal::None,
    };

    let result = scheduling::schedule(&tasks, &week, proposal)?;
    info!(tasks = tasks.len(), "week organized");
    Ok(OrganizedWeek {
        result,
        meetings: week.meeting_summary(),
    })
}
