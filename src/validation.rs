use crate::calendar::WorkWeekConfig;
use crate::project::{PlanningPeriod, Project};
use crate::resource::Resource;
use crate::task::Task;
use std::collections::HashSet;
use thiserror::Error;

const EPSILON: f64 = 1e-6;

/// Input rejected before any engine work starts.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

pub fn validate_period(period: &PlanningPeriod) -> Result<(), ValidationError> {
    if period.start > period.end {
        return Err(ValidationError::new(format!(
            "planning period start {} is after end {}",
            period.start, period.end
        )));
    }
    Ok(())
}

pub fn validate_resource(resource: &Resource) -> Result<(), ValidationError> {
    if resource.id.trim().is_empty() {
        return Err(ValidationError::new("resource requires a non-empty id"));
    }
    if !resource.capacity.is_finite() || resource.capacity <= 0.0 {
        return Err(ValidationError::new(format!(
            "resource {} has invalid capacity {} (must be positive)",
            resource.id, resource.capacity
        )));
    }
    if let Some(available) = resource.available_capacity {
        if !non_negative(available) || available > resource.capacity + EPSILON {
            return Err(ValidationError::new(format!(
                "resource {} has invalid available_capacity {} (must be between 0 and {})",
                resource.id, available, resource.capacity
            )));
        }
    }
    if !non_negative(resource.cost_per_unit) {
        return Err(ValidationError::new(format!(
            "resource {} has invalid cost_per_unit {}",
            resource.id, resource.cost_per_unit
        )));
    }
    Ok(())
}

pub fn validate_resources(resources: &[Resource]) -> Result<(), ValidationError> {
    if resources.is_empty() {
        return Err(ValidationError::new(
            "resource pool is empty; supply at least one resource",
        ));
    }
    let mut seen = HashSet::with_capacity(resources.len());
    for resource in resources {
        if !seen.insert(resource.id.as_str()) {
            return Err(ValidationError::new(format!(
                "duplicate resource id {}",
                resource.id
            )));
        }
        validate_resource(resource)?;
    }
    Ok(())
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.id.trim().is_empty() {
        return Err(ValidationError::new("project requires a non-empty id"));
    }
    if !non_negative(project.required_capacity()) {
        return Err(ValidationError::new(format!(
            "project {} has invalid required capacity {}",
            project.id,
            project.required_capacity()
        )));
    }
    if project.start_date > project.end_date {
        return Err(ValidationError::new(format!(
            "project {} starts {} after it ends {}",
            project.id, project.start_date, project.end_date
        )));
    }
    Ok(())
}

pub fn validate_projects(projects: &[Project]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(projects.len());
    for project in projects {
        if !seen.insert(project.id.as_str()) {
            return Err(ValidationError::new(format!(
                "duplicate project id {}",
                project.id
            )));
        }
        validate_project(project)?;
    }
    Ok(())
}

pub fn validate_task(task: &Task) -> Result<(), ValidationError> {
    if task.key.trim().is_empty() {
        return Err(ValidationError::new("task requires a non-empty key"));
    }
    if !non_negative(task.remaining_hours) {
        return Err(ValidationError::new(format!(
            "task {} has invalid remaining_hours {}",
            task.key, task.remaining_hours
        )));
    }
    Ok(())
}

pub fn validate_tasks(tasks: &[Task]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if !seen.insert(task.key.as_str()) {
            return Err(ValidationError::new(format!("duplicate task key {}", task.key)));
        }
        validate_task(task)?;
    }
    Ok(())
}

pub fn validate_work_week(config: &WorkWeekConfig) -> Result<(), ValidationError> {
    if config.work_days.is_empty() {
        return Err(ValidationError::new(
            "work week requires at least one work day",
        ));
    }
    let mut seen = HashSet::with_capacity(config.work_days.len());
    for day in &config.work_days {
        if !seen.insert(*day) {
            return Err(ValidationError::new(format!(
                "work day {day} is listed more than once"
            )));
        }
    }
    if !config.hours_per_day.is_finite()
        || config.hours_per_day <= 0.0
        || config.hours_per_day > 24.0
    {
        return Err(ValidationError::new(format!(
            "hours_per_day {} must be within (0, 24]",
            config.hours_per_day
        )));
    }
    for (day, meetings) in &config.meetings_by_day {
        for meeting in meetings {
            if !non_negative(meeting.duration_hours) {
                return Err(ValidationError::new(format!(
                    "meeting on {day} has invalid duration {}",
                    meeting.duration_hours
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Meeting;
    use crate::task::TaskPriority;
    use chrono::{NaiveDate, Weekday};

    #[test]
    fn rejects_non_positive_capacity_and_overfull_availability() {
        let err = validate_resource(&Resource::human("r1", 0.0)).unwrap_err();
        assert!(err.message().contains("invalid capacity"));

        let err = validate_resource(&Resource::human("r1", 10.0).with_available(12.0)).unwrap_err();
        assert!(err.message().contains("available_capacity"));
    }

    #[test]
    fn empty_pool_and_duplicate_ids_are_rejected() {
        assert!(validate_resources(&[]).is_err());
        let pool = [Resource::human("r1", 10.0), Resource::human("r1", 20.0)];
        let err = validate_resources(&pool).unwrap_err();
        assert_eq!(err.to_string(), "duplicate resource id r1");
    }

    #[test]
    fn negative_task_hours_are_rejected() {
        let task = Task::new("T-1", TaskPriority::High, -1.0);
        assert!(validate_task(&task).is_err());
        assert!(validate_task(&Task::new("T-2", TaskPriority::High, 0.0)).is_ok());
    }

    #[test]
    fn project_dates_must_be_ordered() {
        let d = |m| NaiveDate::from_ymd_opt(2025, m, 1).unwrap();
        let project = Project::new("p1", 10.0, d(5), d(4));
        assert!(validate_project(&project).is_err());
    }

    #[test]
    fn work_week_rules() {
        assert!(validate_work_week(&WorkWeekConfig::default()).is_ok());
        assert!(validate_work_week(&WorkWeekConfig::new([], 8.0)).is_err());
        let doubled = WorkWeekConfig::new([Weekday::Mon, Weekday::Mon], 8.0);
        assert!(validate_work_week(&doubled).is_err());
        let week = WorkWeekConfig::default().with_meeting(Weekday::Tue, Meeting::new(-2.0));
        assert!(validate_work_week(&week).is_err());
    }
}
