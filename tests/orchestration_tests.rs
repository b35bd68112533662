use capacity_planner::{
    AdvisoryService, CalendarSource, DayCapacity, Meeting, OrchestrationError, PlannerConfig,
    ScheduleSource, SourceError, Task, TaskPriority, TaskSource, WorkWeekConfig, organize_week,
};
use chrono::Weekday;
use std::collections::HashMap;

struct FailingTracker;

impl TaskSource for FailingTracker {
    fn fetch_tasks(&self) -> Result<Vec<Task>, SourceError> {
        Err(SourceError::new("tracker", "connection refused"))
    }
}

struct BrokenCalendar;

impl CalendarSource for BrokenCalendar {
    fn fetch_meetings(
        &self,
        _work_days: &[Weekday],
    ) -> Result<HashMap<Weekday, Vec<Meeting>>, SourceError> {
        Err(SourceError::new("calendar", "token expired"))
    }
}

struct CannedAdvisor(Result<String, SourceError>);

impl AdvisoryService for CannedAdvisor {
    fn propose_schedule(
        &self,
        _tasks: &[Task],
        _days: &[DayCapacity],
    ) -> Result<String, SourceError> {
        self.0.clone()
    }
}

fn two_day_config() -> PlannerConfig {
    PlannerConfig {
        work_week: WorkWeekConfig::new([Weekday::Mon, Weekday::Tue], 8.0),
        ..PlannerConfig::default()
    }
}

fn tasks() -> Vec<Task> {
    vec![
        Task::new("WEB-1", TaskPriority::Medium, 5.0),
        Task::new("WEB-2", TaskPriority::High, 6.0),
    ]
}

#[test]
fn meetings_from_calendar_shrink_the_week() {
    let mut meetings = HashMap::new();
    meetings.insert(Weekday::Mon, vec![Meeting::new(3.0), Meeting::all_day()]);
    meetings.insert(Weekday::Sat, vec![Meeting::new(4.0)]);

    let week = organize_week(&tasks(), Some(&meetings), None, &two_day_config()).unwrap();
    assert_eq!(week.result.schedule[0].available_hours, 5.0);
    assert_eq!(week.meetings.total_meetings, 2);
    assert_eq!(week.meetings.total_meeting_hours, 3.0);
    assert_eq!(week.result.schedule[0].segments[0].task_key, "WEB-2");
    assert_eq!(week.result.summary.source, ScheduleSource::Fallback);
}

#[test]
fn advisory_text_is_validated_and_used() {
    let advisor = CannedAdvisor(Ok(r#"Sure! Here is the plan:
        {"schedule": {"Monday": [{"task_key": "WEB-1", "allocated_hours": 5}],
                      "Tuesday": [{"task_key": "WEB-2", "allocated_hours": 6}]}}
        Let me know if you need changes."#
        .to_string()));
    let week = organize_week(&tasks(), None, Some(&advisor), &two_day_config()).unwrap();
    assert_eq!(week.result.summary.source, ScheduleSource::Advisory);
    assert_eq!(week.result.schedule[0].segments[0].task_key, "WEB-1");
    assert!(week.result.unassigned_tasks.is_empty());
}

#[test]
fn advisory_failures_fall_back_quietly() {
    let failing = CannedAdvisor(Err(SourceError::new("advisor", "rate limited")));
    let week = organize_week(&tasks(), None, Some(&failing), &two_day_config()).unwrap();
    assert_eq!(week.result.summary.source, ScheduleSource::Fallback);

    let rambling = CannedAdvisor(Ok("I am not able to help with that.".to_string()));
    let week = organize_week(&tasks(), None, Some(&rambling), &two_day_config()).unwrap();
    assert_eq!(week.result.summary.source, ScheduleSource::Fallback);
    assert_eq!(week.result.utilization_percentage, 68.8);
}

#[test]
fn source_failures_abort() {
    let err = organize_week(&FailingTracker, None, None, &two_day_config()).unwrap_err();
    assert!(matches!(err, OrchestrationError::Tasks(_)));
    assert!(err.to_string().contains("connection refused"));

    let err = organize_week(&tasks(), Some(&BrokenCalendar), None, &two_day_config()).unwrap_err();
    assert!(matches!(err, OrchestrationError::Calendar(_)));
}

#[test]
fn invalid_tasks_surface_as_validation_errors() {
    let bad = vec![
        Task::new("DUP", TaskPriority::Low, 1.0),
        Task::new("DUP", TaskPriority::Low, 2.0),
    ];
    let err = organize_week(&bad, None, None, &two_day_config()).unwrap_err();
    assert!(matches!(err, OrchestrationError::Validation(_)));
}
