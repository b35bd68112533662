pub mod allocation;
pub mod calendar;
pub mod config;
pub mod forecast;
pub mod persistence;
pub mod plan;
pub mod project;
pub mod report;
pub mod resource;
pub mod scheduling;
pub mod sources;
pub mod task;
pub mod validation;

#[cfg(feature = "http_api")]
pub mod http_api;

pub use allocation::{
    PlanSummary, PlanningRequest, PlanningResult, Recommendation, StrategyOutcome,
    generate_capacity_plan,
};
pub use calendar::{DayCapacity, Meeting, MeetingSummary, WorkWeekConfig, parse_work_days};
pub use config::{CapacitySharing, ConfigError, PlannerConfig};
pub use forecast::{ForecastEntry, ForecastResult, forecast};
pub use persistence::{
    InputBundle, PersistenceError, PersistenceResult, PlanStore, load_bundle_from_json,
    load_plans_from_csv, load_plans_from_json, load_projects_from_csv, load_resources_from_csv,
    load_tasks_from_csv, save_bundle_to_json, save_plans_to_csv, save_plans_to_json,
    save_projects_to_csv, save_resources_to_csv, save_tasks_to_csv,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use plan::{AllocationStrategy, CapacityPlan, OptimizationTarget};
pub use project::{PlanningPeriod, Project, ProjectPriority, ProjectStatus, Requirements};
pub use report::{ReportError, UtilizationReport, utilization_report};
pub use resource::{Resource, ResourcePool, ResourceType};
pub use scheduling::{
    AdvisoryProposal, ScheduleResult, ScheduleSource, ScheduleSummary, ScheduledSegment,
    UnassignedTask, ValidatedProposal, WorkDay, schedule,
};
pub use sources::{
    AdvisoryService, CalendarSource, OrchestrationError, OrganizedWeek, SourceError, TaskSource,
    organize_week,
};
pub use task::{Task, TaskPriority};
pub use validation::ValidationError;
