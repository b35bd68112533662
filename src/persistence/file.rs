use super::{PersistenceError, PersistenceResult};
use crate::plan::{AllocationStrategy, CapacityPlan};
use crate::project::{Project, ProjectPriority, ProjectStatus, Requirements};
use crate::resource::{Resource, ResourceType};
use crate::task::{Task, TaskPriority};
use crate::validation;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Everything the planner reads from disk in one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputBundle {
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub history: Vec<CapacityPlan>,
}

impl InputBundle {
    fn validate(&self) -> PersistenceResult<()> {
        if !self.resources.is_empty() {
            validation::validate_resources(&self.resources)?;
        }
        validation::validate_projects(&self.projects)?;
        validation::validate_tasks(&self.tasks)?;
        super::validate_plans(&self.history)?;
        Ok(())
    }
}

fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> PersistenceResult<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

pub fn save_bundle_to_json<P: AsRef<Path>>(bundle: &InputBundle, path: P) -> PersistenceResult<()> {
    bundle.validate()?;
    write_json(bundle, path)
}

pub fn load_bundle_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<InputBundle> {
    let bundle: InputBundle = read_json(path)?;
    bundle.validate()?;
    Ok(bundle)
}

pub fn save_plans_to_json<P: AsRef<Path>>(
    plans: &[CapacityPlan],
    path: P,
) -> PersistenceResult<()> {
    super::validate_plans(plans)?;
    write_json(plans, path)
}

pub fn load_plans_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<CapacityPlan>> {
    let plans: Vec<CapacityPlan> = read_json(path)?;
    super::validate_plans(&plans)?;
    Ok(plans)
}

fn write_csv<R: Serialize, P: AsRef<Path>>(
    records: impl IntoIterator<Item = R>,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_csv<R: DeserializeOwned, P: AsRef<Path>>(path: P, what: &str) -> PersistenceResult<Vec<R>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for record in reader.deserialize::<R>() {
        records.push(record?);
    }
    if records.is_empty() {
        return Err(PersistenceError::InvalidData(format!(
            "CSV file contained no {what}"
        )));
    }
    Ok(records)
}

#[derive(Serialize, Deserialize)]
struct ResourceCsvRecord {
    id: String,
    name: String,
    #[serde(rename = "type")]
    resource_type: String,
    capacity: f64,
    available_capacity: String,
    cost_per_unit: f64,
    skills: String,
}

impl From<&Resource> for ResourceCsvRecord {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id.clone(),
            name: resource.name.clone(),
            resource_type: resource.resource_type.as_str().to_string(),
            capacity: resource.capacity,
            available_capacity: format_option_f64(resource.available_capacity),
            cost_per_unit: resource.cost_per_unit,
            skills: resource.skills.iter().cloned().collect::<Vec<_>>().join(";"),
        }
    }
}

impl ResourceCsvRecord {
    fn into_resource(self) -> PersistenceResult<Resource> {
        let resource_type = ResourceType::from_str(&self.resource_type).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid resource type '{}'", self.resource_type))
        })?;
        let mut resource = Resource::new(self.id, resource_type, self.capacity)
            .with_name(self.name)
            .with_cost(self.cost_per_unit);
        resource.available_capacity = parse_f64(&self.available_capacity)?;
        resource.skills = split_strings(&self.skills).into_iter().collect();
        Ok(resource)
    }
}

pub fn save_resources_to_csv<P: AsRef<Path>>(
    resources: &[Resource],
    path: P,
) -> PersistenceResult<()> {
    validation::validate_resources(resources)?;
    write_csv(resources.iter().map(ResourceCsvRecord::from), path)
}

pub fn load_resources_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Resource>> {
    let resources = read_csv::<ResourceCsvRecord, _>(path, "resources")?
        .into_iter()
        .map(ResourceCsvRecord::into_resource)
        .collect::<PersistenceResult<Vec<_>>>()?;
    validation::validate_resources(&resources)?;
    Ok(resources)
}

#[derive(Serialize, Deserialize)]
struct ProjectCsvRecord {
    id: String,
    name: String,
    priority: String,
    status: String,
    start_date: String,
    end_date: String,
    required_capacity: f64,
}

impl From<&Project> for ProjectCsvRecord {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            priority: project.priority.as_str().to_string(),
            status: project.status.as_str().to_string(),
            start_date: format_date(project.start_date),
            end_date: format_date(project.end_date),
            required_capacity: project.required_capacity(),
        }
    }
}

impl ProjectCsvRecord {
    fn into_project(self) -> PersistenceResult<Project> {
        let priority = ProjectPriority::from_str(&self.priority).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid project priority '{}'", self.priority))
        })?;
        let status = ProjectStatus::from_str(&self.status).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid project status '{}'", self.status))
        })?;
        let mut project = Project::new(
            self.id,
            self.required_capacity,
            parse_date(&self.start_date)?,
            parse_date(&self.end_date)?,
        )
        .with_priority(priority)
        .with_status(status);
        project.name = self.name;
        Ok(project)
    }
}

/// Only the required capacity of each project's requirements is written.
pub fn save_projects_to_csv<P: AsRef<Path>>(
    projects: &[Project],
    path: P,
) -> PersistenceResult<()> {
    validation::validate_projects(projects)?;
    write_csv(projects.iter().map(ProjectCsvRecord::from), path)
}

pub fn load_projects_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Project>> {
    let projects = read_csv::<ProjectCsvRecord, _>(path, "projects")?
        .into_iter()
        .map(ProjectCsvRecord::into_project)
        .collect::<PersistenceResult<Vec<_>>>()?;
    validation::validate_projects(&projects)?;
    Ok(projects)
}

#[derive(Serialize, Deserialize)]
struct TaskCsvRecord {
    key: String,
    summary: String,
    priority: String,
    remaining_hours: f64,
    due_date: String,
    status: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            key: task.key.clone(),
            summary: task.summary.clone(),
            priority: task.priority.as_str().to_string(),
            remaining_hours: task.remaining_hours,
            due_date: task.due_date.map(format_date).unwrap_or_default(),
            status: task.status.clone(),
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<Task> {
        let priority = TaskPriority::from_str(&self.priority).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid task priority '{}'", self.priority))
        })?;
        let mut task =
            Task::new(self.key, priority, self.remaining_hours).with_summary(self.summary);
        if !self.due_date.trim().is_empty() {
            task.due_date = Some(parse_date(&self.due_date)?);
        }
        task.status = self.status;
        Ok(task)
    }
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[Task], path: P) -> PersistenceResult<()> {
    validation::validate_tasks(tasks)?;
    write_csv(tasks.iter().map(TaskCsvRecord::from), path)
}

pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Task>> {
    let tasks = read_csv::<TaskCsvRecord, _>(path, "tasks")?
        .into_iter()
        .map(TaskCsvRecord::into_task)
        .collect::<PersistenceResult<Vec<_>>>()?;
    validation::validate_tasks(&tasks)?;
    Ok(tasks)
}

#[derive(Serialize, Deserialize)]
struct PlanCsvRecord {
    resource_id: String,
    project_id: String,
    month: u32,
    year: i32,
    planned_capacity: f64,
    utilization_rate: f64,
    efficiency_score: f64,
    strategy: String,
}

impl From<&CapacityPlan> for PlanCsvRecord {
    fn from(plan: &CapacityPlan) -> Self {
        Self {
            resource_id: plan.resource_id.clone(),
            project_id: plan.project_id.clone(),
            month: plan.month,
            year: plan.year,
            planned_capacity: plan.planned_capacity,
            utilization_rate: plan.utilization_rate,
            efficiency_score: plan.efficiency_score,
            strategy: plan.strategy.map(|s| s.as_str().to_string()).unwrap_or_default(),
        }
    }
}

impl PlanCsvRecord {
    fn into_plan(self) -> PersistenceResult<CapacityPlan> {
        let strategy = if self.strategy.trim().is_empty() {
            None
        } else {
            Some(AllocationStrategy::from_str(&self.strategy).ok_or_else(|| {
                PersistenceError::InvalidData(format!("invalid strategy '{}'", self.strategy))
            })?)
        };
        Ok(CapacityPlan {
            resource_id: self.resource_id,
            project_id: self.project_id,
            month: self.month,
            year: self.year,
            planned_capacity: self.planned_capacity,
            utilization_rate: self.utilization_rate,
            efficiency_score: self.efficiency_score,
            strategy,
        })
    }
}

pub fn save_plans_to_csv<P: AsRef<Path>>(plans: &[CapacityPlan], path: P) -> PersistenceResult<()> {
    super::validate_plans(plans)?;
    write_csv(plans.iter().map(PlanCsvRecord::from), path)
}

pub fn load_plans_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<CapacityPlan>> {
    let plans = read_csv::<PlanCsvRecord, _>(path, "plans")?
        .into_iter()
        .map(PlanCsvRecord::into_plan)
        .collect::<PersistenceResult<Vec<_>>>()?;
    super::validate_plans(&plans)?;
    Ok(plans)
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn format_option_f64(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn parse_f64(input: &str) -> PersistenceResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid float '{input}': {e}")))
}

fn split_strings(input: &str) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    input
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
