use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl ProjectPriority {
    pub fn score(&self) -> u8 {
        match self {
            ProjectPriority::Low => 1,
            ProjectPriority::Medium => 2,
            ProjectPriority::High => 3,
            ProjectPriority::Critical => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectPriority::Low => "low",
            ProjectPriority::Medium => "medium",
            ProjectPriority::High => "high",
            ProjectPriority::Critical => "critical",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(ProjectPriority::Low),
            "medium" => Some(ProjectPriority::Medium),
            "high" => Some(ProjectPriority::High),
            "critical" => Some(ProjectPriority::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, ProjectStatus::Planned | ProjectStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "planned" => Some(ProjectStatus::Planned),
            "active" => Some(ProjectStatus::Active),
            "completed" => Some(ProjectStatus::Completed),
            "cancelled" => Some(ProjectStatus::Cancelled),
            _ => None,
        }
    }
}

/// What a project asks of the resource pool.
///
/// Only `capacity` is read by the allocator; everything else rides along in
/// `attributes` for the layers that render or store projects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub capacity: f64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Requirements {
    pub fn capacity(capacity: f64) -> Self {
        Self {
            capacity,
            attributes: Map::new(),
        }
    }

    /// True when any key or string value mentions a human need.
    pub fn references_human(&self) -> bool {
        self.attributes
            .iter()
            .any(|(key, value)| mentions_human(key) || value_mentions_human(value))
    }
}

fn mentions_human(text: &str) -> bool {
    text.to_ascii_lowercase().contains("human")
}

fn value_mentions_human(value: &Value) -> bool {
    match value {
        Value::String(s) => mentions_human(s),
        Value::Array(items) => items.iter().any(value_mentions_human),
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| mentions_human(key) || value_mentions_human(value)),
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub priority: ProjectPriority,
    #[serde(default)]
    pub status: ProjectStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub requirements: Requirements,
}

impl Project {
    pub fn new(
        id: impl Into<String>,
        required_capacity: f64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            priority: ProjectPriority::default(),
            status: ProjectStatus::default(),
            start_date,
            end_date,
            requirements: Requirements::capacity(required_capacity),
        }
    }

    pub fn with_priority(mut self, priority: ProjectPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.requirements.attributes.insert(key.into(), value.into());
        self
    }

    pub fn required_capacity(&self) -> f64 {
        self.requirements.capacity
    }

    pub fn participates_in(&self, period: &PlanningPeriod) -> bool {
        self.status.is_open() && self.start_date <= period.end && self.end_date >= period.start
    }
}

/// Inclusive date range a capacity plan covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PlanningPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn month(&self) -> u32 {
        self.start.month()
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }
}

impl fmt::Display for PlanningPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
