use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskPriority {
    #[serde(alias = "Lowest", alias = "low", alias = "lowest")]
    Low,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "Highest", alias = "high", alias = "highest")]
    High,
}

impl TaskPriority {
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" | "lowest" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" | "highest" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work to fit into the week, as reported by the issue tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub key: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub priority: TaskPriority,
    pub remaining_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl Task {
    pub fn new(key: impl Into<String>, priority: TaskPriority, remaining_hours: f64) -> Self {
        Self {
            key: key.into(),
            summary: String::new(),
            priority,
            remaining_hours,
            due_date: None,
            status: String::new(),
            attributes: Map::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Scheduling order: higher priority first, then earlier due date
    /// (undated last), then larger remaining effort.
    pub fn scheduling_order(&self, other: &Task) -> Ordering {
        other
            .priority
            .rank()
            .cmp(&self.priority.rank())
            .then_with(|| match (self.due_date, other.due_date) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
            .then_with(|| other.remaining_hours.total_cmp(&self.remaining_hours))
    }
}
