use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Human,
    Equipment,
    Facility,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Human => "human",
            ResourceType::Equipment => "equipment",
            ResourceType::Facility => "facility",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "human" => Some(ResourceType::Human),
            "equipment" => Some(ResourceType::Equipment),
            "facility" => Some(ResourceType::Facility),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of supply: a person, a piece of equipment, or a facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Total units per planning period. Must be positive.
    pub capacity: f64,
    /// Units still free during an allocation run. Defaults to `capacity` when omitted.
    #[serde(default)]
    pub available_capacity: Option<f64>,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub skills: BTreeSet<String>,
}

impl Resource {
    pub fn new(id: impl Into<String>, resource_type: ResourceType, capacity: f64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            resource_type,
            capacity,
            available_capacity: None,
            cost_per_unit: 0.0,
            skills: BTreeSet::new(),
        }
    }

    pub fn human(id: impl Into<String>, capacity: f64) -> Self {
        Self::new(id, ResourceType::Human, capacity)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_cost(mut self, cost_per_unit: f64) -> Self {
        self.cost_per_unit = cost_per_unit;
        self
    }

    pub fn with_available(mut self, available: f64) -> Self {
        self.available_capacity = Some(available);
        self
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.insert(skill.into());
        self
    }

    pub fn available(&self) -> f64 {
        self.available_capacity.unwrap_or(self.capacity)
    }

    pub fn has_any_skill(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.skills.contains(tag))
    }
}

/// Working set of resources for one allocation run.
///
/// The pool owns its own copy of every resource's remaining capacity, so the
/// caller's input is never mutated. Cloning a pool yields an independent snapshot.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    resources: Vec<Resource>,
    remaining: Vec<f64>,
}

impl ResourcePool {
    pub fn new(resources: &[Resource]) -> Self {
        let remaining = resources.iter().map(Resource::available).collect();
        Self {
            resources: resources.to_vec(),
            remaining,
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resource(&self, idx: usize) -> &Resource {
        &self.resources[idx]
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn remaining(&self, idx: usize) -> f64 {
        self.remaining[idx]
    }

    pub fn total_remaining(&self) -> f64 {
        self.remaining.iter().sum()
    }

    /// Takes up to `requested` units from resource `idx` and returns what was granted.
    pub fn take(&mut self, idx: usize, requested: f64) -> f64 {
        let granted = requested.min(self.remaining[idx]).max(0.0);
        self.remaining[idx] -= granted;
        if self.remaining[idx] < 0.0 {
            self.remaining[idx] = 0.0;
        }
        granted
    }
}
