use serde::{Deserialize, Serialize};
use std::fmt;

/// Allocation pass that produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    LoadBalancing,
    CostOptimization,
    EfficiencyMaximization,
}

impl AllocationStrategy {
    pub const ALL: [AllocationStrategy; 3] = [
        AllocationStrategy::LoadBalancing,
        AllocationStrategy::CostOptimization,
        AllocationStrategy::EfficiencyMaximization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::LoadBalancing => "load_balancing",
            AllocationStrategy::CostOptimization => "cost_optimization",
            AllocationStrategy::EfficiencyMaximization => "efficiency_maximization",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim() {
            "load_balancing" => Some(AllocationStrategy::LoadBalancing),
            "cost_optimization" => Some(AllocationStrategy::CostOptimization),
            "efficiency_maximization" => Some(AllocationStrategy::EfficiencyMaximization),
            _ => None,
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Objective a planning request optimizes for. Selects the primary strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationTarget {
    #[default]
    Utilization,
    Cost,
    Efficiency,
}

impl OptimizationTarget {
    pub fn primary_strategy(&self) -> AllocationStrategy {
        match self {
            OptimizationTarget::Utilization => AllocationStrategy::LoadBalancing,
            OptimizationTarget::Cost => AllocationStrategy::CostOptimization,
            OptimizationTarget::Efficiency => AllocationStrategy::EfficiencyMaximization,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "utilization" => Some(OptimizationTarget::Utilization),
            "cost" => Some(OptimizationTarget::Cost),
            "efficiency" => Some(OptimizationTarget::Efficiency),
            _ => None,
        }
    }
}

/// One resource-to-project allocation for a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityPlan {
    pub resource_id: String,
    pub project_id: String,
    pub month: u32,
    pub year: i32,
    pub planned_capacity: f64,
    pub utilization_rate: f64,
    pub efficiency_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<AllocationStrategy>,
}
