use crate::plan::CapacityPlan;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const LOW_UTILIZATION: f64 = 0.7;
const HIGH_UTILIZATION: f64 = 0.95;
const LOW_SATISFACTION: f64 = 0.9;
const LOW_EFFICIENCY: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_planned_capacity: f64,
    pub total_available_capacity: f64,
    pub total_required_capacity: f64,
    pub capacity_utilization_rate: f64,
    pub requirement_satisfaction_rate: f64,
    pub average_utilization_rate: f64,
    pub average_efficiency_score: f64,
    pub total_cost: f64,
    pub number_of_plans: usize,
    pub number_of_resources: usize,
    pub number_of_projects: usize,
}

/// Aggregates `plans` against the resource pool and the participating projects' demand.
pub fn summarize(
    plans: &[CapacityPlan],
    resources: &[Resource],
    total_required_capacity: f64,
    number_of_projects: usize,
) -> PlanSummary {
    let cost_by_resource: HashMap<&str, f64> = resources
        .iter()
        .map(|r| (r.id.as_str(), r.cost_per_unit))
        .collect();

    let total_planned_capacity: f64 = plans.iter().map(|p| p.planned_capacity).sum();
    let total_available_capacity: f64 = resources.iter().map(|r| r.capacity).sum();
    let total_cost: f64 = plans
        .iter()
        .map(|p| {
            p.planned_capacity
                * cost_by_resource
                    .get(p.resource_id.as_str())
                    .copied()
                    .unwrap_or(0.0)
        })
        .sum();

    let (average_utilization_rate, average_efficiency_score) = if plans.is_empty() {
        (0.0, 0.0)
    } else {
        let n = plans.len() as f64;
        (
            plans.iter().map(|p| p.utilization_rate).sum::<f64>() / n,
            plans.iter().map(|p| p.efficiency_score).sum::<f64>() / n,
        )
    };

    PlanSummary {
        total_planned_capacity,
        total_available_capacity,
        total_required_capacity,
        capacity_utilization_rate: ratio(total_planned_capacity, total_available_capacity),
        requirement_satisfaction_rate: ratio(total_planned_capacity, total_required_capacity),
        average_utilization_rate,
        average_efficiency_score,
        total_cost,
        number_of_plans: plans.len(),
        number_of_resources: resources.len(),
        number_of_projects,
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Advice derived from a [`PlanSummary`]. Rules are independent; several may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    IncreaseUtilization,
    AddResources,
    UnsatisfiedRequirements,
    ReviewAssignments,
    ReduceCost,
    ShareResources,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::IncreaseUtilization => {
                "Consider increasing resource utilization to improve efficiency"
            }
            Recommendation::AddResources => {
                "High utilization detected - consider adding more resources to prevent bottlenecks"
            }
            Recommendation::UnsatisfiedRequirements => {
                "Not all project requirements can be satisfied with current resources"
            }
            Recommendation::ReviewAssignments => {
                "Low efficiency scores detected - review resource-project assignments"
            }
            Recommendation::ReduceCost => "High total cost - consider cost optimization strategies",
            Recommendation::ShareResources => {
                "More projects than resources - consider resource sharing or additional resources"
            }
        }
    }
}

/// Evaluates every rule in its fixed order.
pub fn recommend(summary: &PlanSummary, high_cost_threshold: f64) -> Vec<Recommendation> {
    let rules = [
        (
            summary.capacity_utilization_rate < LOW_UTILIZATION,
            Recommendation::IncreaseUtilization,
        ),
        (
            summary.capacity_utilization_rate > HIGH_UTILIZATION,
            Recommendation::AddResources,
        ),
        (
            summary.requirement_satisfaction_rate < LOW_SATISFACTION,
            Recommendation::UnsatisfiedRequirements,
        ),
        (
            summary.average_efficiency_score < LOW_EFFICIENCY,
            Recommendation::ReviewAssignments,
        ),
        (
            summary.total_cost > high_cost_threshold,
            Recommendation::ReduceCost,
        ),
        (
            summary.number_of_resources < summary.number_of_projects,
            Recommendation::ShareResources,
        ),
    ];
    rules
        .into_iter()
        .filter_map(|(fires, rec)| fires.then_some(rec))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> PlanSummary {
        PlanSummary {
            total_planned_capacity: 80.0,
            total_available_capacity: 100.0,
            total_required_capacity: 80.0,
            capacity_utilization_rate: 0.8,
            requirement_satisfaction_rate: 1.0,
            average_utilization_rate: 0.8,
            average_efficiency_score: 0.7,
            total_cost: 100.0,
            number_of_plans: 2,
            number_of_resources: 2,
            number_of_projects: 2,
        }
    }

    #[test]
    fn healthy_summary_has_no_advice() {
        assert!(recommend(&summary(), 1_000_000.0).is_empty());
    }

    #[test]
    fn each_rule_fires_on_its_own_condition() {
        let s = PlanSummary {
            capacity_utilization_rate: 0.5,
            ..summary()
        };
        assert_eq!(recommend(&s, 1e6), vec![Recommendation::IncreaseUtilization]);

        let s = PlanSummary {
            capacity_utilization_rate: 0.96,
            ..summary()
        };
        assert_eq!(recommend(&s, 1e6), vec![Recommendation::AddResources]);

        let s = PlanSummary {
            requirement_satisfaction_rate: 0.5,
            ..summary()
        };
        assert_eq!(recommend(&s, 1e6), vec![Recommendation::UnsatisfiedRequirements]);

        let s = PlanSummary {
            average_efficiency_score: 0.55,
            ..summary()
        };
        assert_eq!(recommend(&s, 1e6), vec![Recommendation::ReviewAssignments]);

        assert_eq!(recommend(&summary(), 50.0), vec![Recommendation::ReduceCost]);

        let s = PlanSummary {
            number_of_projects: 3,
            ..summary()
        };
        assert_eq!(recommend(&s, 1e6), vec![Recommendation::ShareResources]);
    }

    #[test]
    fn boundaries_are_exclusive() {
        let s = PlanSummary {
            capacity_utilization_rate: 0.7,
            requirement_satisfaction_rate: 0.9,
            average_efficiency_score: 0.6,
            total_cost: 1_000.0,
            ..summary()
        };
        assert!(recommend(&s, 1_000.0).is_empty());
    }

    #[test]
    fn summarize_prices_plans_and_guards_division() {
        let resources = [Resource::human("r1", 40.0).with_cost(10.0)];
        let plan = CapacityPlan {
            resource_id: "r1".into(),
            project_id: "p1".into(),
            month: 3,
            year: 2025,
            planned_capacity: 40.0,
            utilization_rate: 1.0,
            efficiency_score: 0.6,
            strategy: None,
        };
        let s = summarize(&[plan], &resources, 50.0, 1);
        assert_eq!(s.total_cost, 400.0);
        assert_eq!(s.capacity_utilization_rate, 1.0);
        assert_eq!(s.requirement_satisfaction_rate, 0.8);

        let empty = summarize(&[], &resources, 0.0, 1);
        assert_eq!(empty.requirement_satisfaction_rate, 0.0);
        assert_eq!(empty.average_efficiency_score, 0.0);
    }
}
