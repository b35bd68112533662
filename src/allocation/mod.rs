//! Resource-to-project capacity allocation.

mod efficiency;
mod strategies;
mod summary;

pub use efficiency::efficiency_score;
pub use summary::{PlanSummary, Recommendation, recommend, summarize};

use crate::config::{CapacitySharing, PlannerConfig};
use crate::plan::{AllocationStrategy, CapacityPlan, OptimizationTarget};
use crate::project::{PlanningPeriod, Project};
use crate::resource::{Resource, ResourcePool};
use crate::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strategies::AllocationContext;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub period: PlanningPeriod,
    #[serde(default)]
    pub optimization_target: OptimizationTarget,
}

impl PlanningRequest {
    pub fn new(period: PlanningPeriod, optimization_target: OptimizationTarget) -> Self {
        Self {
            period,
            optimization_target,
        }
    }

    /// Strategies in run order: the primary one first, then the rest in canonical order.
    pub fn strategy_order(&self, run_all: bool) -> Vec<AllocationStrategy> {
        let primary = self.optimization_target.primary_strategy();
        let mut order = vec![primary];
        if run_all {
            order.extend(AllocationStrategy::ALL.into_iter().filter(|s| *s != primary));
        }
        order
    }
}

/// Plans and summary produced by one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyOutcome {
    pub strategy: AllocationStrategy,
    pub plans: Vec<CapacityPlan>,
    pub summary: PlanSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningResult {
    pub plans: Vec<CapacityPlan>,
    pub summary: Option<PlanSummary>,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub strategy_outcomes: Vec<StrategyOutcome>,
    pub generated_at: DateTime<Utc>,
}

impl PlanningResult {
    fn empty() -> Self {
        Self {
            plans: Vec::new(),
            summary: None,
            recommendations: Vec::new(),
            strategy_outcomes: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn outcome(&self, strategy: AllocationStrategy) -> Option<&StrategyOutcome> {
        self.strategy_outcomes
            .iter()
            .find(|outcome| outcome.strategy == strategy)
    }
}

/// Allocates resource capacity to the projects active in `request.period`.
///
/// Inputs are validated first; nothing is computed for invalid input. The
/// caller's resources are never mutated.
#[instrument(
    skip(resources, projects, config),
    fields(resources = resources.len(), projects = projects.len())
)]
pub fn generate_capacity_plan(
    resources: &[Resource],
    projects: &[Project],
    request: &PlanningRequest,
    config: &PlannerConfig,
) -> Result<PlanningResult, ValidationError> {
    validation::validate_period(&request.period)?;
    validation::validate_resources(resources)?;
    validation::validate_projects(projects)?;

    let participating: Vec<&Project> = projects
        .iter()
        .filter(|p| p.participates_in(&request.period))
        .collect();
    if participating.is_empty() {
        info!("no projects participate in the planning period");
        return Ok(PlanningResult::empty());
    }
    let total_required: f64 = participating.iter().map(|p| p.required_capacity()).sum();

    let ctx = AllocationContext {
        period: &request.period,
        verified_skill_tags: &config.verified_skill_tags,
    };
    let order = request.strategy_order(config.run_all_strategies);
    let pristine = ResourcePool::new(resources);

    let runs: Vec<(AllocationStrategy, Vec<CapacityPlan>)> = match config.capacity_sharing {
        CapacitySharing::Layered => {
            let mut pool = pristine;
            order
                .iter()
                .map(|strategy| (*strategy, strategy.allocate(&mut pool, &participating, &ctx)))
                .collect()
        }
        CapacitySharing::Isolated => order
            .par_iter()
            .map(|strategy| {
                let mut pool = pristine.clone();
                (*strategy, strategy.allocate(&mut pool, &participating, &ctx))
            })
            .collect(),
    };

    let strategy_outcomes: Vec<StrategyOutcome> = runs
        .into_iter()
        .map(|(strategy, plans)| {
            let summary = summarize(&plans, resources, total_required, participating.len());
            StrategyOutcome {
                strategy,
                plans,
                summary,
            }
        })
        .collect();

    let plans: Vec<CapacityPlan> = match config.capacity_sharing {
        CapacitySharing::Layered => strategy_outcomes
            .iter()
            .flat_map(|outcome| outcome.plans.iter().cloned())
            .collect(),
        CapacitySharing::Isolated => strategy_outcomes
            .first()
            .map(|outcome| outcome.plans.clone())
            .unwrap_or_default(),
    };

    let summary = summarize(&plans, resources, total_required, participating.len());
    let recommendations = recommend(&summary, config.high_cost_threshold)
        .iter()
        .map(|rec| rec.message().to_string())
        .collect();

    info!(
        plans = plans.len(),
        utilization = summary.capacity_utilization_rate,
        "capacity plan generated"
    );
    Ok(PlanningResult {
        plans,
        summary: Some(summary),
        recommendations,
        strategy_outcomes,
        generated_at: Utc::now(),
    })
}
