use super::efficiency::efficiency_score;
use crate::plan::{AllocationStrategy, CapacityPlan};
use crate::project::{PlanningPeriod, Project};
use crate::resource::ResourcePool;
use tracing::debug;

/// Amounts at or below this are treated as zero.
pub(crate) const CAPACITY_EPSILON: f64 = 1e-9;

pub(crate) struct AllocationContext<'a> {
    pub period: &'a PlanningPeriod,
    pub verified_skill_tags: &'a [String],
}

impl AllocationContext<'_> {
    fn plan(
        &self,
        strategy: AllocationStrategy,
        pool: &ResourcePool,
        idx: usize,
        project: &Project,
        allocation: f64,
        efficiency: f64,
    ) -> CapacityPlan {
        let resource = pool.resource(idx);
        CapacityPlan {
            resource_id: resource.id.clone(),
            project_id: project.id.clone(),
            month: self.period.month(),
            year: self.period.year(),
            planned_capacity: allocation,
            utilization_rate: allocation / resource.capacity,
            efficiency_score: efficiency,
            strategy: Some(strategy),
        }
    }

    fn score(&self, pool: &ResourcePool, idx: usize, project: &Project, allocation: f64) -> f64 {
        efficiency_score(
            pool.resource(idx),
            project,
            allocation,
            self.verified_skill_tags,
        )
    }
}

impl AllocationStrategy {
    /// Runs this strategy against `pool`, consuming capacity as it allocates.
    pub(crate) fn allocate(
        &self,
        pool: &mut ResourcePool,
        projects: &[&Project],
        ctx: &AllocationContext<'_>,
    ) -> Vec<CapacityPlan> {
        if pool.is_empty() {
            return Vec::new();
        }
        let plans = match self {
            AllocationStrategy::LoadBalancing => load_balancing(pool, projects, ctx),
            AllocationStrategy::CostOptimization => cost_optimization(pool, projects, ctx),
            AllocationStrategy::EfficiencyMaximization => {
                efficiency_maximization(pool, projects, ctx)
            }
        };
        debug!(strategy = %self, plans = plans.len(), "allocation pass finished");
        plans
    }
}

fn load_balancing(
    pool: &mut ResourcePool,
    projects: &[&Project],
    ctx: &AllocationContext<'_>,
) -> Vec<CapacityPlan> {
    let strategy = AllocationStrategy::LoadBalancing;
    let mut ordered: Vec<&Project> = projects.to_vec();
    let total_required: f64 = ordered.iter().map(|p| p.required_capacity()).sum();
    if total_required > pool.total_remaining() {
        // Over-subscribed: most important projects go first. Stable, so equal
        // priorities keep their input order.
        ordered.sort_by(|a, b| b.priority.score().cmp(&a.priority.score()));
    }

    let mut plans = Vec::new();
    let resource_count = pool.len();
    let mut cursor = 0usize;
    for project in ordered {
        let mut remaining = project.required_capacity();
        let mut idle_visits = 0usize;
        while remaining > CAPACITY_EPSILON && idle_visits < resource_count {
            let granted = pool.take(cursor, remaining);
            if granted > CAPACITY_EPSILON {
                let efficiency = ctx.score(pool, cursor, project, granted);
                plans.push(ctx.plan(strategy, pool, cursor, project, granted, efficiency));
                remaining -= granted;
                idle_visits = 0;
            } else {
                idle_visits += 1;
            }
            cursor = (cursor + 1) % resource_count;
        }
    }
    plans
}

fn cost_optimization(
    pool: &mut ResourcePool,
    projects: &[&Project],
    ctx: &AllocationContext<'_>,
) -> Vec<CapacityPlan> {
    let strategy = AllocationStrategy::CostOptimization;
    let mut by_cost: Vec<usize> = (0..pool.len()).collect();
    by_cost.sort_by(|&a, &b| {
        pool.resource(a)
            .cost_per_unit
            .total_cmp(&pool.resource(b).cost_per_unit)
    });

    let mut plans = Vec::new();
    for &project in projects {
        let mut remaining = project.required_capacity();
        for &idx in &by_cost {
            if remaining <= CAPACITY_EPSILON {
                break;
            }
            let granted = pool.take(idx, remaining);
            if granted > CAPACITY_EPSILON {
                let efficiency = ctx.score(pool, idx, project, granted);
                plans.push(ctx.plan(strategy, pool, idx, project, granted, efficiency));
                remaining -= granted;
            }
        }
    }
    plans
}

fn efficiency_maximization(
    pool: &mut ResourcePool,
    projects: &[&Project],
    ctx: &AllocationContext<'_>,
) -> Vec<CapacityPlan> {
    let strategy = AllocationStrategy::EfficiencyMaximization;
    let mut plans = Vec::new();
    for &project in projects {
        let required = project.required_capacity();
        let mut candidates: Vec<(usize, f64)> = (0..pool.len())
            .filter(|&idx| pool.remaining(idx) > CAPACITY_EPSILON)
            .map(|idx| {
                let candidate = required.min(pool.remaining(idx));
                (idx, ctx.score(pool, idx, project, candidate))
            })
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut remaining = required;
        for (idx, efficiency) in candidates {
            if remaining <= CAPACITY_EPSILON {
                break;
            }
            let granted = pool.take(idx, remaining);
            if granted > CAPACITY_EPSILON {
                plans.push(ctx.plan(strategy, pool, idx, project, granted, efficiency));
                remaining -= granted;
            }
        }
    }
    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectPriority;
    use crate::resource::{Resource, ResourceType};
    use chrono::NaiveDate;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    fn period() -> PlanningPeriod {
        PlanningPeriod::new(d(3, 1), d(3, 31))
    }

    fn run(
        strategy: AllocationStrategy,
        resources: &[Resource],
        projects: &[Project],
    ) -> (Vec<CapacityPlan>, ResourcePool) {
        let period = period();
        let tags = vec!["jira_user".to_string()];
        let ctx = AllocationContext {
            period: &period,
            verified_skill_tags: &tags,
        };
        let mut pool = ResourcePool::new(resources);
        let refs: Vec<&Project> = projects.iter().collect();
        let plans = strategy.allocate(&mut pool, &refs, &ctx);
        (plans, pool)
    }

    #[test]
    fn load_balancing_caps_at_resource_capacity() {
        let resources = [Resource::human("r1", 40.0).with_cost(10.0)];
        let projects = [Project::new("p1", 50.0, d(3, 1), d(3, 31))
            .with_priority(ProjectPriority::High)];
        let (plans, pool) = run(AllocationStrategy::LoadBalancing, &resources, &projects);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].planned_capacity, 40.0);
        assert_eq!(plans[0].utilization_rate, 1.0);
        assert_eq!((plans[0].month, plans[0].year), (3, 2025));
        assert_eq!(pool.remaining(0), 0.0);
    }

    #[test]
    fn load_balancing_rotates_through_resources() {
        let resources = [
            Resource::human("r1", 10.0),
            Resource::human("r2", 10.0),
            Resource::human("r3", 10.0),
        ];
        let projects = [
            Project::new("p1", 5.0, d(3, 1), d(3, 31)),
            Project::new("p2", 5.0, d(3, 1), d(3, 31)),
        ];
        let (plans, _) = run(AllocationStrategy::LoadBalancing, &resources, &projects);
        let assigned: Vec<(&str, &str)> = plans
            .iter()
            .map(|p| (p.resource_id.as_str(), p.project_id.as_str()))
            .collect();
        assert_eq!(assigned, vec![("r1", "p1"), ("r2", "p2")]);
    }

    #[test]
    fn load_balancing_orders_by_priority_only_when_oversubscribed() {
        let resources = [Resource::human("r1", 10.0)];
        let projects = [
            Project::new("low", 10.0, d(3, 1), d(3, 31)).with_priority(ProjectPriority::Low),
            Project::new("crit", 10.0, d(3, 1), d(3, 31))
                .with_priority(ProjectPriority::Critical),
        ];
        let (plans, _) = run(AllocationStrategy::LoadBalancing, &resources, &projects);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].project_id, "crit");

        let roomy = [Resource::human("r1", 30.0)];
        let (plans, _) = run(AllocationStrategy::LoadBalancing, &roomy, &projects);
        assert_eq!(plans[0].project_id, "low");
        assert_eq!(plans[1].project_id, "crit");
    }

    #[test]
    fn cost_optimization_uses_cheapest_first() {
        let resources = [
            Resource::human("pricey", 20.0).with_cost(150.0),
            Resource::human("cheap", 20.0).with_cost(50.0),
            Resource::human("mid", 20.0).with_cost(100.0),
        ];
        let projects = [Project::new("p1", 30.0, d(3, 1), d(3, 31))];
        let (plans, pool) = run(AllocationStrategy::CostOptimization, &resources, &projects);
        let ids: Vec<&str> = plans.iter().map(|p| p.resource_id.as_str()).collect();
        assert_eq!(ids, vec!["cheap", "mid"]);
        assert_eq!(plans[1].planned_capacity, 10.0);
        assert_eq!(pool.remaining(0), 20.0);
        assert_eq!(pool.remaining(2), 10.0);
    }

    #[test]
    fn efficiency_maximization_prefers_higher_scores() {
        let resources = [
            Resource::new("crane", ResourceType::Equipment, 40.0),
            Resource::human("dev", 40.0).with_skill("jira_user"),
        ];
        let projects = [Project::new("p1", 40.0, d(3, 1), d(3, 31))
            .with_attribute("needs", "human engineers")];
        let (plans, _) = run(AllocationStrategy::EfficiencyMaximization, &resources, &projects);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].resource_id, "dev");
        assert!((plans[0].efficiency_score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn efficiency_maximization_conserves_capacity() {
        let resources = [
            Resource::new("rig", ResourceType::Equipment, 30.0),
            Resource::human("ann", 20.0).with_skill("jira_user"),
            Resource::human("bo", 25.0).with_available(15.0),
        ];
        let projects = [
            Project::new("p1", 28.0, d(3, 1), d(3, 31)).with_attribute("team", "human"),
            Project::new("p2", 22.0, d(3, 1), d(3, 31)),
        ];
        let (plans, pool) = run(AllocationStrategy::EfficiencyMaximization, &resources, &projects);
        for (idx, resource) in pool.resources().iter().enumerate() {
            let planned: f64 = plans
                .iter()
                .filter(|p| p.resource_id == resource.id)
                .map(|p| p.planned_capacity)
                .sum();
            assert!((pool.remaining(idx) - (resource.available() - planned)).abs() < 1e-9);
        }
        let total: f64 = plans.iter().map(|p| p.planned_capacity).sum();
        assert!((total - 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_requirement_produces_no_plans() {
        let resources = [Resource::human("r1", 10.0)];
        let projects = [Project::new("p1", 0.0, d(3, 1), d(3, 31))];
        for strategy in AllocationStrategy::ALL {
            let (plans, pool) = run(strategy, &resources, &projects);
            assert!(plans.is_empty());
            assert_eq!(pool.remaining(0), 10.0);
        }
    }
}
