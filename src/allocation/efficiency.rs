use crate::project::Project;
use crate::resource::{Resource, ResourceType};

const BASE_SCORE: f64 = 0.5;
const HUMAN_MATCH_BONUS: f64 = 0.2;
const VERIFIED_SKILL_BONUS: f64 = 0.1;
const HIGH_UTILIZATION_BONUS: f64 = 0.1;
const HIGH_UTILIZATION_THRESHOLD: f64 = 0.8;

/// Heuristic quality of giving `allocation` units of `resource` to `project`, in [0, 1].
pub fn efficiency_score(
    resource: &Resource,
    project: &Project,
    allocation: f64,
    verified_skill_tags: &[String],
) -> f64 {
    let mut score = BASE_SCORE;

    if resource.resource_type == ResourceType::Human && project.requirements.references_human() {
        score += HUMAN_MATCH_BONUS;
    }

    if resource.has_any_skill(verified_skill_tags) {
        score += VERIFIED_SKILL_BONUS;
    }

    if allocation / resource.capacity > HIGH_UTILIZATION_THRESHOLD {
        score += HIGH_UTILIZATION_BONUS;
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn project() -> Project {
        let d = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Project::new("p1", 40.0, d, d)
    }

    fn tags() -> Vec<String> {
        vec!["jira_user".to_string()]
    }

    #[test]
    fn base_score_without_bonuses() {
        let resource = Resource::new("drill", ResourceType::Equipment, 100.0);
        assert_eq!(efficiency_score(&resource, &project(), 10.0, &tags()), 0.5);
    }

    #[test]
    fn all_bonuses_stack() {
        let resource = Resource::human("dev", 40.0).with_skill("jira_user");
        let project = project().with_attribute("staffing", "human developers");
        let score = efficiency_score(&resource, &project, 40.0, &tags());
        assert!((score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn utilization_bonus_requires_strictly_more_than_eighty_percent() {
        let resource = Resource::human("dev", 10.0);
        assert_eq!(efficiency_score(&resource, &project(), 8.0, &tags()), 0.5);
        assert!((efficiency_score(&resource, &project(), 8.5, &tags()) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn human_bonus_needs_a_human_requirement() {
        let resource = Resource::human("dev", 40.0);
        assert_eq!(efficiency_score(&resource, &project(), 1.0, &tags()), 0.5);
        let machine = Resource::new("lathe", ResourceType::Equipment, 40.0);
        let wants_humans = project().with_attribute("type", "human");
        assert_eq!(efficiency_score(&machine, &wants_humans, 1.0, &tags()), 0.5);
    }
}
