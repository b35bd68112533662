use crate::calendar::WorkWeekConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Environment variable naming a JSON file with a [`PlannerConfig`].
pub const CONFIG_PATH_ENV: &str = "CAPACITY_PLANNER_CONFIG";

/// How successive allocation strategies share the resource pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacitySharing {
    /// Every strategy draws from the same pool, so later strategies only see
    /// what earlier ones left behind.
    #[default]
    Layered,
    /// Every strategy starts from the caller's pristine pool and the results
    /// are alternatives to compare.
    Isolated,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Total plan cost above which the cost recommendation fires.
    pub high_cost_threshold: f64,
    pub capacity_sharing: CapacitySharing,
    /// Run the two non-primary strategies after the primary one.
    pub run_all_strategies: bool,
    /// Skill tags that mark a resource as confirmed by the issue tracker.
    pub verified_skill_tags: Vec<String>,
    pub work_week: WorkWeekConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            high_cost_threshold: 1_000_000.0,
            capacity_sharing: CapacitySharing::default(),
            run_all_strategies: true,
            verified_skill_tags: vec!["jira_user".to_string()],
            work_week: WorkWeekConfig::default(),
        }
    }
}

impl PlannerConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: PlannerConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from [`CONFIG_PATH_ENV`] when set, defaults otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_json_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn save_json_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.high_cost_threshold.is_finite() || self.high_cost_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "high_cost_threshold {} must be a non-negative number",
                self.high_cost_threshold
            )));
        }
        crate::validation::validate_work_week(&self.work_week)
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}
