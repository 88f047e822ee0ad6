//! Resolver configuration — node-type tables and status classification rules.

use serde::{Deserialize, Serialize};

use crate::status::StatusRules;
use crate::CoreError;

// ---------------------------------------------------------------------------
// ResolverConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Stage node types that group other stages and are never selected.
    pub non_selectable_stage_types: Vec<String>,

    /// Stage node types whose children run side by side.
    pub parallel_stage_types: Vec<String>,

    /// Stage node types whose children are concrete runs of one template.
    pub strategy_stage_types: Vec<String>,

    /// Stage node types marking the rollback section of a pipeline.
    pub rollback_stage_types: Vec<String>,

    /// Step types that group other steps and are never selected.
    pub non_selectable_step_types: Vec<String>,

    /// Structural step types rendered as parallel branches.
    pub fork_step_types: Vec<String>,

    /// Structural step types rendered as a named group.
    pub group_step_types: Vec<String>,

    pub dependency_step_types: Vec<String>,

    pub background_step_types: Vec<String>,

    pub status_rules: StatusRules,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            non_selectable_stage_types: strings(&[
                "Parallel",
                "Matrix",
                "Loop",
                "Parallelism",
                "PipelineRollback",
                "StageRollback",
            ]),
            parallel_stage_types: strings(&["Parallel"]),
            strategy_stage_types: strings(&["Matrix", "Loop", "Parallelism"]),
            rollback_stage_types: strings(&["PipelineRollback", "StageRollback"]),
            non_selectable_step_types: strings(&[
                "NG_SECTION",
                "SECTION",
                "NG_SECTION_WITH_ROLLBACK_INFO",
                "NG_EXECUTION",
                "NG_FORK",
                "FORK",
                "STEP_GROUP",
                "STRATEGY",
                "ROLLBACK_OPTIONAL_CHILD_CHAIN",
                "DEPLOYMENT_STAGE_STEP",
                "INTEGRATION_STAGE_STEP",
            ]),
            fork_step_types: strings(&["NG_FORK", "FORK"]),
            group_step_types: strings(&["STEP_GROUP", "STRATEGY"]),
            dependency_step_types: strings(&["dependency-service", "Service"]),
            background_step_types: strings(&["Background"]),
            status_rules: StatusRules::default(),
        }
    }
}

impl ResolverConfig {
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::InvalidConfig(e.to_string()))
    }

    pub fn is_selectable_stage(&self, node_type: &str) -> bool {
        !contains(&self.non_selectable_stage_types, node_type)
    }

    pub fn is_strategy_stage(&self, node_type: &str) -> bool {
        contains(&self.strategy_stage_types, node_type)
    }

    pub fn is_rollback_stage(&self, node_type: &str) -> bool {
        contains(&self.rollback_stage_types, node_type)
    }

    pub fn is_parallel_stage(&self, node_type: &str) -> bool {
        contains(&self.parallel_stage_types, node_type)
    }

    pub fn is_selectable_step(&self, step_type: &str) -> bool {
        !contains(&self.non_selectable_step_types, step_type)
    }

    pub fn is_fork_step(&self, step_type: &str) -> bool {
        contains(&self.fork_step_types, step_type)
    }

    pub fn is_group_step(&self, step_type: &str) -> bool {
        contains(&self.group_step_types, step_type)
    }

    pub fn is_dependency_step(&self, step_type: &str) -> bool {
        contains(&self.dependency_step_types, step_type)
    }

    pub fn is_background_step(&self, step_type: &str) -> bool {
        contains(&self.background_step_types, step_type)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn contains(table: &[String], value: &str) -> bool {
    table.iter().any(|t| t.eq_ignore_ascii_case(value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
