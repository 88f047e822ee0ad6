//! Selection reconciler — combine auto-resolution with caller overrides.
//!
//! Every field is resolved independently. A field the caller supplies is
//! returned verbatim; only unset fields are filled from the snapshot.

use crate::active::{resolve_active_stage, resolve_active_step, ActiveStage};
use pv_core::config::ResolverConfig;
use pv_core::graph::{ExecutionSnapshot, StageGraph, StageNode};
use pv_core::selection::{ResolvedSelection, SelectionOverrides};

/// Compute the resolved tuple for one snapshot and one override set.
pub fn reconcile(
    snapshot: &ExecutionSnapshot,
    overrides: &SelectionOverrides,
    config: &ResolverConfig,
) -> ResolvedSelection {
    // A collapsed fan-out group is an explicit user choice; auto-selection
    // stays out of the way for the whole pass.
    if let Some(collapsed) = &overrides.collapsed_node {
        return ResolvedSelection {
            stage_id: overrides.stage.clone(),
            step_id: overrides.step.clone(),
            stage_execution_id: overrides.stage_exec_id.clone(),
            child_stage_id: overrides.child_stage.clone(),
            collapsed_node_id: Some(collapsed.clone()),
        };
    }

    let layout = &snapshot.layout;
    let auto_stage = resolve_active_stage(layout, config);

    let stage_id = overrides
        .stage
        .clone()
        .or_else(|| auto_stage.as_ref().map(|active| active.stage.id.clone()));

    let stage_execution_id = stage_execution_id(
        layout,
        stage_id.as_deref(),
        overrides.stage_exec_id.as_deref(),
        auto_stage.as_ref(),
    );

    let child = snapshot.child_pipeline.as_deref();
    let auto_child_stage = match (child, &overrides.child_stage) {
        (Some(child), None) => resolve_active_stage(&child.layout, config),
        _ => None,
    };
    let child_stage_id = overrides
        .child_stage
        .clone()
        .or_else(|| auto_child_stage.as_ref().map(|active| active.stage.id.clone()));

    let step_id = match &overrides.step {
        Some(step) => Some(step.clone()),
        None => match (child, child_stage_id.as_deref()) {
            (Some(child), Some(child_stage)) => {
                let child_exec = auto_child_stage
                    .as_ref()
                    .filter(|active| active.stage.id == child_stage)
                    .and_then(|active| active.stage.execution_id.as_deref());
                default_step(child, Some(child_stage), child_exec, config)
            }
            _ => default_step(
                snapshot,
                stage_id.as_deref(),
                stage_execution_id.as_deref(),
                config,
            ),
        },
    };

    let resolved = ResolvedSelection {
        stage_id,
        step_id,
        stage_execution_id,
        child_stage_id,
        collapsed_node_id: None,
    };
    tracing::debug!(?resolved, "reconciled selection");
    resolved
}

/// A pinned execution id only holds while its stage is still in the layout;
/// otherwise it falls back to the auto-resolved id of the same stage.
fn stage_execution_id(
    layout: &StageGraph,
    selected_stage: Option<&str>,
    pinned: Option<&str>,
    auto: Option<&ActiveStage>,
) -> Option<String> {
    let auto_exec = auto
        .filter(|active| Some(active.stage.id.as_str()) == selected_stage)
        .and_then(|active| active.stage.execution_id.clone());

    match (pinned, selected_stage) {
        (Some(pinned), Some(stage)) if layout.contains_stage(stage) => Some(pinned.to_string()),
        (Some(pinned), _) => {
            tracing::warn!(
                stage_execution_id = pinned,
                stage_id = ?selected_stage,
                "pinned stage is no longer in the snapshot, dropping execution id"
            );
            auto_exec
        }
        (None, _) => auto_exec,
    }
}

/// The stage node a selection points at: by execution id when known, else by
/// key or logical id.
fn focused_stage<'g>(
    layout: &'g StageGraph,
    stage_id: Option<&str>,
    execution_id: Option<&str>,
) -> Option<&'g StageNode> {
    let by_execution = execution_id.and_then(|exec| {
        layout.nodes.get(exec).or_else(|| {
            layout
                .nodes
                .values()
                .find(|node| node.execution_id.as_deref() == Some(exec))
        })
    });
    by_execution.or_else(|| stage_id.and_then(|id| layout.find_stage(id)))
}

/// Default step for the stage in focus. A stage blocked on execution input is
/// itself the step to show.
fn default_step(
    snapshot: &ExecutionSnapshot,
    stage_id: Option<&str>,
    execution_id: Option<&str>,
    config: &ResolverConfig,
) -> Option<String> {
    let rules = &config.status_rules;
    let stage = focused_stage(&snapshot.layout, stage_id, execution_id);

    if let Some(stage) = stage {
        if rules.is_waiting_for_input(&stage.status) && stage.execution_input_configured {
            return Some(stage.logical_id().to_string());
        }
    }

    let graph = snapshot.execution.as_ref()?;
    let status = stage
        .map(|stage| stage.status.as_str())
        .unwrap_or(snapshot.layout.status.as_str());
    resolve_active_step(graph, status, config).map(|step| step.id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
