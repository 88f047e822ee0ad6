//! Selection State — externally owned holder for the reconciler's output.
//!
//! `recompute` is the single entry point. It re-runs the reducer only when the
//! snapshot or the override set changed, and swaps the whole tuple at once.

use crate::reconcile::reconcile;
use pv_core::config::ResolverConfig;
use pv_core::graph::ExecutionSnapshot;
use pv_core::selection::{FieldState, ResolvedSelection, SelectionOverrides};

/// Per-field lifecycle of the resolved tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionFields {
    pub stage: FieldState,
    pub step: FieldState,
    pub stage_execution: FieldState,
    pub child_stage: FieldState,
    pub collapsed_node: FieldState,
}

impl SelectionFields {
    fn advance(&self, overrides: &SelectionOverrides, resolved: &ResolvedSelection) -> Self {
        Self {
            stage: advance_field(&self.stage, overrides.stage.as_deref(), resolved.stage_id.as_deref()),
            step: advance_field(&self.step, overrides.step.as_deref(), resolved.step_id.as_deref()),
            stage_execution: advance_field(
                &self.stage_execution,
                overrides.stage_exec_id.as_deref(),
                resolved.stage_execution_id.as_deref(),
            ),
            child_stage: advance_field(
                &self.child_stage,
                overrides.child_stage.as_deref(),
                resolved.child_stage_id.as_deref(),
            ),
            collapsed_node: advance_field(
                &self.collapsed_node,
                overrides.collapsed_node.as_deref(),
                resolved.collapsed_node_id.as_deref(),
            ),
        }
    }
}

/// An override only counts as pinned when the reconciler actually returned
/// it; a dropped pin (stale execution id) reads as auto-resolved.
fn advance_field(current: &FieldState, pinned: Option<&str>, resolved: Option<&str>) -> FieldState {
    let honoured = pinned.filter(|value| Some(*value) == resolved);
    let next = FieldState::resolve(honoured, resolved);
    if current.releases_pin(&next) {
        tracing::debug!(from = ?current, to = ?next, "selection pin released");
    }
    next
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    config: ResolverConfig,
    last_input: Option<(ExecutionSnapshot, SelectionOverrides)>,
    fields: SelectionFields,
    current: ResolvedSelection,
    revision: u64,
}

impl SelectionState {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Recompute the selection for a new snapshot and/or override set.
    pub fn recompute(
        &mut self,
        snapshot: &ExecutionSnapshot,
        overrides: &SelectionOverrides,
    ) -> &ResolvedSelection {
        if let Some((last_snapshot, last_overrides)) = &self.last_input {
            if last_snapshot == snapshot && last_overrides == overrides {
                return &self.current;
            }
        }

        let resolved = reconcile(snapshot, overrides, &self.config);
        self.fields = self.fields.advance(overrides, &resolved);
        self.current = resolved;
        self.last_input = Some((snapshot.clone(), overrides.clone()));
        self.revision += 1;

        tracing::debug!(revision = self.revision, fields = ?self.fields, "selection updated");
        &self.current
    }

    pub fn current(&self) -> &ResolvedSelection {
        &self.current
    }

    pub fn fields(&self) -> &SelectionFields {
        &self.fields
    }

    /// Number of times the tuple was actually recomputed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
