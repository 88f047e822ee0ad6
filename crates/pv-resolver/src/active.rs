//! Active-node resolution for the stage layout and for a step graph.
//!
//! Priority: running > waiting-or-bad-terminal > (pipeline succeeded) last
//! success. The first two fall out of a pre-order walk, which visits nodes in
//! execution order; the last comes from a post-order walk, which surfaces the
//! tail of the graph first.

use crate::traversal::{post_order, pre_order, GraphView, Visit};
use pv_core::config::ResolverConfig;
use pv_core::graph::{StageGraph, StageNode, StepGraph, StepNode};
use pv_core::selection::NodeRef;

/// Read access the resolver needs from either node shape.
pub trait ResolvableNode {
    fn status(&self) -> &str;
    fn execution_input_configured(&self) -> bool;
}

impl ResolvableNode for StageNode {
    fn status(&self) -> &str {
        &self.status
    }

    fn execution_input_configured(&self) -> bool {
        self.execution_input_configured
    }
}

impl ResolvableNode for StepNode {
    fn status(&self) -> &str {
        &self.status
    }

    fn execution_input_configured(&self) -> bool {
        self.execution_input_configured
    }
}

/// Shared resolution over any graph shape. `selectable` rejects structural
/// nodes; their subtrees are still walked.
pub fn find_active<'g, G, F>(
    view: &'g G,
    root_id: &'g str,
    overall_status: &str,
    config: &ResolverConfig,
    selectable: F,
) -> Option<Visit<'g, G::Node>>
where
    G: GraphView,
    G::Node: ResolvableNode,
    F: Fn(&G::Node) -> bool,
{
    let rules = &config.status_rules;
    let root = view.node(root_id)?;

    // Blocked on a human-input gate before any child has materialized.
    if view.children(root_id).is_empty()
        && rules.is_waiting_for_input(overall_status)
        && root.execution_input_configured()
    {
        return Some(Visit {
            id: root_id,
            node: root,
            group: None,
        });
    }

    if rules.is_active_or_bad_terminal(overall_status) {
        return pre_order(view, root_id).find(|visit| {
            selectable(visit.node) && rules.is_active_or_bad_terminal(visit.node.status())
        });
    }

    if rules.is_success(overall_status) {
        return post_order(view, root_id)
            .find(|visit| selectable(visit.node) && rules.is_success(visit.node.status()));
    }

    None
}

// ---------------------------------------------------------------------------
// Stage level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveStage {
    pub stage: NodeRef,
    pub status: String,
}

/// Resolve the default stage using the layout's own overall status.
pub fn resolve_active_stage(layout: &StageGraph, config: &ResolverConfig) -> Option<ActiveStage> {
    resolve_active_stage_with_status(layout, &layout.status, config)
}

pub fn resolve_active_stage_with_status(
    layout: &StageGraph,
    overall_status: &str,
    config: &ResolverConfig,
) -> Option<ActiveStage> {
    let visit = find_active(layout, &layout.root_id, overall_status, config, |node: &StageNode| {
        config.is_selectable_stage(&node.node_type)
    })?;

    let stage = match visit.group.and_then(|group| layout.nodes.get(group)) {
        // Concrete run of a matrix/loop/parallelism template: the template's
        // logical id picks the node, the instance's execution id picks the run.
        Some(template) if config.is_strategy_stage(&template.node_type) => NodeRef {
            id: template.logical_id().to_string(),
            execution_id: Some(
                visit
                    .node
                    .execution_id
                    .clone()
                    .unwrap_or_else(|| visit.id.to_string()),
            ),
        },
        _ => NodeRef {
            id: visit.node.logical_id().to_string(),
            execution_id: visit.node.execution_id.clone(),
        },
    };

    tracing::debug!(
        stage_id = %stage.id,
        execution_id = ?stage.execution_id,
        overall_status,
        "resolved active stage"
    );

    Some(ActiveStage {
        stage,
        status: visit.node.status.clone(),
    })
}

// ---------------------------------------------------------------------------
// Step level
// ---------------------------------------------------------------------------

pub fn resolve_active_step(
    graph: &StepGraph,
    overall_status: &str,
    config: &ResolverConfig,
) -> Option<NodeRef> {
    let visit = find_active(graph, &graph.root_id, overall_status, config, |node: &StepNode| {
        config.is_selectable_step(&node.step_type)
    })?;

    tracing::debug!(step_id = visit.id, overall_status, "resolved active step");
    Some(NodeRef::new(visit.id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use pv_core::graph::AdjacencyEntry;
    use pv_core::status::{StatusClass, StatusRules};

    fn stage_id(layout: &StageGraph) -> Option<String> {
        resolve_active_stage(layout, &ResolverConfig::default()).map(|a| a.stage.id)
    }

    #[test]
    fn running_stage_wins_in_sequence() {
        let layout = fixtures::linear_layout(
            "Running",
            &[("s1", "Success"), ("s2", "Running"), ("s3", "NotStarted")],
        );
        assert_eq!(stage_id(&layout), Some("s2".into()));
    }

    #[test]
    fn success_returns_last_stage() {
        let layout = fixtures::linear_layout(
            "Success",
            &[("s1", "Success"), ("s2", "Success"), ("s3", "Success")],
        );
        assert_eq!(stage_id(&layout), Some("s3".into()));
    }

    #[test]
    fn success_skips_skipped_tail() {
        let layout = fixtures::linear_layout(
            "Success",
            &[("s1", "Success"), ("s2", "Success"), ("s3", "Skipped")],
        );
        assert_eq!(stage_id(&layout), Some("s2".into()));
    }

    #[test]
    fn failed_parallel_sibling_is_selected() {
        let layout =
            fixtures::parallel_layout("Failed", ("s2.1", "Failed"), ("s2.2", "Success"), "NotStarted");
        assert_eq!(stage_id(&layout), Some("s2.1".into()));
    }

    #[test]
    fn parallel_node_itself_is_never_selected() {
        // The parallel wrapper carries a bad status too but must be skipped.
        let layout =
            fixtures::parallel_layout("Aborted", ("s2.1", "Success"), ("s2.2", "Aborted"), "NotStarted");
        assert_eq!(stage_id(&layout), Some("s2.2".into()));
    }

    #[test]
    fn first_unfinished_in_execution_order_wins() {
        // Running in a later branch, failed in an earlier one: pre-order reaches
        // the failed branch first.
        let layout =
            fixtures::parallel_layout("Running", ("s2.1", "Failed"), ("s2.2", "Running"), "NotStarted");
        assert_eq!(stage_id(&layout), Some("s2.1".into()));
    }

    #[test]
    fn matrix_instance_resolves_to_template_and_execution() {
        let layout = fixtures::matrix_layout(
            "Running",
            &[("exec-1", "Success"), ("exec-2", "Running"), ("exec-3", "NotStarted")],
        );
        let active = resolve_active_stage(&layout, &ResolverConfig::default()).unwrap();
        assert_eq!(active.stage.id, "m");
        assert_eq!(active.stage.execution_id.as_deref(), Some("exec-2"));
        assert_eq!(active.status, "Running");
    }

    #[test]
    fn matrix_success_picks_last_instance() {
        let layout = fixtures::matrix_layout(
            "Success",
            &[("exec-1", "Success"), ("exec-2", "Success")],
        );
        // s3 is NotStarted here, so the tail search lands in the matrix.
        let active = resolve_active_stage(&layout, &ResolverConfig::default()).unwrap();
        assert_eq!(active.stage.id, "m");
        assert_eq!(active.stage.execution_id.as_deref(), Some("exec-1"));
    }

    #[test]
    fn loop_and_parallelism_instances_resolve_like_matrix() {
        for kind in ["Loop", "Parallelism"] {
            let layout = fixtures::strategy_layout(
                kind,
                "Failed",
                &[("run-1", "Success"), ("run-2", "Failed")],
            );
            let active = resolve_active_stage(&layout, &ResolverConfig::default()).unwrap();
            assert_eq!(active.stage.id, "m", "{kind}");
            assert_eq!(active.stage.execution_id.as_deref(), Some("run-2"), "{kind}");
        }
    }

    #[test]
    fn rollback_marker_is_skipped_for_its_child() {
        for kind in ["PipelineRollback", "StageRollback"] {
            let layout = StageGraph::new("s1", "Running")
                .with_node(StageNode::new("s1", "Deployment", "Success").with_next(["rb"]))
                .with_node(StageNode::new("rb", kind, "Running").with_children(["undo"]))
                .with_node(StageNode::new("undo", "Deployment", "Running").as_rollback());
            let active = resolve_active_stage(&layout, &ResolverConfig::default()).unwrap();
            assert_eq!(active.stage, NodeRef::new("undo"), "{kind}");
        }
    }

    #[test]
    fn rollback_success_picks_rollback_stage() {
        let layout = StageGraph::new("s1", "Success")
            .with_node(StageNode::new("s1", "Deployment", "Failed").with_next(["rb"]))
            .with_node(StageNode::new("rb", "PipelineRollback", "Success").with_children(["undo"]))
            .with_node(StageNode::new("undo", "Deployment", "Success").as_rollback());
        assert_eq!(stage_id(&layout), Some("undo".into()));
    }

    #[test]
    fn not_started_pipeline_resolves_nothing() {
        let layout = fixtures::linear_layout("NotStarted", &[("s1", "NotStarted")]);
        assert_eq!(stage_id(&layout), None);
    }

    #[test]
    fn empty_layout_resolves_nothing() {
        let layout = StageGraph::new("missing", "Running");
        assert_eq!(stage_id(&layout), None);
    }

    #[test]
    fn dangling_child_is_ignored() {
        let layout = StageGraph::new("p", "Failed")
            .with_node(StageNode::new("p", "Parallel", "Failed").with_children(["ghost", "b"]))
            .with_node(StageNode::new("b", "Deployment", "Failed"));
        assert_eq!(stage_id(&layout), Some("b".into()));
    }

    #[test]
    fn input_gate_on_childless_root() {
        let layout = StageGraph::new("s1", "InputWaiting").with_node(
            StageNode::new("s1", "Deployment", "InputWaiting").with_execution_input(),
        );
        assert_eq!(stage_id(&layout), Some("s1".into()));
    }

    #[test]
    fn resolution_is_idempotent() {
        let layout = fixtures::matrix_layout("Running", &[("e1", "Failed"), ("e2", "Running")]);
        let config = ResolverConfig::default();
        assert_eq!(
            resolve_active_stage(&layout, &config),
            resolve_active_stage(&layout, &config)
        );
    }

    #[test]
    fn status_rules_change_classification() {
        let layout = fixtures::linear_layout("Blocked", &[("s1", "Success"), ("s2", "Blocked")]);
        assert_eq!(stage_id(&layout), None);

        let config = ResolverConfig {
            status_rules: StatusRules::new().with_override("Blocked", StatusClass::WaitingOrBad),
            ..Default::default()
        };
        let active = resolve_active_stage(&layout, &config).unwrap();
        assert_eq!(active.stage.id, "s2");
    }

    #[test]
    fn step_running_inside_group() {
        let graph = StepGraph::new("root")
            .with_node(
                StepNode::new("root", "NG_SECTION", "Running"),
                AdjacencyEntry::new(["st1"], Vec::<String>::new()),
            )
            .with_node(
                StepNode::new("st1", "ShellScript", "Success"),
                AdjacencyEntry::new(Vec::<String>::new(), ["grp"]),
            )
            .with_node(
                StepNode::new("grp", "STEP_GROUP", "Running"),
                AdjacencyEntry::new(["st2"], Vec::<String>::new()),
            )
            .with_node(
                StepNode::new("st2", "Http", "Running"),
                AdjacencyEntry::default(),
            );
        let step = resolve_active_step(&graph, "Running", &ResolverConfig::default()).unwrap();
        assert_eq!(step.id, "st2");
        assert!(step.execution_id.is_none());
    }

    #[test]
    fn step_success_returns_last_step() {
        let graph = fixtures::linear_steps("Success", &[("a", "Success"), ("b", "Success")]);
        let step = resolve_active_step(&graph, "Success", &ResolverConfig::default());
        assert_eq!(step.map(|s| s.id), Some("b".into()));
    }

    #[test]
    fn step_input_gate_returns_root() {
        let graph = StepGraph::new("gate").with_node(
            StepNode::new("gate", "NG_SECTION", "InputWaiting").with_execution_input(),
            AdjacencyEntry::default(),
        );
        let step = resolve_active_step(&graph, "InputWaiting", &ResolverConfig::default());
        assert_eq!(step.map(|s| s.id), Some("gate".into()));
    }

    #[test]
    fn only_structural_steps_resolve_nothing() {
        let graph = StepGraph::new("root")
            .with_node(
                StepNode::new("root", "NG_SECTION", "Running"),
                AdjacencyEntry::new(["fork"], Vec::<String>::new()),
            )
            .with_node(
                StepNode::new("fork", "NG_FORK", "Running"),
                AdjacencyEntry::default(),
            );
        assert!(resolve_active_step(&graph, "Running", &ResolverConfig::default()).is_none());
    }
}
