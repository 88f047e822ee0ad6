//! Fan-out expansion for display: which sibling of a parallel block or which
//! instance of a matrix/loop/parallelism node is shown first.

use pv_core::config::ResolverConfig;
use pv_core::graph::{StageGraph, StageNode, StepGraph, StepNode};
use pv_core::selection::NodeRef;
use pv_core::status::ExecutionStatus;

fn rank(status: &str) -> u8 {
    ExecutionStatus::parse(status).display_rank()
}

/// Children of a stage fan-out node, most alarming first. Ties keep layout
/// order; ids missing from the layout are dropped.
pub fn sorted_stage_children<'g>(node: &StageNode, layout: &'g StageGraph) -> Vec<&'g StageNode> {
    let mut children: Vec<&StageNode> = node
        .children
        .iter()
        .filter_map(|id| layout.nodes.get(id))
        .collect();
    children.sort_by_key(|child| rank(&child.status));
    children
}

/// Expand a parallel or strategy stage into references to its concrete
/// children in display order. Strategy instances share the template's logical
/// id and differ by execution id.
pub fn expand_siblings(node: &StageNode, layout: &StageGraph, config: &ResolverConfig) -> Vec<NodeRef> {
    let is_strategy = config.is_strategy_stage(&node.node_type);
    sorted_stage_children(node, layout)
        .into_iter()
        .map(|child| {
            if is_strategy {
                NodeRef {
                    id: node.logical_id().to_string(),
                    execution_id: Some(child.execution_id.clone().unwrap_or_else(|| child.id.clone())),
                }
            } else {
                NodeRef {
                    id: child.logical_id().to_string(),
                    execution_id: child.execution_id.clone(),
                }
            }
        })
        .collect()
}

/// Children of a step fan-out (fork, step group, strategy) in display order.
pub fn sorted_step_children<'g>(graph: &'g StepGraph, id: &str) -> Vec<&'g StepNode> {
    let mut children: Vec<&StepNode> = graph
        .children_of(id)
        .iter()
        .filter_map(|child| graph.nodes.get(child))
        .collect();
    children.sort_by_key(|child| rank(&child.status));
    children
}

pub fn expand_step_siblings(graph: &StepGraph, id: &str) -> Vec<NodeRef> {
    sorted_step_children(graph, id)
        .into_iter()
        .map(|child| NodeRef::new(child.id.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
