//! Graph builders shared by the unit tests.

use pv_core::graph::{AdjacencyEntry, StageGraph, StageNode, StepGraph, StepNode};

/// Sequential pipeline `stages[0] -> stages[1] -> ...`.
pub fn linear_layout(overall: &str, stages: &[(&str, &str)]) -> StageGraph {
    let root = stages.first().map(|(id, _)| *id).unwrap_or_default();
    let mut layout = StageGraph::new(root, overall);
    for (i, (id, status)) in stages.iter().enumerate() {
        let mut node = StageNode::new(*id, "Deployment", *status);
        if let Some((next, _)) = stages.get(i + 1) {
            node = node.with_next([*next]);
        }
        layout = layout.with_node(node);
    }
    layout
}

/// `s1(Success) -> p{a, b} -> s3`.
pub fn parallel_layout(
    overall: &str,
    a: (&str, &str),
    b: (&str, &str),
    s3_status: &str,
) -> StageGraph {
    StageGraph::new("s1", overall)
        .with_node(StageNode::new("s1", "Deployment", "Success").with_next(["p"]))
        .with_node(
            StageNode::new("p", "Parallel", overall)
                .with_children([a.0, b.0])
                .with_next(["s3"]),
        )
        .with_node(StageNode::new(a.0, "Deployment", a.1))
        .with_node(StageNode::new(b.0, "Deployment", b.1))
        .with_node(StageNode::new("s3", "Deployment", s3_status))
}

/// `s1(Success) -> m[instances] -> s3(NotStarted)`, where every instance
/// shares the logical id `m-stage` and is keyed by its execution id.
pub fn matrix_layout(overall: &str, instances: &[(&str, &str)]) -> StageGraph {
    strategy_layout("Matrix", overall, instances)
}

/// Same shape as [`matrix_layout`] with the fan-out node typed `kind`.
pub fn strategy_layout(kind: &str, overall: &str, instances: &[(&str, &str)]) -> StageGraph {
    let mut layout = StageGraph::new("s1", overall)
        .with_node(StageNode::new("s1", "Deployment", "Success").with_next(["m"]))
        .with_node(
            StageNode::new("m", kind, overall)
                .with_children(instances.iter().map(|(id, _)| *id))
                .with_next(["s3"]),
        )
        .with_node(StageNode::new("s3", "Deployment", "NotStarted"));
    for (exec_id, status) in instances {
        layout = layout.with_node(
            StageNode::new(*exec_id, "Deployment", *status)
                .with_logical_id("m-stage")
                .with_execution_id(*exec_id),
        );
    }
    layout
}

/// `root(NG_SECTION)` with sequential children `steps[0] -> steps[1] -> ...`.
pub fn linear_steps(root_status: &str, steps: &[(&str, &str)]) -> StepGraph {
    let first: Vec<&str> = steps.first().map(|(id, _)| *id).into_iter().collect();
    let mut graph = StepGraph::new("root").with_node(
        StepNode::new("root", "NG_SECTION", root_status),
        AdjacencyEntry::new(first, Vec::<String>::new()),
    );
    for (i, (id, status)) in steps.iter().enumerate() {
        let next: Vec<&str> = steps.get(i + 1).map(|(n, _)| *n).into_iter().collect();
        graph = graph.with_node(
            StepNode::new(*id, "ShellScript", *status),
            AdjacencyEntry::new(Vec::<String>::new(), next),
        );
    }
    graph
}
