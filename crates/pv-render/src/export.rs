//! Render document — everything a view needs for one snapshot, and its JSON
//! export.

use pv_core::config::ResolverConfig;
use pv_core::graph::ExecutionSnapshot;
use pv_core::selection::ResolvedSelection;
use serde::{Deserialize, Serialize};

use crate::stages::{materialize_stages, StageTree};
use crate::steps::{materialize_steps, StepTree};
use crate::RenderError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RenderDocument {
    pub selection: ResolvedSelection,
    pub stages: StageTree,
    /// Stage tree of the chained child pipeline, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_stages: Option<StageTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<StepTree>,
}

/// Materialize the snapshot and flag the resolved selection in it. When a
/// child pipeline is present its step graph is the one shown.
pub fn render(
    snapshot: &ExecutionSnapshot,
    selection: &ResolvedSelection,
    config: &ResolverConfig,
) -> RenderDocument {
    let mut stages = materialize_stages(&snapshot.layout, config);
    stages.mark_selected(selection);

    let child = snapshot.child_pipeline.as_deref();
    let child_stages = child.map(|child| {
        let mut tree = materialize_stages(&child.layout, config);
        tree.mark_selected(&ResolvedSelection {
            stage_id: selection.child_stage_id.clone(),
            ..Default::default()
        });
        tree
    });

    let step_graph = match child {
        Some(child) => child.execution.as_ref(),
        None => snapshot.execution.as_ref(),
    };
    let steps = step_graph.map(|graph| {
        let mut tree = materialize_steps(graph, config);
        tree.mark_selected(selection);
        tree
    });

    RenderDocument {
        selection: selection.clone(),
        stages,
        child_stages,
        steps,
    }
}

/// Export a render document to a JSON string.
pub fn export_json(document: &RenderDocument) -> Result<String, RenderError> {
    serde_json::to_string_pretty(document).map_err(|e| RenderError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::StageItem;
    use crate::steps::StepItem;
    use serde_json::json;

    fn snapshot() -> ExecutionSnapshot {
        ExecutionSnapshot::from_json_str(
            &json!({
                "layout": {
                    "root_id": "s1",
                    "status": "Running",
                    "nodes": {
                        "s1": {"id": "s1", "node_type": "CI", "status": "Success", "next": ["s2"]},
                        "s2": {"id": "s2", "node_type": "CI", "status": "Running"}
                    }
                },
                "execution": {
                    "root_id": "root",
                    "nodes": {
                        "root": {"id": "root", "step_type": "NG_SECTION", "status": "Running"},
                        "build": {"id": "build", "step_type": "Run", "status": "Running"}
                    },
                    "adjacency": {
                        "root": {"children": ["build"]}
                    }
                }
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn render_marks_selection() {
        let selection = ResolvedSelection {
            stage_id: Some("s2".into()),
            step_id: Some("build".into()),
            ..Default::default()
        };
        let doc = render(&snapshot(), &selection, &ResolverConfig::default());

        let StageItem::Stage(s2) = &doc.stages.items[1] else {
            panic!("expected stage card");
        };
        assert!(s2.selected);

        let steps = doc.steps.expect("step tree");
        let StepItem::Step(build) = &steps.items[0] else {
            panic!("expected step card");
        };
        assert!(build.selected);
        assert!(doc.child_stages.is_none());
    }

    #[test]
    fn child_pipeline_supplies_steps() {
        let child = snapshot();
        let mut parent = snapshot().with_child_pipeline(child);
        parent.execution = None;

        let selection = ResolvedSelection {
            stage_id: Some("s2".into()),
            child_stage_id: Some("s1".into()),
            step_id: Some("build".into()),
            ..Default::default()
        };
        let doc = render(&parent, &selection, &ResolverConfig::default());
        assert!(doc.steps.is_some());

        let child_stages = doc.child_stages.expect("child stage tree");
        let StageItem::Stage(c1) = &child_stages.items[0] else {
            panic!("expected stage card");
        };
        assert!(c1.selected);
    }

    #[test]
    fn export_is_pretty_json() {
        let doc = render(&snapshot(), &ResolvedSelection::default(), &ResolverConfig::default());
        let text = export_json(&doc).unwrap();
        assert!(text.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["stages"]["items"][0]["type"], "stage");
        assert_eq!(value["stages"]["items"][1]["class"], "active");
        assert!(value.get("child_stages").is_none());
    }
}
