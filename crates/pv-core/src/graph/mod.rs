//! Execution snapshot model: a stage layout graph plus the step graph of the
//! stage in focus, optionally nesting a child pipeline of the same shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::CoreError;

// ---------------------------------------------------------------------------
// Stage layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StageNode {
    /// Key of this node in the layout map. For a matrix/loop/parallelism
    /// instance this is the instance's execution id.
    pub id: String,

    /// Logical stage id, shared by every instance of a strategy stage.
    #[serde(default)]
    pub node_uuid: Option<String>,

    /// Runtime id of this concrete run.
    #[serde(default)]
    pub execution_id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub identifier: Option<String>,

    /// Ordinary stage type, or a structural marker such as `Parallel`,
    /// `Matrix`, `Loop`, `Parallelism` or `PipelineRollback`.
    #[serde(default)]
    pub node_type: String,

    #[serde(default)]
    pub status: String,

    /// Fan-out members.
    #[serde(default)]
    pub children: Vec<String>,

    /// Sequential successors.
    #[serde(default)]
    pub next: Vec<String>,

    #[serde(default)]
    pub execution_input_configured: bool,

    #[serde(default)]
    pub is_rollback: bool,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl StageNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, status: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            node_type: node_type.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    /// The id shared by every run of this stage.
    pub fn logical_id(&self) -> &str {
        self.node_uuid.as_deref().unwrap_or(&self.id)
    }

    pub fn with_logical_id(mut self, node_uuid: impl Into<String>) -> Self {
        self.node_uuid = Some(node_uuid.into());
        self
    }

    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = Some(execution_id.into());
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_next<I, S>(mut self, next: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.next = next.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_execution_input(mut self) -> Self {
        self.execution_input_configured = true;
        self
    }

    pub fn as_rollback(mut self) -> Self {
        self.is_rollback = true;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StageGraph {
    pub root_id: String,

    /// Overall pipeline status.
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub nodes: BTreeMap<String, StageNode>,
}

impl StageGraph {
    pub fn new(root_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            status: status.into(),
            nodes: BTreeMap::new(),
        }
    }

    /// Insert a node under its own `id`.
    pub fn with_node(mut self, node: StageNode) -> Self {
        self.nodes.insert(node.id.clone(), node);
        self
    }

    pub fn root(&self) -> Option<&StageNode> {
        self.nodes.get(&self.root_id)
    }

    /// Whether `id` names a node in this layout, either by key or by
    /// logical id.
    pub fn contains_stage(&self, id: &str) -> bool {
        self.nodes.contains_key(id) || self.find_by_logical_id(id).is_some()
    }

    /// Look a stage up by key first, then by logical id.
    pub fn find_stage(&self, id: &str) -> Option<&StageNode> {
        self.nodes.get(id).or_else(|| self.find_by_logical_id(id))
    }

    fn find_by_logical_id(&self, id: &str) -> Option<&StageNode> {
        self.nodes.values().find(|node| node.logical_id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Step execution graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StepNode {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub identifier: Option<String>,

    /// Ordinary step type, or a structural wrapper such as `STEP_GROUP`,
    /// `NG_FORK`, `NG_SECTION` or `STRATEGY`.
    #[serde(default)]
    pub step_type: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub execution_input_configured: bool,

    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl StepNode {
    pub fn new(id: impl Into<String>, step_type: impl Into<String>, status: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            step_type: step_type.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    pub fn with_execution_input(mut self) -> Self {
        self.execution_input_configured = true;
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdjacencyEntry {
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub next: Vec<String>,
}

impl AdjacencyEntry {
    pub fn new<C, N>(children: C, next: N) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        Self {
            children: children.into_iter().map(Into::into).collect(),
            next: next.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StepGraph {
    pub root_id: String,

    #[serde(default)]
    pub nodes: BTreeMap<String, StepNode>,

    #[serde(default)]
    pub adjacency: BTreeMap<String, AdjacencyEntry>,
}

impl StepGraph {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            nodes: BTreeMap::new(),
            adjacency: BTreeMap::new(),
        }
    }

    pub fn with_node(mut self, node: StepNode, adjacency: AdjacencyEntry) -> Self {
        self.adjacency.insert(node.id.clone(), adjacency);
        self.nodes.insert(node.id.clone(), node);
        self
    }

    pub fn root(&self) -> Option<&StepNode> {
        self.nodes.get(&self.root_id)
    }

    pub fn children_of(&self, id: &str) -> &[String] {
        self.adjacency
            .get(id)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_of(&self, id: &str) -> &[String] {
        self.adjacency
            .get(id)
            .map(|entry| entry.next.as_slice())
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One immutable poll result. `execution` is the step graph of the stage in
/// focus; `child_pipeline` is present when that stage chains another
/// pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExecutionSnapshot {
    pub layout: StageGraph,

    #[serde(default)]
    pub execution: Option<StepGraph>,

    #[serde(default)]
    pub child_pipeline: Option<Box<ExecutionSnapshot>>,
}

impl ExecutionSnapshot {
    pub fn new(layout: StageGraph) -> Self {
        Self {
            layout,
            execution: None,
            child_pipeline: None,
        }
    }

    pub fn with_execution(mut self, execution: StepGraph) -> Self {
        self.execution = Some(execution);
        self
    }

    pub fn with_child_pipeline(mut self, child: ExecutionSnapshot) -> Self {
        self.child_pipeline = Some(Box::new(child));
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::InvalidSnapshot(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
