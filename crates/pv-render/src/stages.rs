//! Stage tree — the pipeline layout flattened into display rows.

use std::collections::{HashSet, VecDeque};

use pv_core::config::ResolverConfig;
use pv_core::graph::{StageGraph, StageNode};
use pv_core::selection::ResolvedSelection;
use pv_core::status::StatusClass;
use pv_resolver::expansion::sorted_stage_children;
use serde::{Deserialize, Serialize};

use crate::duration_ms;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageCard {
    /// Logical id; strategy instances carry their template's id.
    pub id: String,
    pub execution_id: Option<String>,
    pub name: String,
    pub node_type: String,
    pub status: String,
    pub class: StatusClass,
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub selected: bool,
}

impl StageCard {
    fn from_node(node: &StageNode, config: &ResolverConfig) -> Self {
        Self {
            id: node.logical_id().to_string(),
            execution_id: node.execution_id.clone(),
            name: node.name.clone(),
            node_type: node.node_type.clone(),
            status: node.status.clone(),
            class: config.status_rules.classify(&node.status),
            duration_ms: duration_ms(node.started_at, node.ended_at),
            selected: false,
        }
    }

    fn instance_of(template: &StageNode, node: &StageNode, config: &ResolverConfig) -> Self {
        Self {
            id: template.logical_id().to_string(),
            execution_id: Some(node.execution_id.clone().unwrap_or_else(|| node.id.clone())),
            ..Self::from_node(node, config)
        }
    }

    fn matches(&self, selection: &ResolvedSelection) -> bool {
        if selection.stage_id.as_deref() != Some(self.id.as_str()) {
            return false;
        }
        match (&selection.stage_execution_id, &self.execution_id) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageItem {
    Stage(StageCard),
    Parallel {
        items: Vec<StageItem>,
    },
    Strategy {
        id: String,
        kind: String,
        instances: Vec<StageCard>,
    },
}

impl StageItem {
    fn cards_mut(&mut self) -> Vec<&mut StageCard> {
        match self {
            StageItem::Stage(card) => vec![card],
            StageItem::Parallel { items } => items.iter_mut().flat_map(StageItem::cards_mut).collect(),
            StageItem::Strategy { instances, .. } => instances.iter_mut().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StageTree {
    pub items: Vec<StageItem>,
    /// Stages that only run when the pipeline rolls back.
    pub rollback: Vec<StageItem>,
}

impl StageTree {
    /// Flag the card the selection points at. Returns whether one matched;
    /// with several candidates the first in display order wins.
    pub fn mark_selected(&mut self, selection: &ResolvedSelection) -> bool {
        let mut found = false;
        for card in self
            .items
            .iter_mut()
            .chain(self.rollback.iter_mut())
            .flat_map(StageItem::cards_mut)
        {
            card.selected = !found && card.matches(selection);
            found |= card.selected;
        }
        found
    }
}

/// Walk the layout from its root along `next` and build the display tree.
/// Every stage shows up at most once, however it is reached.
pub fn materialize_stages(layout: &StageGraph, config: &ResolverConfig) -> StageTree {
    let mut walker = StageWalker {
        layout,
        config,
        seen: HashSet::new(),
        rollback: Vec::new(),
    };
    let mut items = Vec::new();
    walker.collect_chain(&layout.root_id, &mut items);

    StageTree {
        items,
        rollback: walker.rollback,
    }
}

struct StageWalker<'g> {
    layout: &'g StageGraph,
    config: &'g ResolverConfig,
    seen: HashSet<&'g str>,
    rollback: Vec<StageItem>,
}

impl<'g> StageWalker<'g> {
    /// Follow `start` and its `next` successors, appending into `out`.
    fn collect_chain(&mut self, start: &'g str, out: &mut Vec<StageItem>) {
        let layout = self.layout;
        let mut pending: VecDeque<&'g str> = VecDeque::from([start]);

        while let Some(id) = pending.pop_front() {
            if !self.seen.insert(id) {
                continue;
            }
            let Some(node) = layout.nodes.get(id) else {
                tracing::trace!(stage_id = id, "skipping stage missing from layout");
                continue;
            };
            self.collect_node(node, out);
            pending.extend(node.next.iter().map(String::as_str));
        }
    }

    fn collect_node(&mut self, node: &'g StageNode, out: &mut Vec<StageItem>) {
        let config = self.config;

        if config.is_rollback_stage(&node.node_type) {
            let mut items = Vec::new();
            for child in &node.children {
                self.collect_chain(child, &mut items);
            }
            self.rollback.extend(items);
            return;
        }

        let item = if config.is_strategy_stage(&node.node_type) {
            self.strategy_item(node)
        } else if config.is_parallel_stage(&node.node_type) {
            // Each branch may continue along its own `next` chain.
            let mut items = Vec::new();
            for child in &node.children {
                self.collect_chain(child, &mut items);
            }
            StageItem::Parallel { items }
        } else {
            StageItem::Stage(StageCard::from_node(node, config))
        };

        if node.is_rollback {
            self.rollback.push(item);
        } else {
            out.push(item);
        }
    }

    fn strategy_item(&mut self, node: &'g StageNode) -> StageItem {
        let config = self.config;
        let mut instances = Vec::new();
        for instance in sorted_stage_children(node, self.layout) {
            if self.seen.insert(instance.id.as_str()) {
                instances.push(StageCard::instance_of(node, instance, config));
            }
        }
        StageItem::Strategy {
            id: node.logical_id().to_string(),
            kind: node.node_type.clone(),
            instances,
        }
    }
}
