//! Step tree — the execution graph of one stage shaped for display.
//!
//! Forks become parallel blocks, step groups and strategies become named
//! groups, every other structural wrapper is flattened away. Dependency
//! services are hoisted into a leading `Dependencies` group.

use std::collections::{HashSet, VecDeque};

use pv_core::config::ResolverConfig;
use pv_core::graph::{StepGraph, StepNode};
use pv_core::selection::ResolvedSelection;
use pv_core::status::{ExecutionStatus, StatusClass};
use serde::{Deserialize, Serialize};

use crate::duration_ms;

pub const DEPENDENCIES_GROUP_ID: &str = "dependencies";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepCard {
    pub id: String,
    pub name: String,
    pub step_type: String,
    pub status: String,
    pub class: StatusClass,
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub background: bool,
    #[serde(default)]
    pub selected: bool,
}

impl StepCard {
    fn from_node(node: &StepNode, config: &ResolverConfig) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            step_type: node.step_type.clone(),
            status: node.status.clone(),
            class: config.status_rules.classify(&node.status),
            duration_ms: duration_ms(node.started_at, node.ended_at),
            background: config.is_background_step(&node.step_type),
            selected: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepItem {
    Step(StepCard),
    Parallel {
        items: Vec<StepItem>,
    },
    Group {
        id: String,
        name: String,
        status: String,
        items: Vec<StepItem>,
    },
}

impl StepItem {
    fn cards_mut(&mut self) -> Vec<&mut StepCard> {
        match self {
            StepItem::Step(card) => vec![card],
            StepItem::Parallel { items } | StepItem::Group { items, .. } => {
                items.iter_mut().flat_map(StepItem::cards_mut).collect()
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StepTree {
    pub items: Vec<StepItem>,
}

impl StepTree {
    pub fn mark_selected(&mut self, selection: &ResolvedSelection) -> bool {
        let mut found = false;
        for card in self.items.iter_mut().flat_map(StepItem::cards_mut) {
            card.selected = !found && selection.step_id.as_deref() == Some(card.id.as_str());
            found |= card.selected;
        }
        found
    }
}

pub fn materialize_steps(graph: &StepGraph, config: &ResolverConfig) -> StepTree {
    let mut walker = StepWalker {
        graph,
        config,
        seen: HashSet::new(),
        dependencies: Vec::new(),
    };
    let mut items = Vec::new();
    walker.collect_chain(&graph.root_id, &mut items);

    if !walker.dependencies.is_empty() {
        let status = most_alarming(&walker.dependencies);
        items.insert(
            0,
            StepItem::Group {
                id: DEPENDENCIES_GROUP_ID.to_string(),
                name: "Dependencies".to_string(),
                status,
                items: walker.dependencies,
            },
        );
    }

    StepTree { items }
}

struct StepWalker<'g> {
    graph: &'g StepGraph,
    config: &'g ResolverConfig,
    seen: HashSet<&'g str>,
    dependencies: Vec<StepItem>,
}

impl<'g> StepWalker<'g> {
    /// Follow `start` and its `next` successors, appending into `out`.
    fn collect_chain(&mut self, start: &'g str, out: &mut Vec<StepItem>) {
        let graph = self.graph;
        let mut pending: VecDeque<&'g str> = VecDeque::from([start]);

        while let Some(id) = pending.pop_front() {
            if !self.seen.insert(id) {
                continue;
            }
            let Some(node) = graph.nodes.get(id) else {
                tracing::trace!(step_id = id, "skipping step missing from graph");
                continue;
            };
            self.collect_node(id, node, out);
            pending.extend(graph.next_of(id).iter().map(String::as_str));
        }
    }

    fn collect_children(&mut self, id: &'g str, out: &mut Vec<StepItem>) {
        let graph = self.graph;
        for child in graph.children_of(id) {
            self.collect_chain(child, out);
        }
    }

    fn collect_node(&mut self, id: &'g str, node: &'g StepNode, out: &mut Vec<StepItem>) {
        let config = self.config;

        if config.is_dependency_step(&node.step_type) {
            self.dependencies.push(StepItem::Step(StepCard::from_node(node, config)));
        } else if config.is_fork_step(&node.step_type) {
            let mut items = Vec::new();
            self.collect_children(id, &mut items);
            out.push(StepItem::Parallel { items });
        } else if config.is_group_step(&node.step_type) {
            let mut items = Vec::new();
            self.collect_children(id, &mut items);
            out.push(StepItem::Group {
                id: node.id.clone(),
                name: node.name.clone(),
                status: node.status.clone(),
                items,
            });
        } else if !config.is_selectable_step(&node.step_type) {
            self.collect_children(id, out);
        } else {
            out.push(StepItem::Step(StepCard::from_node(node, config)));
            self.collect_children(id, out);
        }
    }
}

fn most_alarming(items: &[StepItem]) -> String {
    items
        .iter()
        .filter_map(|item| match item {
            StepItem::Step(card) => Some(card.status.as_str()),
            _ => None,
        })
        .min_by_key(|status| ExecutionStatus::parse(status).display_rank())
        .unwrap_or_default()
        .to_string()
}
