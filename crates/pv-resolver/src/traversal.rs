//! Lazy depth-first walks over either graph shape.
//!
//! `pre_order` visits a node, then its fan-out children, then its sequential
//! successors. `post_order` walks successors first, then children, and visits
//! the node last. Both yield each node at most once per walk and silently skip
//! ids that are missing from the node map.

use pv_core::graph::{StageGraph, StageNode, StepGraph, StepNode};
use std::collections::HashSet;

/// How the traversal reads a graph: node lookup plus the two adjacency lists.
pub trait GraphView {
    type Node;

    fn node(&self, id: &str) -> Option<&Self::Node>;
    fn children(&self, id: &str) -> &[String];
    fn next(&self, id: &str) -> &[String];
}

impl GraphView for StageGraph {
    type Node = StageNode;

    fn node(&self, id: &str) -> Option<&StageNode> {
        self.nodes.get(id)
    }

    fn children(&self, id: &str) -> &[String] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    fn next(&self, id: &str) -> &[String] {
        self.nodes
            .get(id)
            .map(|node| node.next.as_slice())
            .unwrap_or(&[])
    }
}

impl GraphView for StepGraph {
    type Node = StepNode;

    fn node(&self, id: &str) -> Option<&StepNode> {
        self.nodes.get(id)
    }

    fn children(&self, id: &str) -> &[String] {
        self.children_of(id)
    }

    fn next(&self, id: &str) -> &[String] {
        self.next_of(id)
    }
}

// ---------------------------------------------------------------------------
// Visit
// ---------------------------------------------------------------------------

/// One yielded node. `group` is the nearest enclosing fan-out node, i.e. the
/// node whose `children` list led here; sequential successors inherit the
/// group of their predecessor.
#[derive(Debug)]
pub struct Visit<'g, N> {
    pub id: &'g str,
    pub node: &'g N,
    pub group: Option<&'g str>,
}

impl<N> Clone for Visit<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Visit<'_, N> {}

// ---------------------------------------------------------------------------
// Pre-order
// ---------------------------------------------------------------------------

pub struct PreOrder<'g, G: GraphView> {
    view: &'g G,
    stack: Vec<(&'g str, Option<&'g str>)>,
    seen: HashSet<&'g str>,
}

pub fn pre_order<'g, G: GraphView>(view: &'g G, start: &'g str) -> PreOrder<'g, G> {
    PreOrder {
        view,
        stack: vec![(start, None)],
        seen: HashSet::new(),
    }
}

impl<'g, G: GraphView> Iterator for PreOrder<'g, G> {
    type Item = Visit<'g, G::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, group)) = self.stack.pop() {
            if !self.seen.insert(id) {
                continue;
            }
            let Some(node) = self.view.node(id) else {
                tracing::trace!(node_id = id, "skipping dangling node reference");
                continue;
            };

            // Children sit on top of the stack so a whole fan-out is explored
            // before anything that follows it.
            for next in self.view.next(id).iter().rev() {
                self.stack.push((next.as_str(), group));
            }
            for child in self.view.children(id).iter().rev() {
                self.stack.push((child.as_str(), Some(id)));
            }

            return Some(Visit { id, node, group });
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Post-order
// ---------------------------------------------------------------------------

enum Frame<'g> {
    Enter(&'g str, Option<&'g str>),
    Exit(&'g str, Option<&'g str>),
}

pub struct PostOrder<'g, G: GraphView> {
    view: &'g G,
    stack: Vec<Frame<'g>>,
    seen: HashSet<&'g str>,
}

pub fn post_order<'g, G: GraphView>(view: &'g G, start: &'g str) -> PostOrder<'g, G> {
    PostOrder {
        view,
        stack: vec![Frame::Enter(start, None)],
        seen: HashSet::new(),
    }
}

impl<'g, G: GraphView> Iterator for PostOrder<'g, G> {
    type Item = Visit<'g, G::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Exit(id, group) => {
                    if let Some(node) = self.view.node(id) {
                        return Some(Visit { id, node, group });
                    }
                }
                Frame::Enter(id, group) => {
                    if !self.seen.insert(id) {
                        continue;
                    }
                    if self.view.node(id).is_none() {
                        tracing::trace!(node_id = id, "skipping dangling node reference");
                        continue;
                    }

                    self.stack.push(Frame::Exit(id, group));
                    for child in self.view.children(id).iter().rev() {
                        self.stack.push(Frame::Enter(child.as_str(), Some(id)));
                    }
                    for next in self.view.next(id).iter().rev() {
                        self.stack.push(Frame::Enter(next.as_str(), group));
                    }
                }
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
