//! DependencyGraph - snapshot of an automation graph
//!
//! Performance notes:
//! - Arc<str> ids, one allocation per node, shared by every adjacency list
//! - FxHashMap for faster hashing (non-crypto)
//! - SmallVec for stack-allocated small dependency lists (0-4 items)
//!
//! The graph is NOT assumed acyclic. Every traversal uses an explicit
//! work-list plus a visited set, so cycles and deep chains are bounded.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::SmallVec;
use tracing::warn;

/// Stack-allocated deps: most nodes have 0-4 neighbors
pub type DepVec = SmallVec<[Arc<str>; 4]>;

/// Automation node as seen by the resolver
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// Node type identifier, key of the capability lookup
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Output name → custom display name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
    /// Node configuration, drives input-dependent outputs
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub inputs: Value,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_alias(mut self, output: impl Into<String>, alias: impl Into<String>) -> Self {
        self.aliases.insert(output.into(), alias.into());
        self
    }

    pub fn with_inputs(mut self, inputs: Value) -> Self {
        self.inputs = inputs;
        self
    }

    /// Label when set, id otherwise
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// `source -> target`: target may read outputs produced by source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Graph of node dependencies
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: FxHashMap<Arc<str>, GraphNode>,
    /// Insertion order (for deterministic iteration)
    node_ids: Vec<Arc<str>>,
    /// node_id -> successors
    adjacency: FxHashMap<Arc<str>, DepVec>,
    /// node_id -> predecessors (dependencies)
    predecessors: FxHashMap<Arc<str>, DepVec>,
    edge_count: usize,
}

impl DependencyGraph {
    /// Build a snapshot. Edge endpoints missing from `nodes` become untyped
    /// implicit nodes; duplicate node ids keep the first definition.
    pub fn new(
        nodes: impl IntoIterator<Item = GraphNode>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Self {
        let mut graph = Self::default();

        for node in nodes {
            if graph.nodes.contains_key(node.id.as_str()) {
                warn!(node_id = %node.id, "duplicate node id, keeping first definition");
                continue;
            }
            graph.insert_node(node);
        }

        for edge in edges {
            graph.add_edge(&edge.source, &edge.target);
        }

        graph
    }

    /// Graph whose node set is implied by the edges
    pub fn from_edges(edges: impl IntoIterator<Item = Edge>) -> Self {
        Self::new(std::iter::empty(), edges)
    }

    fn insert_node(&mut self, node: GraphNode) -> Arc<str> {
        let id: Arc<str> = Arc::from(node.id.as_str());
        self.node_ids.push(Arc::clone(&id));
        self.adjacency.insert(Arc::clone(&id), DepVec::new());
        self.predecessors.insert(Arc::clone(&id), DepVec::new());
        self.nodes.insert(Arc::clone(&id), node);
        id
    }

    /// Existing Arc for `id`, or a fresh implicit node
    fn node_arc(&mut self, id: &str) -> Arc<str> {
        match self.nodes.get_key_value(id) {
            Some((key, _)) => Arc::clone(key),
            None => self.insert_node(GraphNode::new(id, "")),
        }
    }

    fn add_edge(&mut self, source: &str, target: &str) {
        let src = self.node_arc(source);
        let tgt = self.node_arc(target);

        let successors = self.adjacency.entry(Arc::clone(&src)).or_default();
        if successors.contains(&tgt) {
            return;
        }
        successors.push(Arc::clone(&tgt));
        self.predecessors.entry(tgt).or_default().push(src);
        self.edge_count += 1;
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_ids(&self) -> &[Arc<str>] {
        &self.node_ids
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.node_ids.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Direct dependencies of a node
    #[inline]
    pub fn predecessors(&self, id: &str) -> &[Arc<str>] {
        static EMPTY: &[Arc<str>] = &[];
        self.predecessors.get(id).map_or(EMPTY, SmallVec::as_slice)
    }

    /// Direct dependents of a node
    #[inline]
    pub fn successors(&self, id: &str) -> &[Arc<str>] {
        static EMPTY: &[Arc<str>] = &[];
        self.adjacency.get(id).map_or(EMPTY, SmallVec::as_slice)
    }

    /// All strictly-upstream nodes of `target`, nearest first (BFS over
    /// incoming edges). The target itself is excluded even when a cycle
    /// leads back to it. Unknown targets have no upstream.
    pub fn upstream(&self, target: &str) -> Vec<Arc<str>> {
        let mut found: Vec<Arc<str>> = Vec::new();
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut queue: VecDeque<&str> = VecDeque::new();

        if !self.contains(target) {
            return found;
        }

        visited.insert(target);
        queue.push_back(target);

        while let Some(current) = queue.pop_front() {
            for source in self.predecessors(current) {
                if visited.insert(source.as_ref()) {
                    found.push(Arc::clone(source));
                    queue.push_back(source.as_ref());
                }
            }
        }

        found
    }

    /// Check if there's a path from `from` to `to` (BFS)
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        if from == to {
            return true;
        }

        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut queue: VecDeque<&str> = VecDeque::new();

        queue.push_back(from);
        visited.insert(from);

        while let Some(current) = queue.pop_front() {
            for neighbor in self.successors(current) {
                if neighbor.as_ref() == to {
                    return true;
                }
                if visited.insert(neighbor.as_ref()) {
                    queue.push_back(neighbor.as_ref());
                }
            }
        }

        false
    }

    /// First cycle found, as a closed path (`a → b → a` is `[a, b, a]`)
    ///
    /// Three-color DFS with an explicit stack:
    /// - White: unvisited
    /// - Gray: on the current DFS path
    /// - Black: fully processed
    ///
    /// Reaching a Gray node closes a cycle. Diagnostics only: resolution
    /// works on cyclic graphs.
    pub fn find_cycle(&self) -> Option<Vec<Arc<str>>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Color {
            Gray,
            Black,
        }

        let mut colors: FxHashMap<&str, Color> = FxHashMap::default();

        for root in &self.node_ids {
            if colors.contains_key(root.as_ref()) {
                continue;
            }

            // (node, index of the next successor to explore)
            let mut stack: Vec<(&Arc<str>, usize)> = vec![(root, 0)];
            colors.insert(root.as_ref(), Color::Gray);

            while let Some(frame) = stack.last_mut() {
                let (node, next) = *frame;
                let successors = self.successors(node);

                if next >= successors.len() {
                    colors.insert(node.as_ref(), Color::Black);
                    stack.pop();
                    continue;
                }
                frame.1 += 1;

                let child = &successors[next];
                match colors.get(child.as_ref()) {
                    Some(Color::Gray) => {
                        let start = stack
                            .iter()
                            .position(|(n, _)| n.as_ref() == child.as_ref())
                            .unwrap_or(0);
                        let mut cycle: Vec<Arc<str>> =
                            stack[start..].iter().map(|(n, _)| Arc::clone(n)).collect();
                        cycle.push(Arc::clone(child));
                        return Some(cycle);
                    }
                    Some(Color::Black) => {}
                    None => {
                        colors.insert(child.as_ref(), Color::Gray);
                        stack.push((child, 0));
                    }
                }
            }
        }

        None
    }
}
