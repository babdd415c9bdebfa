// src/graph/tech_graph.rs

use std::collections::HashMap;

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::errors::ValidationError;
use crate::graph::node::{NodeId, TechNode};

/// Immutable dependency graph over one technology snapshot.
///
/// Node records live in a flat vector in input order; `index` maps ids to
/// positions and `edges` holds the adjacency (edge direction: dep -> node).
/// Nothing holds a reference to another node, so the whole value can be
/// dropped and rebuilt on every snapshot.
#[derive(Debug, Clone)]
pub struct TechGraph {
    nodes: Vec<TechNode>,
    index: HashMap<NodeId, usize>,
    edges: DiGraph<usize, ()>,
    /// Direct dependencies per node, in declaration order, deduplicated.
    deps: Vec<Vec<usize>>,
    /// Direct dependents per node, in input order.
    dependents: Vec<Vec<usize>>,
    /// Dependencies always precede their dependents.
    topo: Vec<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl TechGraph {
    /// Build a graph from a flat node list.
    ///
    /// Fails on duplicate ids, unknown or self dependencies, invalid workload
    /// numbers and dependency cycles. On failure no graph is returned at all.
    pub fn build(nodes: Vec<TechNode>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.node_id.clone(), i).is_some() {
                return Err(ValidationError::DuplicateNode(node.node_id.clone()));
            }
            validate_workload(node)?;
        }

        let mut deps: Vec<Vec<usize>> = Vec::with_capacity(nodes.len());
        for node in nodes.iter() {
            let mut resolved = Vec::with_capacity(node.dependencies.len());
            for dep in node.dependencies.iter() {
                if *dep == node.node_id {
                    return Err(ValidationError::SelfDependency(node.node_id.clone()));
                }
                let dep_idx = *index.get(dep).ok_or_else(|| {
                    ValidationError::UnknownDependency {
                        node: node.node_id.clone(),
                        dependency: dep.clone(),
                    }
                })?;
                if !resolved.contains(&dep_idx) {
                    resolved.push(dep_idx);
                }
            }
            deps.push(resolved);
        }

        let topo = topological_order(&nodes, &deps)?;

        let mut edges = DiGraph::with_capacity(nodes.len(), deps.iter().map(Vec::len).sum());
        for i in 0..nodes.len() {
            edges.add_node(i);
        }
        let mut dependents = vec![Vec::new(); nodes.len()];
        for (node_idx, node_deps) in deps.iter().enumerate() {
            for &dep_idx in node_deps {
                edges.add_edge(NodeIndex::new(dep_idx), NodeIndex::new(node_idx), ());
                dependents[dep_idx].push(node_idx);
            }
        }

        debug!(
            nodes = nodes.len(),
            edges = edges.edge_count(),
            "built technology graph"
        );

        Ok(Self {
            nodes,
            index,
            edges,
            deps,
            dependents,
            topo,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in input order.
    pub fn nodes(&self) -> &[TechNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&TechNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Input position of a node, which is also its layout tie-breaker.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Nodes without dependencies, in input order.
    pub fn roots(&self) -> Vec<&TechNode> {
        self.deps
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_empty())
            .map(|(i, _)| &self.nodes[i])
            .collect()
    }

    /// Nodes listing `id` as a dependency. Empty for unknown ids.
    pub fn dependents_of(&self, id: &str) -> Vec<&TechNode> {
        match self.index.get(id) {
            Some(&i) => self.dependents[i].iter().map(|&d| &self.nodes[d]).collect(),
            None => Vec::new(),
        }
    }

    /// Direct dependencies of `id`. Empty for unknown ids.
    pub fn dependencies_of(&self, id: &str) -> Vec<&TechNode> {
        match self.index.get(id) {
            Some(&i) => self.deps[i].iter().map(|&d| &self.nodes[d]).collect(),
            None => Vec::new(),
        }
    }

    /// Whether `to` can be reached from `from` by following dep -> node
    /// edges. A node reaches itself; unknown ids reach nothing.
    pub fn is_reachable(&self, from: &str, to: &str) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => {
                has_path_connecting(&self.edges, NodeIndex::new(a), NodeIndex::new(b), None)
            }
            _ => false,
        }
    }

    /// Every dependency edge as `(dependency, dependent)`, ordered by the
    /// dependent's input position, then by declaration order.
    pub fn edges(&self) -> impl Iterator<Item = (&TechNode, &TechNode)> {
        self.deps.iter().enumerate().flat_map(move |(node_idx, d)| {
            d.iter()
                .map(move |&dep_idx| (&self.nodes[dep_idx], &self.nodes[node_idx]))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges.edge_count()
    }

    /// Nodes ordered so that every dependency precedes its dependents.
    pub fn topological_order(&self) -> Vec<&TechNode> {
        self.topo.iter().map(|&i| &self.nodes[i]).collect()
    }

    // Index-level accessors for the layout engine.

    pub(crate) fn dep_indices(&self, i: usize) -> &[usize] {
        &self.deps[i]
    }

    pub(crate) fn dependent_indices(&self, i: usize) -> &[usize] {
        &self.dependents[i]
    }

    pub(crate) fn topo_indices(&self) -> &[usize] {
        &self.topo
    }
}

fn validate_workload(node: &TechNode) -> Result<(), ValidationError> {
    let invalid = |detail: String| ValidationError::InvalidWorkload {
        node: node.node_id.clone(),
        detail,
    };

    if !node.base_workload.is_finite() || node.base_workload <= 0.0 {
        return Err(invalid(format!(
            "base_workload must be positive (got {})",
            node.base_workload
        )));
    }
    if !node.invested_work.is_finite() || node.invested_work < 0.0 {
        return Err(invalid(format!(
            "invested_work must be non-negative (got {})",
            node.invested_work
        )));
    }
    Ok(())
}

/// Depth-first post-order over dependencies.
///
/// A node met again while still on the traversal stack closes a cycle; the
/// error carries the cycle path, first node repeated at the end.
fn topological_order(nodes: &[TechNode], deps: &[Vec<usize>]) -> Result<Vec<usize>, ValidationError> {
    let mut marks = vec![Mark::Unvisited; nodes.len()];
    let mut order = Vec::with_capacity(nodes.len());

    for start in 0..nodes.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        // (node, next dependency slot to visit)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        marks[start] = Mark::OnStack;

        while let Some(frame) = stack.last_mut() {
            let (node, slot) = *frame;
            if let Some(&dep) = deps[node].get(slot) {
                frame.1 += 1;
                match marks[dep] {
                    Mark::Unvisited => {
                        marks[dep] = Mark::OnStack;
                        stack.push((dep, 0));
                    }
                    Mark::OnStack => {
                        return Err(cycle_error(nodes, &stack, dep));
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node] = Mark::Done;
                order.push(node);
                stack.pop();
            }
        }
    }

    Ok(order)
}

fn cycle_error(nodes: &[TechNode], stack: &[(usize, usize)], reentered: usize) -> ValidationError {
    // The stack walks dependent -> dependency; report in dep -> node order.
    let start = stack
        .iter()
        .position(|&(n, _)| n == reentered)
        .unwrap_or(0);
    let mut path: Vec<String> = stack[start..]
        .iter()
        .rev()
        .map(|&(n, _)| nodes[n].node_id.clone())
        .collect();
    path.push(path[0].clone());
    ValidationError::DependencyCycle(path)
}
