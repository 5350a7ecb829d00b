// src/dag/graph.rs

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use crate::dag::resolve::{Resolved, resolve};
use crate::dag::sort::order_resolved;
use crate::errors::Result;

/// One element's position in the graph.
///
/// `parents` keeps the declared dependency order (duplicates included) because
/// the executor feeds parent results to the task in exactly that order.
#[derive(Debug, Clone)]
pub struct GraphNode<ID> {
    pub index: usize,
    pub id: ID,
    /// Nodes this node depends on.
    pub parents: Vec<usize>,
    /// Nodes that depend on this node.
    pub children: Vec<usize>,
}

impl<ID> GraphNode<ID> {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// Run-scoped dependency graph, indexed by input position.
///
/// Construction resolves identifiers and checks for cycles first, so a
/// `DependencyGraph` value is always acyclic and every edge points at a node
/// that exists.
#[derive(Debug, Clone)]
pub struct DependencyGraph<ID> {
    nodes: Vec<GraphNode<ID>>,
    roots: Vec<usize>,
    order: Vec<usize>,
    resolved: Resolved<ID>,
}

impl<ID> DependencyGraph<ID>
where
    ID: Eq + Hash + Clone + Debug,
{
    /// Build a graph from caller elements.
    ///
    /// Fails with a configuration error for duplicate or unknown identifiers
    /// and with `CycleDetected` if the dependencies are not acyclic.
    pub fn build<T, FI, FE, I>(elements: &[T], id_fn: FI, edges_fn: FE) -> Result<Self>
    where
        FI: Fn(&T) -> ID,
        FE: Fn(&T) -> I,
        I: IntoIterator<Item = ID>,
    {
        let resolved = resolve(elements, id_fn, edges_fn)?;
        Self::from_resolved(resolved)
    }

    /// Build a graph from already-resolved edges.
    pub fn from_resolved(resolved: Resolved<ID>) -> Result<Self> {
        let order = order_resolved(&resolved)?;

        // First pass: nodes with their dependency lists.
        let mut nodes: Vec<GraphNode<ID>> = (0..resolved.len())
            .map(|i| GraphNode {
                index: i,
                id: resolved.id(i).clone(),
                parents: resolved.dependencies_of(i).to_vec(),
                children: Vec::new(),
            })
            .collect();

        // Second pass: children from parents. A dependency listed twice is
        // still only one child edge.
        for i in 0..nodes.len() {
            let mut seen = HashSet::new();
            for p in resolved.dependencies_of(i) {
                if seen.insert(*p) {
                    nodes[*p].children.push(i);
                }
            }
        }

        let roots = nodes
            .iter()
            .filter(|n| n.is_root())
            .map(|n| n.index)
            .collect();

        Ok(Self {
            nodes,
            roots,
            order,
            resolved,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[GraphNode<ID>] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&GraphNode<ID>> {
        self.nodes.get(index)
    }

    /// Nodes without dependencies, in input order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// A valid execution order (see [`crate::dag::sort`] for tie-breaking).
    pub fn topological_order(&self) -> &[usize] {
        &self.order
    }

    pub fn index_of(&self, id: &ID) -> Option<usize> {
        self.resolved.index_of(id)
    }

    pub fn parents_of(&self, index: usize) -> &[usize] {
        self.nodes
            .get(index)
            .map(|n| n.parents.as_slice())
            .unwrap_or(&[])
    }

    pub fn children_of(&self, index: usize) -> &[usize] {
        self.nodes
            .get(index)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Every node reachable through `children` from `index`, excluding itself,
    /// in ascending index order.
    pub fn descendants_of(&self, index: usize) -> Vec<usize> {
        let mut stack: Vec<usize> = self.children_of(index).to_vec();
        let mut visited: HashSet<usize> = HashSet::new();

        while let Some(n) = stack.pop() {
            if visited.insert(n) {
                stack.extend(self.children_of(n).iter().copied());
            }
        }

        let mut out: Vec<usize> = visited.into_iter().collect();
        out.sort_unstable();
        out
    }

    /// Debug rendering of a node's identifier.
    pub fn describe(&self, index: usize) -> String {
        self.resolved.describe(index)
    }
}
