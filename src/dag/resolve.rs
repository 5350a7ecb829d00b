// src/dag/resolve.rs

//! Identifier / edge resolution.
//!
//! Turns caller-owned elements plus the two extraction functions into an
//! index-based adjacency list that the sorter, the graph and the executor
//! all share. This is the only place that calls the caller's functions, so
//! every later stage works on plain `usize` indices.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::debug;

use crate::errors::{Result, TopoError};

/// Identifiers and resolved dependency indices for a sequence of elements.
#[derive(Debug, Clone)]
pub struct Resolved<ID> {
    ids: Vec<ID>,
    index: HashMap<ID, usize>,
    /// `edges[i]` holds the indices element `i` depends on, in declared order.
    edges: Vec<Vec<usize>>,
}

impl<ID> Resolved<ID>
where
    ID: Eq + Hash + Clone + Debug,
{
    /// Number of resolved elements.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifier of the element at `index`.
    pub fn id(&self, index: usize) -> &ID {
        &self.ids[index]
    }

    pub fn ids(&self) -> &[ID] {
        &self.ids
    }

    /// Position of the element with the given identifier.
    pub fn index_of(&self, id: &ID) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Dependencies of the element at `index`, in the order they were declared.
    pub fn dependencies_of(&self, index: usize) -> &[usize] {
        &self.edges[index]
    }

    /// Debug rendering of an element's identifier, used in error text.
    pub fn describe(&self, index: usize) -> String {
        format!("{:?}", self.ids[index])
    }
}

/// Build the id -> index map and resolve every declared dependency.
///
/// Fails with [`TopoError::ConfigError`] when two elements share an
/// identifier or when an element names a dependency that is not among the
/// elements. Both are structural problems with the caller's data, so nothing
/// is returned partially.
pub fn resolve<T, ID, FI, FE, I>(elements: &[T], id_fn: FI, edges_fn: FE) -> Result<Resolved<ID>>
where
    ID: Eq + Hash + Clone + Debug,
    FI: Fn(&T) -> ID,
    FE: Fn(&T) -> I,
    I: IntoIterator<Item = ID>,
{
    let mut ids = Vec::with_capacity(elements.len());
    let mut index = HashMap::with_capacity(elements.len());

    for (i, element) in elements.iter().enumerate() {
        let id = id_fn(element);
        if let Some(first) = index.insert(id.clone(), i) {
            return Err(TopoError::ConfigError(format!(
                "duplicate identifier {:?} at positions {} and {}",
                id, first, i
            )));
        }
        ids.push(id);
    }

    let mut edges = Vec::with_capacity(elements.len());
    for (i, element) in elements.iter().enumerate() {
        let mut deps = Vec::new();
        for dep in edges_fn(element) {
            match index.get(&dep) {
                Some(&d) => deps.push(d),
                None => {
                    return Err(TopoError::ConfigError(format!(
                        "element {:?} has unknown dependency {:?}",
                        ids[i], dep
                    )));
                }
            }
        }
        edges.push(deps);
    }

    debug!(
        elements = ids.len(),
        edges = edges.iter().map(Vec::len).sum::<usize>(),
        "resolved element identifiers and edges"
    );

    Ok(Resolved { ids, index, edges })
}
