// src/dag/sort.rs

//! Topological ordering with cycle detection.
//!
//! Three-colour depth-first search over the resolved edges, driven by an
//! explicit stack of `(node, next dependency)` frames so that long chains do
//! not grow the call stack.
//!
//! Tie-breaking is fixed: roots of the traversal are taken in input order and
//! dependencies are followed in declared order. Sorting an already valid
//! order therefore returns it unchanged.

use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, warn};

use crate::dag::resolve::{Resolved, resolve};
use crate::errors::{Result, TopoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Sort `elements` in place so that every element follows its dependencies.
///
/// On error the slice is left exactly as it was.
pub fn sort<T, ID, FI, FE, I>(elements: &mut [T], id_fn: FI, edges_fn: FE) -> Result<()>
where
    ID: Eq + Hash + Clone + Debug,
    FI: Fn(&T) -> ID,
    FE: Fn(&T) -> I,
    I: IntoIterator<Item = ID>,
{
    let order = topological_order(elements, id_fn, edges_fn)?;
    apply_order(elements, &order);
    Ok(())
}

/// Compute a topological order of `elements` without touching them.
///
/// `order[k]` is the input position of the element that belongs at position `k`.
pub fn topological_order<T, ID, FI, FE, I>(
    elements: &[T],
    id_fn: FI,
    edges_fn: FE,
) -> Result<Vec<usize>>
where
    ID: Eq + Hash + Clone + Debug,
    FI: Fn(&T) -> ID,
    FE: Fn(&T) -> I,
    I: IntoIterator<Item = ID>,
{
    let resolved = resolve(elements, id_fn, edges_fn)?;
    order_resolved(&resolved)
}

/// Topological order over already-resolved edges.
pub fn order_resolved<ID>(resolved: &Resolved<ID>) -> Result<Vec<usize>>
where
    ID: Eq + Hash + Clone + Debug,
{
    let n = resolved.len();
    let mut marks = vec![Mark::Unvisited; n];
    let mut order = Vec::with_capacity(n);
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start in 0..n {
        if marks[start] != Mark::Unvisited {
            continue;
        }
        marks[start] = Mark::InProgress;
        stack.push((start, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            match resolved.dependencies_of(node).get(next) {
                Some(&dep) => {
                    frame.1 += 1;
                    match marks[dep] {
                        Mark::Done => {}
                        Mark::InProgress => {
                            let cycle = cycle_path(resolved, &stack, dep);
                            warn!(cycle = %cycle.join(" -> "), "cycle detected while sorting");
                            return Err(TopoError::CycleDetected { cycle });
                        }
                        Mark::Unvisited => {
                            marks[dep] = Mark::InProgress;
                            stack.push((dep, 0));
                        }
                    }
                }
                None => {
                    stack.pop();
                    marks[node] = Mark::Done;
                    order.push(node);
                }
            }
        }
    }

    debug!(elements = n, "topological order computed");
    Ok(order)
}

/// Identifiers from the first frame of `dep` on the stack to the top, closed
/// with `dep` again.
fn cycle_path<ID>(resolved: &Resolved<ID>, stack: &[(usize, usize)], dep: usize) -> Vec<String>
where
    ID: Eq + Hash + Clone + Debug,
{
    let from = stack.iter().position(|&(n, _)| n == dep).unwrap_or(0);
    stack[from..]
        .iter()
        .map(|&(n, _)| resolved.describe(n))
        .chain(std::iter::once(resolved.describe(dep)))
        .collect()
}

/// Permute `elements` so that position `k` holds the element previously at `order[k]`.
fn apply_order<T>(elements: &mut [T], order: &[usize]) {
    // target[i]: where the element currently at `i` has to go.
    let mut target = vec![0; order.len()];
    for (new, &old) in order.iter().enumerate() {
        target[old] = new;
    }
    for i in 0..elements.len() {
        while target[i] != i {
            let j = target[i];
            elements.swap(i, j);
            target.swap(i, j);
        }
    }
}
