// src/dag/mod.rs

//! Dependency resolution, ordering and graph construction.
//!
//! - [`resolve`] maps identifiers to positions and resolves declared edges.
//! - [`sort`] computes a deterministic topological order and detects cycles.
//! - [`graph`] wires parents/children for the executor.

pub mod graph;
pub mod resolve;
pub mod sort;

pub use graph::{DependencyGraph, GraphNode};
pub use resolve::{Resolved, resolve};
pub use sort::{order_resolved, sort, topological_order};
