// src/exec/report.rs

use crate::exec::classify::{NodeError, RunError};
use crate::types::{CancelReason, NodeState};

/// Outcome of one run, aligned with the caller's element order.
#[derive(Debug)]
pub struct RunReport<V> {
    pub(crate) ids: Vec<String>,
    pub(crate) states: Vec<NodeState>,
    pub(crate) values: Vec<Option<V>>,
    pub(crate) errors: Vec<NodeError>,
    pub(crate) cancelled: Option<CancelReason>,
}

impl<V> RunReport<V> {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// `Debug` rendering of each element's identifier.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Terminal state of every node.
    pub fn states(&self) -> &[NodeState] {
        &self.states
    }

    pub fn state(&self, index: usize) -> Option<NodeState> {
        self.states.get(index).copied()
    }

    /// Result of the node at `index`, if its task succeeded.
    pub fn value(&self, index: usize) -> Option<&V> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Classified errors in element order.
    pub fn errors(&self) -> &[NodeError] {
        &self.errors
    }

    pub fn error_for(&self, index: usize) -> Option<&NodeError> {
        self.errors.iter().find(|e| e.index() == index)
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Set when the run's token had fired by the time every unit finished.
    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.cancelled
    }

    /// All results in element order, or the joined error.
    pub fn into_result(self) -> Result<Vec<V>, RunError> {
        if self.errors.is_empty() {
            // No error means every node reached `Done` and stored a value.
            Ok(self.values.into_iter().flatten().collect())
        } else {
            Err(RunError::new(self.errors, self.cancelled))
        }
    }
}
