// src/exec/classify.rs

//! Per-node error classification and the joined run error.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::types::CancelReason;

/// Why a node did not produce a result.
///
/// Every variant carries the node's input position and the `Debug` rendering
/// of its identifier so the joined error reads on its own.
#[derive(Debug, Error)]
pub enum NodeError {
    /// A dependency failed or was itself skipped; the task never ran.
    #[error("node[{index}] ({id}) skipped due to upstream error in input[{input}] ({upstream})")]
    UpstreamSkipped {
        index: usize,
        id: String,
        /// Position of the offending dependency in the node's dependency list.
        input: usize,
        upstream: String,
    },

    /// The task function returned an error (or panicked).
    #[error("node[{index}] ({id}) function returned error: {source}")]
    FunctionFailed {
        index: usize,
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The run was cancelled before the task started, or the task returned an
    /// error after the token fired (that error is kept as the source).
    #[error("node[{index}] ({id}) cancelled: {reason}")]
    Cancelled {
        index: usize,
        id: String,
        reason: CancelReason,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Anything the executor could not classify.
    #[error("node[{index}] ({id}) unexpected error: {source}")]
    Unexpected {
        index: usize,
        id: String,
        #[source]
        source: anyhow::Error,
    },
}

impl NodeError {
    pub fn index(&self) -> usize {
        match self {
            NodeError::UpstreamSkipped { index, .. }
            | NodeError::FunctionFailed { index, .. }
            | NodeError::Cancelled { index, .. }
            | NodeError::Unexpected { index, .. } => *index,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            NodeError::UpstreamSkipped { id, .. }
            | NodeError::FunctionFailed { id, .. }
            | NodeError::Cancelled { id, .. }
            | NodeError::Unexpected { id, .. } => id,
        }
    }

    pub fn is_upstream_skip(&self) -> bool {
        matches!(self, NodeError::UpstreamSkipped { .. })
    }

    pub fn is_function_failure(&self) -> bool {
        matches!(self, NodeError::FunctionFailed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, NodeError::Cancelled { .. })
    }

    /// First error of type `E` in this error's source chain.
    pub fn find<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        let mut current = self.source();
        while let Some(err) = current {
            if let Some(found) = err.downcast_ref::<E>() {
                return Some(found);
            }
            current = err.source();
        }
        None
    }
}

/// Every per-node failure of one run, in input order.
#[derive(Debug)]
pub struct RunError {
    failures: Vec<NodeError>,
    cancelled: Option<CancelReason>,
}

impl RunError {
    pub fn new(failures: Vec<NodeError>, cancelled: Option<CancelReason>) -> Self {
        Self { failures, cancelled }
    }

    pub fn failures(&self) -> &[NodeError] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<NodeError> {
        self.failures
    }

    /// The failure recorded for the node at `index`, if any.
    pub fn failure_for(&self, index: usize) -> Option<&NodeError> {
        self.failures.iter().find(|f| f.index() == index)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_some()
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.cancelled
    }

    /// First error of type `E` found in any failure's source chain.
    ///
    /// This is the way to test a joined error for a specific cause: unlike
    /// walking [`StdError::source`], it visits every failed node.
    pub fn find<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.failures.iter().find_map(|f| f.find::<E>())
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return match self.cancelled {
                Some(reason) => write!(f, "{reason}"),
                None => f.write_str("run failed"),
            };
        }
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

/// `source()` is the first failure only, so generic chain walkers see one
/// node. Use [`RunError::find`] or [`RunError::failures`] to search them all.
impl StdError for RunError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.failures.first().map(|f| f as &(dyn StdError + 'static))
    }
}
