use std::fmt;

use serde::Deserialize;

/// Lifecycle of a single node during one run.
///
/// `Initializing -> Waiting -> Loading -> Running -> {Done | Errored | Skipped}`.
/// A node may also jump from `Waiting`/`Loading` straight to `Skipped` when
/// the run is cancelled or a parent did not finish with `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeState {
    /// Unit not yet started.
    Initializing,
    /// Waiting for every parent's completion signal.
    Waiting,
    /// Assembling inputs from the parents' result slots.
    Loading,
    /// The task function is executing.
    Running,
    /// The task function returned a value.
    Done,
    /// The task function returned an error (or panicked).
    Errored,
    /// The task function was never invoked.
    Skipped,
}

impl NodeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeState::Done | NodeState::Errored | NodeState::Skipped)
    }
}

impl Default for NodeState {
    fn default() -> Self {
        NodeState::Initializing
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeState::Initializing => "initializing",
            NodeState::Waiting => "waiting",
            NodeState::Loading => "loading",
            NodeState::Running => "running",
            NodeState::Done => "done",
            NodeState::Errored => "errored",
            NodeState::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Why a run's cancellation token fired.
///
/// - `Cancelled`: the caller (or Ctrl-C) cancelled the token.
/// - `DeadlineExceeded`: the executor's own timeout fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    Cancelled,
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Cancelled => f.write_str("run cancelled"),
            CancelReason::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Operation a plan task performs on its inputs.
///
/// - `Identity`: return the task's configured `value`.
/// - `Sum` / `Product`: fold the dependency results.
/// - `Fail`: always return an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Identity,
    Sum,
    Product,
    Fail,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Identity => "identity",
            Op::Sum => "sum",
            Op::Product => "product",
            Op::Fail => "fail",
        };
        f.write_str(s)
    }
}
