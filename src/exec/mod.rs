// src/exec/mod.rs

//! Concurrent execution layer.
//!
//! - [`executor`] owns the run: builds the graph, launches one unit per node,
//!   waits for all of them and aggregates the outcome.
//! - [`task_runner`] is the per-node unit and its state machine.
//! - [`signal`] is the per-node completion broadcast children wait on.
//! - [`classify`] turns raw task errors into [`NodeError`]s and joins them.
//! - [`task`] defines the [`TaskFunc`] callers implement.
//! - [`report`] is the per-run result.

pub mod classify;
pub mod executor;
pub mod report;
pub mod signal;
pub mod task;
mod task_runner;

pub use classify::{NodeError, RunError};
pub use executor::{Executor, tasks};
pub use report::RunReport;
pub use signal::NodeSignal;
pub use task::TaskFunc;
pub use tokio_util::sync::CancellationToken;
