// src/exec/executor.rs

//! Concurrent, dependency-respecting execution of a task per element.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::{self, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::dag::DependencyGraph;
use crate::errors::{Result, TopoError};
use crate::exec::classify::NodeError;
use crate::exec::report::RunReport;
use crate::exec::task::TaskFunc;
use crate::exec::task_runner::{NodeSlot, NodeUnit, RunCancellation, RunShared, run_node};

/// Runs one unit per element, all launched up front.
///
/// The caller's token is observed through a child token, so cancelling the
/// caller's token stops the run while the executor's own deadline never
/// cancels the caller's token.
///
/// Once the run's token has fired, every node that has not started its task
/// yet is skipped as cancelled, even if all of its parents succeeded. Nodes
/// already running are left to observe the token themselves.
///
/// Dropping a pending `execute` future cancels the run's token and aborts
/// every unit, so no task function starts after the caller gave up.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    token: CancellationToken,
    timeout: Option<Duration>,
}

impl Executor {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            timeout: None,
        }
    }

    /// Cancel the run automatically after `timeout`.
    ///
    /// Nodes cut off this way report [`crate::types::CancelReason::DeadlineExceeded`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve, sort and run `elements`.
    ///
    /// Configuration errors and cycles are returned before anything is
    /// spawned. Per-node failures never make this fail; they are in the report.
    pub async fn execute<T, ID, V, FI, FE, I, F>(
        &self,
        elements: Vec<T>,
        id_fn: FI,
        edges_fn: FE,
        task: F,
    ) -> Result<RunReport<V>>
    where
        T: Send + 'static,
        ID: Eq + Hash + Clone + Debug,
        V: Clone + Send + Sync + 'static,
        FI: Fn(&T) -> ID,
        FE: Fn(&T) -> I,
        I: IntoIterator<Item = ID>,
        F: TaskFunc<T, V>,
    {
        let graph = DependencyGraph::build(&elements, id_fn, edges_fn)?;
        self.execute_graph(&graph, elements, task).await
    }

    /// Run `elements` over a graph that was built from them.
    pub async fn execute_graph<T, ID, V, F>(
        &self,
        graph: &DependencyGraph<ID>,
        elements: Vec<T>,
        task: F,
    ) -> Result<RunReport<V>>
    where
        T: Send + 'static,
        ID: Eq + Hash + Clone + Debug,
        V: Clone + Send + Sync + 'static,
        F: TaskFunc<T, V>,
    {
        if elements.len() != graph.len() {
            return Err(TopoError::ConfigError(format!(
                "graph has {} nodes but {} elements were supplied",
                graph.len(),
                elements.len()
            )));
        }

        let n = graph.len();
        let cancellation = RunCancellation::new(self.token.child_token());
        // Dropping this future cancels the run; the join set aborts the units.
        let run_guard = cancellation.token.clone().drop_guard();
        let shared = Arc::new(RunShared {
            slots: (0..n).map(|_| NodeSlot::new()).collect(),
            ids: (0..n).map(|i| graph.describe(i)).collect(),
            cancellation: cancellation.clone(),
        });

        info!(
            nodes = n,
            roots = graph.roots().len(),
            timeout_ms = self.timeout.map(|t| t.as_millis() as u64),
            "starting run"
        );

        let deadline = self.timeout.map(|t| spawn_deadline(t, cancellation.clone()));

        let task = Arc::new(task);
        let mut units = JoinSet::new();
        let mut unit_index: HashMap<task::Id, usize> = HashMap::with_capacity(n);
        for (index, element) in elements.into_iter().enumerate() {
            let unit = NodeUnit {
                index,
                element,
                parents: graph.parents_of(index).to_vec(),
                shared: Arc::clone(&shared),
                task: Arc::clone(&task),
            };
            let handle = units.spawn(run_node(unit));
            unit_index.insert(handle.id(), index);
        }

        // Single barrier: every unit reaches a terminal state before we look
        // at any slot.
        let mut errors = Vec::new();
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => errors.push(err),
                Err(join_err) => {
                    let index = unit_index[&join_err.id()];
                    warn!(node = index, error = %join_err, "node unit did not complete");
                    errors.push(NodeError::Unexpected {
                        index,
                        id: shared.ids[index].clone(),
                        source: anyhow::Error::new(join_err),
                    });
                }
            }
        }
        errors.sort_by_key(NodeError::index);
        run_guard.disarm();

        if let Some(deadline) = deadline {
            deadline.abort();
        }

        let cancelled = cancellation
            .is_cancelled()
            .then(|| cancellation.reason());

        let report = RunReport {
            ids: shared.ids.clone(),
            states: shared.slots.iter().map(|s| s.signal.state()).collect(),
            values: shared.slots.iter().map(|s| s.value.get().cloned()).collect(),
            errors,
            cancelled,
        };

        if report.is_success() {
            info!(nodes = n, "run finished");
        } else {
            warn!(
                nodes = n,
                failed = report.errors().len(),
                cancelled = ?report.cancel_reason(),
                "run finished with errors"
            );
        }

        Ok(report)
    }
}

/// Fire the run's token after `timeout` unless the run finishes first.
fn spawn_deadline(timeout: Duration, cancellation: RunCancellation) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "run deadline exceeded; cancelling");
                cancellation.expire();
            }
            _ = cancellation.token.cancelled() => {}
        }
    })
}

/// Run `task` for every element and return the results in element order.
///
/// This is the one-call form of [`Executor::execute`]: cycles and
/// configuration problems, as well as any per-node failure, come back as a
/// [`TopoError`].
pub async fn tasks<T, ID, V, FI, FE, I, F>(
    token: CancellationToken,
    elements: Vec<T>,
    id_fn: FI,
    edges_fn: FE,
    task: F,
) -> Result<Vec<V>>
where
    T: Send + 'static,
    ID: Eq + Hash + Clone + Debug,
    V: Clone + Send + Sync + 'static,
    FI: Fn(&T) -> ID,
    FE: Fn(&T) -> I,
    I: IntoIterator<Item = ID>,
    F: TaskFunc<T, V>,
{
    let report = Executor::new(token)
        .execute(elements, id_fn, edges_fn, task)
        .await?;
    Ok(report.into_result()?)
}
