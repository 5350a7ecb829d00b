// src/exec/task_runner.rs

//! One concurrent unit per node.
//!
//! A unit waits for every parent to finish, decides whether its task may run,
//! runs it, stores the result and publishes its terminal state. Whatever path
//! it takes, the terminal state is published before the unit ends, so
//! children never wait on a node that will not finish.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::exec::classify::NodeError;
use crate::exec::signal::NodeSignal;
use crate::exec::task::TaskFunc;
use crate::types::{CancelReason, NodeState};

/// The run's token plus whether the executor's own deadline fired it.
#[derive(Debug, Clone)]
pub(crate) struct RunCancellation {
    pub(crate) token: CancellationToken,
    pub(crate) deadline_hit: Arc<AtomicBool>,
}

impl RunCancellation {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self {
            token,
            deadline_hit: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn reason(&self) -> CancelReason {
        if self.deadline_hit.load(Ordering::SeqCst) {
            CancelReason::DeadlineExceeded
        } else {
            CancelReason::Cancelled
        }
    }

    /// Fire the token on behalf of the deadline.
    pub(crate) fn expire(&self) {
        self.deadline_hit.store(true, Ordering::SeqCst);
        self.token.cancel();
    }
}

/// Result slot and state signal of one node.
///
/// `value` is written once by the owning unit, before `signal` turns `Done`.
#[derive(Debug)]
pub(crate) struct NodeSlot<V> {
    pub(crate) signal: NodeSignal,
    pub(crate) value: OnceLock<V>,
}

impl<V> NodeSlot<V> {
    pub(crate) fn new() -> Self {
        Self {
            signal: NodeSignal::new(),
            value: OnceLock::new(),
        }
    }
}

/// State shared by every unit of a run. Each unit writes only its own slot.
#[derive(Debug)]
pub(crate) struct RunShared<V> {
    pub(crate) slots: Vec<NodeSlot<V>>,
    pub(crate) ids: Vec<String>,
    pub(crate) cancellation: RunCancellation,
}

/// Everything a unit owns.
pub(crate) struct NodeUnit<T, V, F> {
    pub(crate) index: usize,
    pub(crate) element: T,
    /// Parent indices in declared dependency order.
    pub(crate) parents: Vec<usize>,
    pub(crate) shared: Arc<RunShared<V>>,
    pub(crate) task: Arc<F>,
}

/// Publishes `Skipped` if the unit ends without reaching a terminal state
/// (e.g. its future is dropped).
struct CompletionGuard<'a> {
    signal: &'a NodeSignal,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.signal.transition(NodeState::Skipped);
    }
}

/// Drive a single node through its lifecycle.
pub(crate) async fn run_node<T, V, F>(unit: NodeUnit<T, V, F>) -> Result<(), NodeError>
where
    T: Send + 'static,
    V: Clone + Send + Sync + 'static,
    F: TaskFunc<T, V>,
{
    let NodeUnit {
        index,
        element,
        parents,
        shared,
        task,
    } = unit;

    let slot = &shared.slots[index];
    let id = &shared.ids[index];
    let _guard = CompletionGuard {
        signal: &slot.signal,
    };

    slot.signal.transition(NodeState::Waiting);
    debug!(node = index, id = %id, parents = parents.len(), "waiting on parents");

    for &p in &parents {
        shared.slots[p].signal.completed().await;
    }

    let cancellation = &shared.cancellation;
    if cancellation.is_cancelled() {
        let reason = cancellation.reason();
        slot.signal.transition(NodeState::Skipped);
        debug!(node = index, id = %id, %reason, "run cancelled before start; skipping");
        return Err(NodeError::Cancelled {
            index,
            id: id.clone(),
            reason,
            source: None,
        });
    }

    slot.signal.transition(NodeState::Loading);
    let mut inputs = Vec::with_capacity(parents.len());
    for (input, &p) in parents.iter().enumerate() {
        let parent = &shared.slots[p];
        match (parent.signal.state(), parent.value.get()) {
            (NodeState::Done, Some(value)) => inputs.push(value.clone()),
            (state, _) => {
                slot.signal.transition(NodeState::Skipped);
                warn!(
                    node = index,
                    id = %id,
                    upstream = %shared.ids[p],
                    upstream_state = %state,
                    "dependency did not succeed; skipping"
                );
                return Err(NodeError::UpstreamSkipped {
                    index,
                    id: id.clone(),
                    input,
                    upstream: shared.ids[p].clone(),
                });
            }
        }
    }

    slot.signal.transition(NodeState::Running);
    debug!(node = index, id = %id, "running task");

    let token = cancellation.token.clone();
    let outcome = AssertUnwindSafe(async move { task.call(element, token, inputs).await })
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(value)) => {
            // Only this unit writes the slot.
            let _ = slot.value.set(value);
            slot.signal.transition(NodeState::Done);
            debug!(node = index, id = %id, "task done");
            Ok(())
        }
        Ok(Err(err)) => {
            slot.signal.transition(NodeState::Errored);
            if cancellation.is_cancelled() {
                let reason = cancellation.reason();
                warn!(node = index, id = %id, %reason, error = %err, "task returned error after cancellation");
                Err(NodeError::Cancelled {
                    index,
                    id: id.clone(),
                    reason,
                    source: Some(err),
                })
            } else {
                warn!(node = index, id = %id, error = %err, "task returned error");
                Err(NodeError::FunctionFailed {
                    index,
                    id: id.clone(),
                    source: err,
                })
            }
        }
        Err(payload) => {
            slot.signal.transition(NodeState::Errored);
            let message = panic_message(payload.as_ref());
            error!(node = index, id = %id, panic = %message, "task panicked");
            Err(NodeError::FunctionFailed {
                index,
                id: id.clone(),
                source: anyhow::anyhow!("task panicked: {message}"),
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
