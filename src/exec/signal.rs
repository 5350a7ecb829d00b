// src/exec/signal.rs

//! Per-node state broadcast.
//!
//! Each node owns one [`NodeSignal`]. Its unit publishes every state
//! transition; children wait until the state is terminal. Waiting after the
//! node already finished returns immediately, and the terminal state is
//! published at most once.

use tokio::sync::watch;

use crate::types::NodeState;

#[derive(Debug)]
pub struct NodeSignal {
    tx: watch::Sender<NodeState>,
}

impl NodeSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(NodeState::Initializing);
        Self { tx }
    }

    /// Current state of the node.
    pub fn state(&self) -> NodeState {
        *self.tx.borrow()
    }

    /// Move to a new state. Ignored once the node is terminal.
    ///
    /// Returns `true` if the transition was applied.
    pub fn transition(&self, next: NodeState) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_terminal() {
                false
            } else {
                *state = next;
                true
            }
        })
    }

    /// Wait until the node reaches a terminal state and return it.
    pub async fn completed(&self) -> NodeState {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(|state| state.is_terminal()).await {
            Ok(state) => *state,
            // The sender lives as long as `self`, so this only happens if the
            // channel was torn down underneath us.
            Err(_) => NodeState::Skipped,
        }
    }
}

impl Default for NodeSignal {
    fn default() -> Self {
        Self::new()
    }
}
