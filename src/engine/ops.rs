// src/engine/ops.rs

//! Demo operations a plan task can perform.

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::engine::PlanTask;
use crate::types::Op;

#[derive(Debug, Error)]
pub enum OpError {
    #[error("task '{task}' failed: {message}")]
    Failed { task: String, message: String },

    #[error("task '{task}' interrupted while waiting")]
    Interrupted { task: String },

    #[error("task '{task}' overflowed computing {op}")]
    Overflow { task: String, op: Op },
}

/// Evaluate one plan task.
///
/// A configured delay is served first and aborts with
/// [`OpError::Interrupted`] if the token fires meanwhile.
pub async fn evaluate(
    task: PlanTask,
    token: CancellationToken,
    inputs: Vec<i64>,
) -> anyhow::Result<i64> {
    if let Some(delay) = task.delay {
        debug!(task = %task.name, delay_ms = delay.as_millis() as u64, "delaying evaluation");
        tokio::select! {
            _ = token.cancelled() => {
                return Err(OpError::Interrupted { task: task.name }.into());
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }

    let value = match task.op {
        Op::Identity => task.value.unwrap_or_default(),
        Op::Sum => inputs
            .iter()
            .try_fold(0i64, |acc, v| acc.checked_add(*v))
            .ok_or_else(|| OpError::Overflow {
                task: task.name.clone(),
                op: task.op,
            })?,
        Op::Product => inputs
            .iter()
            .try_fold(1i64, |acc, v| acc.checked_mul(*v))
            .ok_or_else(|| OpError::Overflow {
                task: task.name.clone(),
                op: task.op,
            })?,
        Op::Fail => {
            return Err(OpError::Failed {
                message: task
                    .message
                    .unwrap_or_else(|| "configured to fail".to_string()),
                task: task.name,
            }
            .into());
        }
    };

    Ok(value)
}
