// src/engine/mod.rs

//! Plan execution: turns a validated plan file into elements and runs them
//! through the executor with the demo [`ops`].

pub mod ops;

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::model::ConfigFile;
use crate::dag::DependencyGraph;
use crate::errors::Result;
use crate::exec::{Executor, RunReport};
use crate::types::Op;

/// One plan task as an executor element. Its identifier is `name`.
#[derive(Debug, Clone)]
pub struct PlanTask {
    pub name: String,
    pub op: Op,
    pub value: Option<i64>,
    pub after: Vec<String>,
    pub delay: Option<Duration>,
    pub message: Option<String>,
}

impl PlanTask {
    pub fn name(&self) -> String {
        self.name.clone()
    }

    pub fn dependencies(&self) -> Vec<String> {
        self.after.clone()
    }
}

/// Elements of a plan, in task-name order.
pub fn plan_tasks(cfg: &ConfigFile) -> Vec<PlanTask> {
    cfg.task
        .iter()
        .map(|(name, tc)| PlanTask {
            name: name.clone(),
            op: tc.op,
            value: tc.value,
            after: tc.after.clone(),
            delay: tc.delay_ms.map(Duration::from_millis),
            message: tc.message.clone(),
        })
        .collect()
}

/// Task names in the order they may execute one after another.
pub fn plan_order(cfg: &ConfigFile) -> Result<Vec<String>> {
    let tasks = plan_tasks(cfg);
    let graph = DependencyGraph::build(&tasks, PlanTask::name, PlanTask::dependencies)?;
    Ok(graph
        .topological_order()
        .iter()
        .map(|&i| tasks[i].name.clone())
        .collect())
}

/// Run every task of the plan.
///
/// `timeout` overrides `[config].timeout_ms`.
pub async fn run_plan(
    cfg: &ConfigFile,
    token: CancellationToken,
    timeout: Option<Duration>,
) -> Result<RunReport<i64>> {
    let tasks = plan_tasks(cfg);
    let timeout = timeout.or(cfg.config.timeout_ms.map(Duration::from_millis));

    info!(tasks = tasks.len(), timeout_ms = timeout.map(|t| t.as_millis() as u64), "running plan");

    let mut executor = Executor::new(token);
    if let Some(timeout) = timeout {
        executor = executor.with_timeout(timeout);
    }

    executor
        .execute(tasks, PlanTask::name, PlanTask::dependencies, ops::evaluate)
        .await
}
