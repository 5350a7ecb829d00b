// src/lib.rs

//! Dependency-ordered concurrent task execution.
//!
//! The library core is [`dag`] (identifier resolution, topological sorting,
//! graph construction) and [`exec`] (one concurrent unit per element, parent
//! results flowing to children, classified per-node errors). [`config`],
//! [`engine`], [`cli`] and [`logging`] make up the `topotask` binary, which
//! runs TOML plan files.

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

pub use dag::{DependencyGraph, sort, topological_order};
pub use errors::{Result, TopoError};
pub use exec::{CancellationToken, Executor, NodeError, RunError, RunReport, TaskFunc, tasks};
pub use types::{CancelReason, NodeState};

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::config::model::ConfigFile;
use crate::engine::{plan_order, run_plan};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - plan loading and validation
/// - dry-run output
/// - the executor, with the plan's or the CLI's timeout
/// - Ctrl-C handling (cancels the run's token)
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let cfg = load_and_validate(&args.plan)?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(());
    }

    let token = CancellationToken::new();

    // Ctrl-C → cancel; running tasks observe the token, pending ones are skipped.
    {
        let token = token.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            warn!("Ctrl+C received; cancelling run");
            token.cancel();
        });
    }

    let report = run_plan(&cfg, token, args.timeout_ms.map(Duration::from_millis)).await?;

    for (id, state) in report.ids().iter().zip(report.states()) {
        debug!(task = %id, %state, "final node state");
    }

    let names: Vec<String> = cfg.task.keys().cloned().collect();
    let results = report.into_result().map_err(TopoError::from)?;
    for (name, value) in names.iter().zip(results) {
        println!("{name} = {value}");
    }

    info!(tasks = names.len(), "plan completed");
    Ok(())
}

/// Print tasks, dependencies and the execution order.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    let order = plan_order(cfg)?;

    println!("topotask dry-run");
    if let Some(ms) = cfg.config.timeout_ms {
        println!("  config.timeout_ms = {ms}");
    }
    println!();

    println!("tasks ({}):", cfg.task.len());
    for (name, task) in cfg.task.iter() {
        println!("  - {name}");
        println!("      op: {}", task.op);
        if let Some(value) = task.value {
            println!("      value: {value}");
        }
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
        if let Some(ms) = task.delay_ms {
            println!("      delay_ms: {ms}");
        }
    }
    println!();
    println!("order: {}", order.join(" -> "));

    debug!("dry-run complete (no execution)");
    Ok(())
}
