// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::dag::DependencyGraph;
use crate::errors::{Result, TopoError};
use crate::types::Op;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TopoError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    validate_task_ops(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TopoError::ConfigError(
            "plan must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.timeout_ms == Some(0) {
        return Err(TopoError::ConfigError(
            "[config].timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_task_ops(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        if task.op == Op::Identity && task.value.is_none() {
            return Err(TopoError::ConfigError(format!(
                "task '{}' uses op \"identity\" but has no `value`",
                name
            )));
        }
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in cfg.task.iter() {
        for dep in task.after.iter() {
            if !cfg.task.contains_key(dep) {
                return Err(TopoError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}

/// Self-references and longer loops both surface as `CycleDetected`.
fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    let entries: Vec<_> = cfg.task.iter().collect();
    DependencyGraph::build(
        &entries,
        |(name, _)| name.to_string(),
        |(_, task)| task.after.clone(),
    )?;
    Ok(())
}
