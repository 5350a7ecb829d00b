// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::Op;

/// Plan file exactly as deserialized, before validation.
///
/// ```toml
/// [config]
/// timeout_ms = 200
///
/// [task.a]
/// op = "identity"
/// value = 2
///
/// [task.c]
/// op = "sum"
/// after = ["a", "b"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Keys are task names; they are also the element identifiers.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Cancel the whole run after this many milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    pub op: Op,

    /// Output of an `identity` task.
    #[serde(default)]
    pub value: Option<i64>,

    /// Dependencies; their results are passed to this task in this order.
    #[serde(default)]
    pub after: Vec<String>,

    /// Wait this long (cancellably) before evaluating.
    #[serde(default)]
    pub delay_ms: Option<u64>,

    /// Error text for `fail` tasks.
    #[serde(default)]
    pub message: Option<String>,
}

/// A validated plan.
///
/// Only obtainable through `TryFrom<RawConfigFile>`, which checks references,
/// op parameters and acyclicity.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { config, task }
    }
}
