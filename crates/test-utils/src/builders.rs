use std::collections::BTreeMap;

use topotask::config::{ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
use topotask::types::Op;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                task: BTreeMap::new(),
            },
        }
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.config.config.timeout_ms = Some(ms);
        self
    }

    /// The raw, unvalidated plan.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(op: Op) -> Self {
        Self {
            task: TaskConfig {
                op,
                value: None,
                after: vec![],
                delay_ms: None,
                message: None,
            },
        }
    }

    /// Shorthand for an `identity` task returning `value`.
    pub fn identity(value: i64) -> Self {
        Self::new(Op::Identity).value(value)
    }

    pub fn value(mut self, value: i64) -> Self {
        self.task.value = Some(value);
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.task.delay_ms = Some(ms);
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.task.message = Some(message.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
