//! Cycle types and the typed cycle descriptor.
//!
//! A task declares *how often* it runs either through a typed descriptor or
//! through a raw string payload (`cycle`). The typed descriptor always wins;
//! the raw string is the fallback for tasks built from plain config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use taskloom_core::error::{Result, TaskLoomError};

use crate::task::Task;

/// Kind of recurrence a task declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleType {
    /// Fixed interval between fires, millisecond payload.
    Fixed,
    /// Cron expression, inherently unbounded.
    Cron,
}

impl std::fmt::Display for CycleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CycleType::Fixed => write!(f, "fixed"),
            CycleType::Cron => write!(f, "cron"),
        }
    }
}

/// Fully resolved recurrence rule for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CycleDescriptor {
    Fixed { every: Duration },
    Cron { expression: String },
}

impl CycleDescriptor {
    /// Resolve a task's recurrence rule.
    ///
    /// A typed descriptor on the task takes precedence over the raw `cycle`
    /// string. Without one, FIXED parses `cycle` as a millisecond count and
    /// CRON forwards it verbatim — cron expressions are never validated
    /// here, only by the engine at submission time.
    pub fn resolve(task: &Task) -> Result<Self> {
        if let Some(descriptor) = &task.descriptor {
            descriptor.check_interval(&task.id)?;
            return Ok(descriptor.clone());
        }

        match task.cycle_type {
            CycleType::Fixed => {
                let millis: u64 = task.cycle.trim().parse().map_err(|_| {
                    TaskLoomError::invalid_cycle(format!(
                        "task '{}': cannot parse cycle '{}' as milliseconds",
                        task.id, task.cycle
                    ))
                })?;
                let descriptor = Self::Fixed {
                    every: Duration::from_millis(millis),
                };
                descriptor.check_interval(&task.id)?;
                Ok(descriptor)
            }
            CycleType::Cron => Ok(Self::Cron {
                expression: task.cycle.clone(),
            }),
        }
    }

    /// A zero interval is a configuration error, caught before submission.
    fn check_interval(&self, task_id: &str) -> Result<()> {
        if let Self::Fixed { every } = self {
            if every.is_zero() {
                return Err(TaskLoomError::invalid_cycle(format!(
                    "task '{task_id}': interval must be positive"
                )));
            }
        }
        Ok(())
    }
}
