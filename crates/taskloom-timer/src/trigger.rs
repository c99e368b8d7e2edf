//! Schedule translation: Task + delay → engine-facing trigger spec.
//!
//! Pure, no I/O. Configuration problems (unparseable interval, zero
//! interval) fail here, before anything reaches the engine. Cron
//! expressions are forwarded untouched; the engine owns their validation.

use chrono::{DateTime, Utc};
use std::time::Duration;

use taskloom_core::error::{Result, TaskLoomError};

use crate::cycle::CycleDescriptor;
use crate::task::Task;

/// Prefix for trigger names derived from task identity.
pub const TRIGGER_PREFIX: &str = "tri_";

/// Identity of a trigger within the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriggerKey {
    pub name: String,
    pub group: String,
}

/// When the first fire happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerStart {
    Immediately,
    At(DateTime<Utc>),
}

/// How often a fixed-interval trigger repeats after the first fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatPolicy {
    Forever,
    /// Additional fires after the first one.
    Count(u32),
}

/// Engine-facing recurrence rule.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerSchedule {
    Interval { every_ms: u64, repeat: RepeatPolicy },
    Cron { expression: String },
}

/// Fully resolved trigger: identity, start time, recurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSpec {
    pub key: TriggerKey,
    pub start: TriggerStart,
    pub schedule: TriggerSchedule,
}

/// Translate a task's declared cycle into a concrete trigger.
///
/// `delay > 0` anchors the first fire at `now + delay`; zero means start
/// immediately. The trigger is named `tri_` + task id within `group`.
pub fn translate(task: &Task, delay: Duration, group: &str) -> Result<TriggerSpec> {
    let start = if delay.is_zero() {
        TriggerStart::Immediately
    } else {
        let offset = chrono::Duration::from_std(delay).map_err(|e| {
            TaskLoomError::invalid_cycle(format!("task '{}': delay out of range: {e}", task.id))
        })?;
        TriggerStart::At(Utc::now() + offset)
    };

    let schedule = match CycleDescriptor::resolve(task)? {
        CycleDescriptor::Fixed { every } => {
            let repeat = if task.repeat > 0 {
                RepeatPolicy::Count(u32::try_from(task.repeat).unwrap_or(u32::MAX))
            } else {
                RepeatPolicy::Forever
            };
            TriggerSchedule::Interval {
                every_ms: every.as_millis() as u64,
                repeat,
            }
        }
        // Cron schedules are inherently unbounded; `repeat` is ignored.
        CycleDescriptor::Cron { expression } => TriggerSchedule::Cron { expression },
    };

    Ok(TriggerSpec {
        key: TriggerKey {
            name: format!("{TRIGGER_PREFIX}{}", task.id),
            group: group.to_string(),
        },
        start,
        schedule,
    })
}
