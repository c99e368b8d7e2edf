//! The task data contract.

use std::sync::Arc;
use std::time::Duration;

use taskloom_core::traits::{NoopAction, TaskAction};

use crate::cycle::{CycleDescriptor, CycleType};

/// A caller-defined unit of recurring or cron-scheduled work.
///
/// The timer core never constructs or destroys tasks on its own — it only
/// translates and forwards them. `id` is the registry key and must stay
/// unique and immutable for the task's lifetime; `name` is informational.
#[derive(Clone)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub cycle_type: CycleType,
    /// String-encoded recurrence payload: milliseconds for FIXED, a cron
    /// expression for CRON. Only consulted when `descriptor` is `None`.
    pub cycle: String,
    /// `> 0`: that many additional fires after the first, then stop.
    /// `<= 0`: repeat indefinitely. FIXED only; CRON ignores this.
    pub repeat: i64,
    /// Typed recurrence rule; takes precedence over `cycle` when present.
    pub descriptor: Option<CycleDescriptor>,
    /// Optional logging capability. Without it the manager synthesizes a
    /// span named by the task id.
    pub span: Option<tracing::Span>,
    /// The work performed on each fire.
    pub action: Arc<dyn TaskAction>,
}

impl Task {
    /// Fixed-interval task with a typed duration descriptor.
    pub fn fixed(id: impl Into<String>, name: impl Into<String>, every: Duration, repeat: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cycle_type: CycleType::Fixed,
            cycle: every.as_millis().to_string(),
            repeat,
            descriptor: Some(CycleDescriptor::Fixed { every }),
            span: None,
            action: Arc::new(NoopAction),
        }
    }

    /// Cron task with a typed expression descriptor.
    pub fn cron(id: impl Into<String>, name: impl Into<String>, expression: impl Into<String>) -> Self {
        let expression = expression.into();
        Self {
            id: id.into(),
            name: name.into(),
            cycle_type: CycleType::Cron,
            cycle: expression.clone(),
            repeat: 0,
            descriptor: Some(CycleDescriptor::Cron { expression }),
            span: None,
            action: Arc::new(NoopAction),
        }
    }

    /// Task carrying only the generic string payload, no typed descriptor.
    /// This is what tasks built from plain config look like.
    pub fn raw(
        id: impl Into<String>,
        name: impl Into<String>,
        cycle_type: CycleType,
        cycle: impl Into<String>,
        repeat: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cycle_type,
            cycle: cycle.into(),
            repeat,
            descriptor: None,
            span: None,
            action: Arc::new(NoopAction),
        }
    }

    /// Install the work to perform on each fire.
    pub fn with_action(mut self, action: Arc<dyn TaskAction>) -> Self {
        self.action = action;
        self
    }

    /// Install a task-provided logging span.
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("cycle_type", &self.cycle_type)
            .field("cycle", &self.cycle)
            .field("repeat", &self.repeat)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
