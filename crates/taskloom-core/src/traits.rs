//! Collaborator traits passed through to running tasks.
//!
//! The timer manager never calls these itself — it only forwards the
//! references into the engine's job metadata so a fired task can resolve
//! collaborators and report failures at execution time.

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, TaskLoomError};

/// By-name lookup into the containing application's object registry.
/// Opaque to the timer core; running tasks downcast what they resolve.
pub trait DependencyResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>>;
}

/// Receives errors raised by a task during execution.
/// The timer core forwards the reference; it never invokes this directly.
pub trait FailureProcessor: Send + Sync {
    fn process(&self, task_id: &str, error: &TaskLoomError);
}

/// Everything a fired task gets handed when it runs.
pub struct TaskContext {
    pub task_id: String,
    pub task_name: String,
    pub resolver: Arc<dyn DependencyResolver>,
    pub failures: Arc<dyn FailureProcessor>,
}

/// The work a task performs each time its trigger fires.
#[async_trait]
pub trait TaskAction: Send + Sync {
    async fn execute(&self, ctx: &TaskContext) -> Result<()>;
}

/// Resolver backed by a plain map. Useful for tests and small embeddings.
#[derive(Default)]
pub struct MapResolver {
    entries: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Arc<dyn Any + Send + Sync>) {
        self.entries.insert(name.into(), value);
    }
}

impl DependencyResolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.entries.get(name).cloned()
    }
}

/// Failure processor that logs and drops.
pub struct LogFailureProcessor;

impl FailureProcessor for LogFailureProcessor {
    fn process(&self, task_id: &str, error: &TaskLoomError) {
        tracing::error!("Task '{}' failed: {}", task_id, error);
    }
}

/// Action that does nothing. Default for tasks built without a body.
pub struct NoopAction;

#[async_trait]
impl TaskAction for NoopAction {
    async fn execute(&self, _ctx: &TaskContext) -> Result<()> {
        Ok(())
    }
}
