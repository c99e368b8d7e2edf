//! Unified error types for TaskLoom.

use thiserror::Error;

/// Result type alias using TaskLoomError.
pub type Result<T> = std::result::Result<T, TaskLoomError>;

#[derive(Error, Debug)]
pub enum TaskLoomError {
    // Registration errors
    #[error("Duplicate task id: {0}")]
    DuplicateTask(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // Cycle/schedule configuration errors
    #[error("Invalid cycle: {0}")]
    InvalidCycle(String),

    // Engine errors
    #[error("Scheduling failed: {0}")]
    Engine(#[from] EngineError),

    // Task execution errors (reported by running tasks, not the manager)
    #[error("Task execution error: {0}")]
    Execution(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl TaskLoomError {
    pub fn duplicate(id: impl Into<String>) -> Self {
        Self::DuplicateTask(id.into())
    }

    pub fn invalid_cycle(msg: impl Into<String>) -> Self {
        Self::InvalidCycle(msg.into())
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Errors surfaced by an execution engine.
/// Kept separate so the manager can wrap them with the root cause preserved.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Cancel failed: {0}")]
    Cancel(String),

    #[error("Unknown job: {0}")]
    UnknownJob(String),
}
