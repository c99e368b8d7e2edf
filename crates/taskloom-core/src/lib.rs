//! # TaskLoom Core
//! Shared foundation for the TaskLoom timer component: error types,
//! configuration, and the collaborator traits a running task needs
//! (dependency resolution, failure reporting, the work itself).

pub mod config;
pub mod error;
pub mod traits;

pub use config::TimerConfig;
pub use error::{EngineError, Result, TaskLoomError};
pub use traits::{
    DependencyResolver, FailureProcessor, LogFailureProcessor, MapResolver, NoopAction,
    TaskAction, TaskContext,
};
