//! # TaskLoom Timer
//!
//! Timer manager for recurring and cron-scheduled tasks.
//! Registers logical tasks, translates their declared cycle into a concrete
//! trigger, and hands the pair to an execution engine that does the firing.
//!
//! ## Architecture
//! ```text
//! TimerManager
//!   ├── TaskRegistry: id → engine handle (at most one per id)
//!   ├── translate(): Task + delay → TriggerSpec
//!   │     ├── FIXED: interval ms + repeat policy
//!   │     └── CRON:  expression, validated by the engine at submit
//!   └── ExecutionEngine (collaborator)
//!         └── TokioEngine: one spawned task per job, sleep-driven
//! ```
//!
//! The manager does no background work of its own — all firing happens in
//! the engine. Its operations are safe under concurrent callers: duplicate
//! detection and registration are a single atomic step.

pub mod cycle;
pub mod engine;
pub mod manager;
pub mod registry;
pub mod task;
pub mod trigger;

pub use cycle::{CycleDescriptor, CycleType};
pub use engine::{EngineHandle, ExecutionEngine, JobKey, JobSpec, TokioEngine};
pub use manager::TimerManager;
pub use registry::{RegistryEntry, TaskRegistry};
pub use task::Task;
pub use trigger::{translate, RepeatPolicy, TriggerKey, TriggerSchedule, TriggerSpec, TriggerStart};
