//! Execution engine interface and the built-in tokio engine.
//!
//! The engine is where firing actually happens — the timer manager only
//! submits (job, trigger) pairs and keeps handles. `TokioEngine` spawns one
//! tokio task per job and drives it with plain sleeps; cron expressions are
//! parsed (and therefore validated) here, at submission time.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Instrument;

use taskloom_core::error::EngineError;
use taskloom_core::traits::{DependencyResolver, FailureProcessor, TaskContext};

use crate::task::Task;
use crate::trigger::{RepeatPolicy, TriggerSchedule, TriggerSpec, TriggerStart};

/// Identity of a job within the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobKey {
    pub name: String,
    pub group: String,
}

/// Job metadata handed to the engine: the task plus everything a fired
/// execution needs — collaborator references and the per-task span.
#[derive(Clone)]
pub struct JobSpec {
    pub key: JobKey,
    pub description: String,
    pub task: Arc<Task>,
    pub resolver: Arc<dyn DependencyResolver>,
    pub failures: Arc<dyn FailureProcessor>,
    pub span: tracing::Span,
}

impl std::fmt::Debug for JobSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSpec")
            .field("key", &self.key)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// The engine's identifier for a submitted job+trigger pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineHandle {
    pub job: JobKey,
}

/// External scheduling engine consumed by the timer manager.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Schedule a job. Malformed schedules surface here, not earlier.
    async fn submit(
        &self,
        job: JobSpec,
        trigger: TriggerSpec,
    ) -> std::result::Result<EngineHandle, EngineError>;

    /// Stop a previously submitted job.
    async fn cancel(&self, handle: &EngineHandle) -> std::result::Result<(), EngineError>;
}

/// Sleep-driven engine on the tokio runtime. One spawned task per job.
#[derive(Default)]
pub struct TokioEngine {
    jobs: Mutex<HashMap<JobKey, tokio::task::JoinHandle<()>>>,
}

impl TokioEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What a spawned job loop needs to know about its schedule.
enum FirePlan {
    Interval { every: Duration, repeat: RepeatPolicy },
    Cron(cron::Schedule),
}

#[async_trait]
impl ExecutionEngine for TokioEngine {
    async fn submit(
        &self,
        job: JobSpec,
        trigger: TriggerSpec,
    ) -> std::result::Result<EngineHandle, EngineError> {
        let plan = match &trigger.schedule {
            TriggerSchedule::Cron { expression } => {
                let schedule = cron::Schedule::from_str(expression).map_err(|e| {
                    EngineError::InvalidSchedule(format!("'{expression}': {e}"))
                })?;
                FirePlan::Cron(schedule)
            }
            TriggerSchedule::Interval { every_ms, repeat } => {
                if *every_ms == 0 {
                    return Err(EngineError::InvalidSchedule(
                        "interval must be positive".into(),
                    ));
                }
                FirePlan::Interval {
                    every: Duration::from_millis(*every_ms),
                    repeat: *repeat,
                }
            }
        };

        let key = job.key.clone();
        tracing::debug!("Scheduling job '{}' in group '{}'", key.name, key.group);

        let loop_handle = tokio::spawn(run_job(job, trigger.start, plan));
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|e| EngineError::Submission(e.to_string()))?;
        jobs.insert(key.clone(), loop_handle);

        Ok(EngineHandle { job: key })
    }

    async fn cancel(&self, handle: &EngineHandle) -> std::result::Result<(), EngineError> {
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|e| EngineError::Cancel(e.to_string()))?;
        match jobs.remove(&handle.job) {
            Some(loop_handle) => {
                loop_handle.abort();
                tracing::debug!("Cancelled job '{}'", handle.job.name);
                Ok(())
            }
            None => Err(EngineError::UnknownJob(handle.job.name.clone())),
        }
    }
}

async fn run_job(job: JobSpec, start: TriggerStart, plan: FirePlan) {
    if let TriggerStart::At(at) = start {
        let now = Utc::now();
        if at > now {
            if let Ok(wait) = (at - now).to_std() {
                tokio::time::sleep(wait).await;
            }
        }
    }

    match plan {
        FirePlan::Interval { every, repeat } => {
            let mut fired: u64 = 0;
            loop {
                fire(&job).await;
                fired += 1;
                // Count(n) means n additional fires after the first.
                if let RepeatPolicy::Count(extra) = repeat {
                    if fired > u64::from(extra) {
                        break;
                    }
                }
                tokio::time::sleep(every).await;
            }
        }
        FirePlan::Cron(schedule) => {
            loop {
                let Some(next) = schedule.upcoming(Utc).next() else {
                    break;
                };
                let now = Utc::now();
                if next > now {
                    if let Ok(wait) = (next - now).to_std() {
                        tokio::time::sleep(wait).await;
                    }
                }
                fire(&job).await;
            }
        }
    }

    tracing::debug!("Job '{}' finished its schedule", job.key.name);
}

/// One trigger fire: run the task's action inside its span and report any
/// failure to the failure processor. The engine never retries.
async fn fire(job: &JobSpec) {
    let ctx = TaskContext {
        task_id: job.task.id.clone(),
        task_name: job.task.name.clone(),
        resolver: job.resolver.clone(),
        failures: job.failures.clone(),
    };

    let result = job.task.action.execute(&ctx).instrument(job.span.clone()).await;
    if let Err(error) = result {
        tracing::warn!("Task '{}' raised: {}", job.task.id, error);
        job.failures.process(&job.task.id, &error);
    }
}
