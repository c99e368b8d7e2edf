//! The timer manager — the public face of the component.
//!
//! Registers tasks, translates their cycles, submits them to the execution
//! engine, and keeps the identity → handle registry. It performs no timed
//! firing itself and never blocks on task execution; `add_task` blocks only
//! on the engine submission call.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use taskloom_core::config::TimerConfig;
use taskloom_core::error::{Result, TaskLoomError};
use taskloom_core::traits::{DependencyResolver, FailureProcessor};

use crate::engine::{EngineHandle, ExecutionEngine, JobKey, JobSpec};
use crate::registry::{RegistryEntry, TaskRegistry};
use crate::task::Task;
use crate::trigger;

pub struct TimerManager {
    engine: Arc<dyn ExecutionEngine>,
    resolver: Arc<dyn DependencyResolver>,
    failures: Arc<dyn FailureProcessor>,
    config: TimerConfig,
    registry: Mutex<TaskRegistry>,
}

impl TimerManager {
    pub fn new(
        engine: Arc<dyn ExecutionEngine>,
        resolver: Arc<dyn DependencyResolver>,
        failures: Arc<dyn FailureProcessor>,
    ) -> Self {
        Self::with_config(engine, resolver, failures, TimerConfig::default())
    }

    pub fn with_config(
        engine: Arc<dyn ExecutionEngine>,
        resolver: Arc<dyn DependencyResolver>,
        failures: Arc<dyn FailureProcessor>,
        config: TimerConfig,
    ) -> Self {
        Self {
            engine,
            resolver,
            failures,
            config,
            registry: Mutex::new(TaskRegistry::new()),
        }
    }

    /// Register a task that starts immediately.
    pub async fn add_task(&self, task: Task) -> Result<bool> {
        self.add_task_with_delay(task, Duration::ZERO).await
    }

    /// Register a task whose first fire is delayed by `delay`.
    ///
    /// Duplicate ids and malformed cycles are rejected before any engine
    /// interaction; engine failures are wrapped with the cause preserved and
    /// leave the registry untouched. Returns `Ok(true)` on success — the
    /// boolean is part of the contract, but no rejection path returns
    /// `Ok(false)`.
    pub async fn add_task_with_delay(&self, task: Task, delay: Duration) -> Result<bool> {
        // Duplicate check, submission, and insertion all happen under this
        // lock: two concurrent adds for one id cannot both pass the check.
        let mut registry = self.registry.lock().await;

        if registry.contains(&task.id) {
            return Err(TaskLoomError::duplicate(&task.id));
        }

        let task = Arc::new(task);
        let span = task
            .span
            .clone()
            .unwrap_or_else(|| tracing::info_span!("task", id = %task.id));

        let job = JobSpec {
            key: JobKey {
                name: task.id.clone(),
                group: self.config.group.clone(),
            },
            description: task.name.clone(),
            task: task.clone(),
            resolver: self.resolver.clone(),
            failures: self.failures.clone(),
            span,
        };

        let trigger = trigger::translate(&task, delay, &self.config.group)?;

        let handle = self.engine.submit(job, trigger).await?;
        registry.register(
            task.id.clone(),
            RegistryEntry {
                task: task.clone(),
                handle,
            },
        );

        tracing::debug!("Registered task '{}' ({})", task.id, task.name);
        Ok(true)
    }

    /// Stop a task in the engine and deregister it.
    /// Returns the terminated task, or `None` if the id is unknown.
    pub async fn remove_task(&self, id: &str) -> Result<Option<Arc<Task>>> {
        let mut registry = self.registry.lock().await;

        let Some(handle) = registry.handle(id).cloned() else {
            return Ok(None);
        };

        // Cancel first; on failure the entry stays registered.
        self.engine.cancel(&handle).await?;
        let removed = registry.remove(id).map(|entry| entry.task);

        tracing::debug!("Removed task '{}'", id);
        Ok(removed)
    }

    /// All currently registered tasks.
    pub async fn task_list(&self) -> Vec<Arc<Task>> {
        self.registry.lock().await.list()
    }

    /// Look up a task by identity.
    pub async fn get_task(&self, id: &str) -> Option<Arc<Task>> {
        self.registry.lock().await.get(id)
    }

    /// Number of registered tasks.
    pub async fn task_count(&self) -> usize {
        self.registry.lock().await.len()
    }

    /// Engine handle for a registered task, if any.
    pub async fn engine_handle(&self, id: &str) -> Option<EngineHandle> {
        self.registry.lock().await.handle(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    use taskloom_core::error::EngineError;
    use taskloom_core::traits::{LogFailureProcessor, MapResolver};

    use crate::cycle::CycleType;
    use crate::trigger::{RepeatPolicy, TriggerSchedule, TriggerSpec, TriggerStart};

    /// Engine double: counts calls, records specs, optionally fails.
    #[derive(Default)]
    struct MockEngine {
        submits: AtomicUsize,
        cancels: AtomicUsize,
        fail_submit: AtomicBool,
        last_trigger: StdMutex<Option<TriggerSpec>>,
    }

    #[async_trait]
    impl ExecutionEngine for MockEngine {
        async fn submit(
            &self,
            job: JobSpec,
            trigger: TriggerSpec,
        ) -> std::result::Result<EngineHandle, EngineError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            if self.fail_submit.load(Ordering::SeqCst) {
                return Err(EngineError::Submission("engine down".into()));
            }
            *self.last_trigger.lock().unwrap() = Some(trigger);
            Ok(EngineHandle { job: job.key })
        }

        async fn cancel(&self, _handle: &EngineHandle) -> std::result::Result<(), EngineError> {
            self.cancels.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager_with(engine: Arc<MockEngine>) -> TimerManager {
        TimerManager::new(
            engine,
            Arc::new(MapResolver::new()),
            Arc::new(LogFailureProcessor),
        )
    }

    fn fixed_task(id: &str) -> Task {
        Task::fixed(id, "test task", Duration::from_secs(1), 0)
    }

    #[tokio::test]
    async fn test_add_task_registers_and_submits() {
        let engine = Arc::new(MockEngine::default());
        let manager = manager_with(engine.clone());

        assert!(manager.add_task(fixed_task("t1")).await.unwrap());
        assert_eq!(engine.submits.load(Ordering::SeqCst), 1);
        assert_eq!(manager.task_count().await, 1);

        let handle = manager.engine_handle("t1").await.unwrap();
        assert_eq!(handle.job.name, "t1");
        assert_eq!(handle.job.group, "taskloom-task");
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected_before_engine() {
        let engine = Arc::new(MockEngine::default());
        let manager = manager_with(engine.clone());

        manager.add_task(fixed_task("dup")).await.unwrap();
        let err = manager.add_task(fixed_task("dup")).await.unwrap_err();

        assert!(matches!(err, TaskLoomError::DuplicateTask(_)));
        // Only the first add reached the engine; registry is unchanged.
        assert_eq!(engine.submits.load(Ordering::SeqCst), 1);
        assert_eq!(manager.task_count().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_cycle_never_reaches_engine() {
        let engine = Arc::new(MockEngine::default());
        let manager = manager_with(engine.clone());

        let task = Task::raw("bad", "bad cycle", CycleType::Fixed, "abc", 0);
        let err = manager.add_task(task).await.unwrap_err();

        assert!(matches!(err, TaskLoomError::InvalidCycle(_)));
        assert_eq!(engine.submits.load(Ordering::SeqCst), 0);
        assert_eq!(manager.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_engine_failure_leaves_no_partial_state() {
        let engine = Arc::new(MockEngine::default());
        engine.fail_submit.store(true, Ordering::SeqCst);
        let manager = manager_with(engine.clone());

        let err = manager.add_task(fixed_task("t1")).await.unwrap_err();
        assert!(matches!(err, TaskLoomError::Engine(_)));
        assert_eq!(manager.task_count().await, 0);

        // The id stays available once the engine recovers.
        engine.fail_submit.store(false, Ordering::SeqCst);
        assert!(manager.add_task(fixed_task("t1")).await.unwrap());
        assert_eq!(manager.task_count().await, 1);
    }

    #[tokio::test]
    async fn test_delay_anchors_trigger_start() {
        let engine = Arc::new(MockEngine::default());
        let manager = manager_with(engine.clone());

        let before = chrono::Utc::now();
        manager
            .add_task_with_delay(fixed_task("delayed"), Duration::from_millis(500))
            .await
            .unwrap();
        let after = chrono::Utc::now();

        let trigger = engine.last_trigger.lock().unwrap().clone().unwrap();
        let TriggerStart::At(start) = trigger.start else {
            panic!("expected an anchored start");
        };
        assert!(start >= before + chrono::Duration::milliseconds(500));
        assert!(start <= after + chrono::Duration::milliseconds(500));
    }

    #[tokio::test]
    async fn test_trigger_derived_name_and_group() {
        let engine = Arc::new(MockEngine::default());
        let manager = manager_with(engine.clone());

        manager.add_task(fixed_task("report")).await.unwrap();

        let trigger = engine.last_trigger.lock().unwrap().clone().unwrap();
        assert_eq!(trigger.key.name, "tri_report");
        assert_eq!(trigger.key.group, "taskloom-task");
    }

    #[tokio::test]
    async fn test_typed_duration_translates_to_millis() {
        let engine = Arc::new(MockEngine::default());
        let manager = manager_with(engine.clone());

        let mut task = Task::fixed("typed", "typed", Duration::from_secs(2), 3);
        task.cycle = "999".into(); // stale raw payload must lose

        manager.add_task(task).await.unwrap();

        let trigger = engine.last_trigger.lock().unwrap().clone().unwrap();
        assert_eq!(
            trigger.schedule,
            TriggerSchedule::Interval {
                every_ms: 2000,
                repeat: RepeatPolicy::Count(3)
            }
        );
    }

    #[tokio::test]
    async fn test_cron_submitted_unvalidated() {
        let engine = Arc::new(MockEngine::default());
        let manager = manager_with(engine.clone());

        // Invalid expression: the manager must not reject it locally.
        let task = Task::cron("cronny", "cron task", "definitely broken");
        assert!(manager.add_task(task).await.unwrap());

        let trigger = engine.last_trigger.lock().unwrap().clone().unwrap();
        assert_eq!(
            trigger.schedule,
            TriggerSchedule::Cron {
                expression: "definitely broken".into()
            }
        );
    }

    #[tokio::test]
    async fn test_remove_task_cancels_and_returns() {
        let engine = Arc::new(MockEngine::default());
        let manager = manager_with(engine.clone());

        manager.add_task(fixed_task("gone")).await.unwrap();
        let removed = manager.remove_task("gone").await.unwrap().unwrap();

        assert_eq!(removed.id, "gone");
        assert_eq!(engine.cancels.load(Ordering::SeqCst), 1);
        assert_eq!(manager.task_count().await, 0);

        assert!(manager.remove_task("gone").await.unwrap().is_none());
        // Unknown ids never reach the engine.
        assert_eq!(engine.cancels.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let engine = Arc::new(MockEngine::default());
        let manager = manager_with(engine);

        manager.add_task(fixed_task("a")).await.unwrap();
        manager.add_task(fixed_task("b")).await.unwrap();

        let mut ids: Vec<_> = manager
            .task_list()
            .await
            .iter()
            .map(|t| t.id.clone())
            .collect();
        ids.sort();
        assert_eq!(ids, ["a", "b"]);

        assert_eq!(manager.get_task("a").await.unwrap().id, "a");
        assert!(manager.get_task("c").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_distinct_ids_all_succeed() {
        let engine = Arc::new(MockEngine::default());
        let manager = Arc::new(manager_with(engine.clone()));

        let handles: Vec<_> = (0..100)
            .map(|i| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.add_task(fixed_task(&format!("task-{i}"))).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().unwrap());
        }
        assert_eq!(manager.task_count().await, 100);
        assert_eq!(engine.submits.load(Ordering::SeqCst), 100);
    }

    #[tokio::test]
    async fn test_concurrent_same_id_single_winner() {
        let engine = Arc::new(MockEngine::default());
        let manager = Arc::new(manager_with(engine.clone()));

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.add_task(fixed_task("contested")).await })
            })
            .collect();

        let results = futures::future::join_all(handles).await;
        let mut ok = 0;
        let mut duplicates = 0;
        for result in results {
            match result.unwrap() {
                Ok(true) => ok += 1,
                Ok(false) => panic!("no rejection path returns Ok(false)"),
                Err(TaskLoomError::DuplicateTask(_)) => duplicates += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(ok, 1);
        assert_eq!(duplicates, 19);
        assert_eq!(manager.task_count().await, 1);
        assert_eq!(engine.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_custom_group_from_config() {
        let engine = Arc::new(MockEngine::default());
        let manager = TimerManager::with_config(
            engine.clone(),
            Arc::new(MapResolver::new()),
            Arc::new(LogFailureProcessor),
            TimerConfig {
                group: "reports".into(),
            },
        );

        manager.add_task(fixed_task("t1")).await.unwrap();
        let trigger = engine.last_trigger.lock().unwrap().clone().unwrap();
        assert_eq!(trigger.key.group, "reports");

        let handle = manager.engine_handle("t1").await.unwrap();
        assert_eq!(handle.job.group, "reports");
    }
}
