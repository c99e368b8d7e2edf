//! In-memory registry: task identity → engine handle.
//!
//! Plain map, no interior locking — the manager guards it with one mutex so
//! duplicate detection and insertion form a single atomic step. Entries are
//! owned until explicitly removed; there is no automatic reclamation, so
//! cancellation must go through `TimerManager::remove_task`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::EngineHandle;
use crate::task::Task;

/// What the registry keeps per task: the task itself and the engine's
/// identifier for the submitted job+trigger pair.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    pub task: Arc<Task>,
    pub handle: EngineHandle,
}

#[derive(Debug, Default)]
pub struct TaskRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Store a mapping. The manager must have already verified absence.
    pub fn register(&mut self, id: impl Into<String>, entry: RegistryEntry) {
        self.entries.insert(id.into(), entry);
    }

    pub fn remove(&mut self, id: &str) -> Option<RegistryEntry> {
        self.entries.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Task>> {
        self.entries.get(id).map(|e| e.task.clone())
    }

    pub fn handle(&self, id: &str) -> Option<&EngineHandle> {
        self.entries.get(id).map(|e| &e.handle)
    }

    pub fn list(&self) -> Vec<Arc<Task>> {
        self.entries.values().map(|e| e.task.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
