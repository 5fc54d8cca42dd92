//! Task registry with project-scoped cancellation.
//!
//! A cancel request can arrive before the task it targets exists (the client
//! fires "reset" while the analysis request is still in flight). The registry
//! absorbs that race with a pending-cancellation set: a cancel that finds no
//! task for the project records the project id, and the next task created for
//! it is born cancelled.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Lifecycle state of an analysis task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Work loop is (or may be) running.
    Active,
    /// Cancellation requested; the flag is never unset.
    Cancelled,
    /// Work loop finished normally.
    Completed,
}

/// One unit of backend analysis work tied to a project.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub task_type: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct RegistryState {
    tasks: HashMap<String, Task>,
    pending_cancellations: HashSet<String>,
}

/// Process-wide registry of analysis tasks.
///
/// Both maps are guarded by a single lock; every operation is an O(1)-ish
/// critical section. Holds no persistence — state dies with the process,
/// and so does any in-flight work it was tracking.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    state: Mutex<RegistryState>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap()
    }

    /// Allocate a new task and return its id.
    ///
    /// Consumes a pending cancellation for the project if one exists: the
    /// task is created already cancelled, so a cancel that raced ahead of
    /// task creation still lands exactly once.
    pub fn create(&self, project_id: &str, task_type: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let mut state = self.lock();

        let status = if state.pending_cancellations.remove(project_id) {
            info!(
                task_id = %id,
                project_id = %project_id,
                "pending cancellation consumed, task created cancelled"
            );
            TaskStatus::Cancelled
        } else {
            TaskStatus::Active
        };

        state.tasks.insert(
            id.clone(),
            Task {
                id: id.clone(),
                project_id: project_id.to_string(),
                task_type: task_type.to_string(),
                status,
                created_at: Utc::now(),
            },
        );
        debug!(task_id = %id, project_id = %project_id, task_type = %task_type, "task created");
        id
    }

    /// Cancel one task by id. Returns false when the task is unknown or not
    /// active anymore.
    pub fn cancel(&self, task_id: &str) -> bool {
        let mut state = self.lock();
        match state.tasks.get_mut(task_id) {
            Some(task) if task.status == TaskStatus::Active => {
                task.status = TaskStatus::Cancelled;
                info!(task_id = %task_id, project_id = %task.project_id, "task cancelled");
                true
            }
            _ => false,
        }
    }

    /// Cancel all active tasks for a project and return how many were hit.
    ///
    /// When the project has no tasks at all, a pending cancellation is
    /// recorded instead so that a task created moments later is born
    /// cancelled. A project whose tasks are merely finished gets no pending
    /// entry — that would poison the next legitimate request.
    pub fn cancel_project(&self, project_id: &str) -> usize {
        let mut state = self.lock();

        let mut cancelled = 0;
        let mut known = 0;
        for task in state.tasks.values_mut() {
            if task.project_id != project_id {
                continue;
            }
            known += 1;
            if task.status == TaskStatus::Active {
                task.status = TaskStatus::Cancelled;
                cancelled += 1;
            }
        }

        if cancelled > 0 {
            info!(project_id = %project_id, cancelled, "cancelled active tasks for project");
        } else if known == 0 {
            // Set semantics keep this idempotent under repeated cancels.
            state.pending_cancellations.insert(project_id.to_string());
            info!(project_id = %project_id, "no active tasks, recorded pending cancellation");
        } else {
            debug!(project_id = %project_id, "no active tasks to cancel");
        }

        cancelled
    }

    /// Point-in-time read of a task's cancelled flag.
    ///
    /// The analysis loop polls this between resources; an unknown id reads
    /// as not cancelled.
    pub fn is_cancelled(&self, task_id: &str) -> bool {
        let state = self.lock();
        state
            .tasks
            .get(task_id)
            .is_some_and(|task| task.status == TaskStatus::Cancelled)
    }

    /// Mark a task completed. No-op for a cancelled task: the cancelled
    /// flag is monotonic.
    pub fn complete(&self, task_id: &str) {
        let mut state = self.lock();
        if let Some(task) = state.tasks.get_mut(task_id) {
            if task.status == TaskStatus::Active {
                task.status = TaskStatus::Completed;
                debug!(task_id = %task_id, "task completed");
            }
        }
    }

    /// Snapshot of a task, if known.
    pub fn status(&self, task_id: &str) -> Option<Task> {
        let state = self.lock();
        state.tasks.get(task_id).cloned()
    }

    /// Snapshot of all currently active tasks.
    pub fn active_tasks(&self) -> Vec<Task> {
        let state = self.lock();
        state
            .tasks
            .values()
            .filter(|task| task.status == TaskStatus::Active)
            .cloned()
            .collect()
    }

    /// Drop finished (completed or cancelled) tasks from the registry.
    /// Returns how many entries were removed.
    pub fn sweep_finished(&self) -> usize {
        let mut state = self.lock();
        let before = state.tasks.len();
        state
            .tasks
            .retain(|_, task| task.status == TaskStatus::Active);
        before - state.tasks.len()
    }
}
