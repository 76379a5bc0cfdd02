//! Task dispatch.
//!
//! The dispatcher owns the registered task executors and runs one
//! iteration's task set in the order the router chose. Parallel dispatch
//! spawns every task against the same starting context; sequential dispatch
//! threads each settled outcome into the context of the tasks that follow.
//!
//! Dispatch is total: a panicking task surfaces as a degraded outcome for
//! its kind, and an unregistered kind is skipped with a warning rather than
//! failing the iteration.

use crate::outcome::{Outcome, StageError};
use crate::request::ContentRequest;
use crate::routing::ExecutionOrder;
use crate::tasks::{ContentTask, TaskContext, TaskKind, TaskOutput};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Routes task kinds to their registered executors.
pub struct TaskDispatcher {
    tasks: BTreeMap<TaskKind, Arc<dyn ContentTask>>,
}

impl TaskDispatcher {
    pub fn new() -> Self {
        Self { tasks: BTreeMap::new() }
    }

    /// Registers an executor under its own kind, replacing any previous
    /// registration for that kind.
    pub fn register(&mut self, task: Arc<dyn ContentTask>) {
        self.tasks.insert(task.kind(), task);
    }

    /// Runs the requested kinds and returns one outcome per registered kind.
    pub async fn dispatch(
        &self,
        kinds: &[TaskKind],
        order: ExecutionOrder,
        request: &ContentRequest,
        ctx: TaskContext,
    ) -> BTreeMap<TaskKind, Outcome<TaskOutput>> {
        debug!(count = kinds.len(), order = %order, "Dispatching tasks");
        match order {
            ExecutionOrder::Parallel => self.run_parallel(kinds, request, ctx).await,
            ExecutionOrder::Sequential => self.run_sequential(kinds, request, ctx).await,
        }
    }

    /// Spawns every task against the same starting context. Tasks do not see
    /// each other's results within the iteration; cross-task data flows
    /// between iterations instead.
    async fn run_parallel(
        &self,
        kinds: &[TaskKind],
        request: &ContentRequest,
        ctx: TaskContext,
    ) -> BTreeMap<TaskKind, Outcome<TaskOutput>> {
        let mut spawned = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let Some(task) = self.tasks.get(&kind) else {
                warn!(task = %kind, "No executor registered for task, skipping");
                continue;
            };
            let task = Arc::clone(task);
            let request = request.clone();
            let task_ctx = ctx.clone();
            spawned.push((
                kind,
                tokio::spawn(async move { task.run(&request, &task_ctx).await }),
            ));
        }

        let settled = futures::future::join_all(
            spawned.into_iter().map(|(kind, handle)| async move { (kind, handle.await) }),
        )
        .await;

        let mut outputs = BTreeMap::new();
        for (kind, result) in settled {
            let outcome = match result {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    warn!(task = %kind, error = %join_error, "Task aborted, substituting fallback output");
                    Outcome::Degraded {
                        output: TaskOutput::fallback_for(kind, &ctx),
                        error: StageError::Aborted(join_error.to_string()),
                    }
                }
            };
            outputs.insert(kind, outcome);
        }
        outputs
    }

    /// Runs tasks one at a time, threading each settled outcome into the
    /// context seen by the tasks that follow.
    async fn run_sequential(
        &self,
        kinds: &[TaskKind],
        request: &ContentRequest,
        mut ctx: TaskContext,
    ) -> BTreeMap<TaskKind, Outcome<TaskOutput>> {
        let mut outputs = BTreeMap::new();
        for &kind in kinds {
            let Some(task) = self.tasks.get(&kind) else {
                warn!(task = %kind, "No executor registered for task, skipping");
                continue;
            };
            let outcome = task.run(request, &ctx).await;
            ctx.insert_prior(kind, outcome.clone());
            outputs.insert(kind, outcome);
        }
        outputs
    }
}

impl Default for TaskDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
