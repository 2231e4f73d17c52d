//! TaskManager - 遅延実行（非同期呼び出し）のライフサイクル管理
//!
//! # 責務
//! - TaskId の発行と Running レコードの登録
//! - 1 task につき worker を 1 つだけ spawn
//! - 完了時に Running → Complete と結果の保存を 1 回のロック内で行う
//! - poll / consume / 集計 / eviction
//!
//! # 並行性
//! - task table は `Arc<tokio::sync::Mutex<_>>`。ロックを保持したまま await しない
//! - worker の失敗（Err と panic の両方）は worker 境界で捕まえ、失敗マーカーとして保存する
//! - Complete は終端。二度目の完了は無視して warn を出す

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::app::status::TaskCounts;
use crate::domain::{Entity, Graph, PollResult, TaskFailure, TaskId, TaskOutcome, TaskState};
use crate::ports::{Clock, IdGenerator, SystemClock, UlidGenerator};
use crate::service::TransformError;

#[derive(Debug)]
struct TaskRecord {
    state: TaskState,
    outcome: Option<TaskOutcome>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    fn running(now: DateTime<Utc>) -> Self {
        Self {
            state: TaskState::Running,
            outcome: None,
            created_at: now,
            completed_at: None,
        }
    }

    fn poll_result(&self) -> PollResult {
        match (&self.state, &self.outcome) {
            (TaskState::Complete, Some(Ok(graph))) => PollResult::Done(graph.clone()),
            (TaskState::Complete, Some(Err(failure))) => PollResult::Failed(failure.clone()),
            _ => PollResult::Pending,
        }
    }
}

#[derive(Debug, Default)]
struct TaskTable {
    records: HashMap<TaskId, TaskRecord>,
}

impl TaskTable {
    /// Running → Complete. Returns how long the task ran, or `None` if it is
    /// unknown or already complete.
    fn complete(
        &mut self,
        id: TaskId,
        outcome: TaskOutcome,
        now: DateTime<Utc>,
    ) -> Option<chrono::Duration> {
        match self.records.get_mut(&id) {
            Some(record) if record.state == TaskState::Running => {
                record.state = TaskState::Complete;
                record.outcome = Some(outcome);
                record.completed_at = Some(now);
                Some(now - record.created_at)
            }
            _ => None,
        }
    }

    fn counts(&self) -> TaskCounts {
        let mut counts = TaskCounts::default();
        for record in self.records.values() {
            match (&record.state, &record.outcome) {
                (TaskState::Running, _) => counts.running += 1,
                (TaskState::Complete, Some(Err(_))) => counts.failed += 1,
                (TaskState::Complete, _) => counts.completed += 1,
            }
        }
        counts
    }
}

/// Owner of all deferred invocations of one dispatcher.
///
/// # 使用例
/// ```ignore
/// let manager = TaskManager::new(Arc::new(SystemClock));
/// let id = manager.submit(entity, |input| async move { Ok(input.into_graph()) }).await;
/// match manager.poll(&id).await { PollResult::Pending => ..., _ => ... }
/// ```
#[derive(Clone)]
pub struct TaskManager {
    table: Arc<Mutex<TaskTable>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl TaskManager {
    /// ULID ids drawn from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let ids = Arc::new(UlidGenerator::new(Arc::clone(&clock)));
        Self::with_id_generator(ids, clock)
    }

    pub fn with_id_generator(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Arc::new(Mutex::new(TaskTable::default())),
            ids,
            clock,
        }
    }

    /// Register a Running task and spawn exactly one worker running `transform(input)`.
    ///
    /// Returns as soon as the worker is spawned.
    pub async fn submit<F, Fut>(&self, input: Entity, transform: F) -> TaskId
    where
        F: FnOnce(Entity) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Graph, TransformError>> + Send + 'static,
    {
        let id = {
            let mut table = self.table.lock().await;
            let id = loop {
                let candidate = self.ids.generate_task_id();
                if !table.records.contains_key(&candidate) {
                    break candidate;
                }
            };
            table.records.insert(id, TaskRecord::running(self.clock.now()));
            id
        };
        info!(task = %id, subject = %input.subject(), "task submitted");

        let manager = self.clone();
        tokio::spawn(async move {
            let result = AssertUnwindSafe(async move { transform(input).await })
                .catch_unwind()
                .await;
            let outcome = match result {
                Ok(Ok(graph)) => Ok(graph),
                Ok(Err(err)) => {
                    warn!(task = %id, error = %err, "transform failed");
                    Err(TaskFailure::new(err.to_string()))
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    warn!(task = %id, panic = %message, "transform panicked");
                    Err(TaskFailure::new(format!("transform panicked: {message}")))
                }
            };
            manager.complete(id, outcome).await;
        });

        id
    }

    /// Store the outcome of `id`. A second completion is ignored.
    pub async fn complete(&self, id: TaskId, outcome: TaskOutcome) -> bool {
        let succeeded = outcome.is_ok();
        let now = self.clock.now();
        let ran_for = self.table.lock().await.complete(id, outcome, now);
        match ran_for {
            Some(ran_for) => {
                info!(task = %id, succeeded, elapsed_ms = ran_for.num_milliseconds(), "task complete");
            }
            None => {
                warn!(task = %id, "ignoring completion of a task that is unknown or already complete");
            }
        }
        ran_for.is_some()
    }

    /// Current status of `id`. Never waits for the worker.
    pub async fn poll(&self, id: &TaskId) -> PollResult {
        let table = self.table.lock().await;
        table
            .records
            .get(id)
            .map_or(PollResult::NotFound, TaskRecord::poll_result)
    }

    /// Like [`poll`](Self::poll), but a finished task is removed once read.
    pub async fn consume(&self, id: &TaskId) -> PollResult {
        let mut table = self.table.lock().await;
        let Some(record) = table.records.get(id) else {
            return PollResult::NotFound;
        };
        if record.state == TaskState::Running {
            return PollResult::Pending;
        }
        table
            .records
            .remove(id)
            .map_or(PollResult::NotFound, |record| record.poll_result())
    }

    pub async fn counts(&self) -> TaskCounts {
        self.table.lock().await.counts()
    }

    /// Remove Complete tasks that finished at least `older_than` ago. Running tasks stay.
    pub async fn evict_completed(&self, older_than: Duration) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(older_than) else {
            return 0;
        };
        let now = self.clock.now();
        let mut table = self.table.lock().await;
        let before = table.records.len();
        table.records.retain(|_, record| match record.completed_at {
            Some(completed_at) => now - completed_at < ttl,
            None => true,
        });
        before - table.records.len()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
