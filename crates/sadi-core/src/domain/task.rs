//! Task state - 遅延実行の状態
//!
//! # 状態遷移
//! - running: worker 実行中
//! - complete: 完了（結果 or 失敗マーカーを保持）
//!
//! Running → Complete は一度だけ。Complete から戻ることはない。

use std::fmt;

use super::graph::Graph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Running,
    Complete,
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Running => f.write_str("running"),
            TaskState::Complete => f.write_str("complete"),
        }
    }
}

/// Failure marker stored on a task whose transform returned an error or panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub message: String,
}

impl TaskFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What a worker leaves behind.
pub type TaskOutcome = Result<Graph, TaskFailure>;

/// Answer to a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    /// Finished successfully.
    Done(Graph),
    /// Finished, but the transform failed.
    Failed(TaskFailure),
    /// Still running.
    Pending,
    /// Never issued, evicted, or already consumed.
    NotFound,
}

impl PollResult {
    pub fn is_pending(&self) -> bool {
        matches!(self, PollResult::Pending)
    }
}
