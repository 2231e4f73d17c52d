//! Task identifiers.
//!
//! # ULID ベースの TaskId
//! - 128-bit（うち 80-bit がランダム）なので衝突確率は無視できる
//! - 時刻でソート可能（ログを追いやすい）
//! - 外部には `task-<ULID>` 形式のトークンとして出す（poll URL の `?task=` に載る）

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

const PREFIX: &str = "task-";

/// Identifier of a deferred invocation.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(Ulid);

impl TaskId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl From<Ulid> for TaskId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0)
    }
}

/// A token that is not a `task-<ULID>` string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed task token: {0:?}")]
pub struct MalformedTaskId(pub String);

impl FromStr for TaskId {
    type Err = MalformedTaskId;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        token
            .strip_prefix(PREFIX)
            .and_then(|rest| Ulid::from_string(rest).ok())
            .map(TaskId)
            .ok_or_else(|| MalformedTaskId(token.to_string()))
    }
}
