//! Service trait - サービス作者が実装する変換ロジック
//!
//! # 使用例
//! ```ignore
//! struct Greeter { definition: ServiceDefinition }
//!
//! #[async_trait]
//! impl Service for Greeter {
//!     fn definition(&self) -> &ServiceDefinition { &self.definition }
//!
//!     async fn process(&self, input: Entity, mut output: Entity) -> Result<Entity, TransformError> {
//!         let name = input.literal_value(FOAF_NAME).ok_or(TransformError::missing(FOAF_NAME))?;
//!         output.add(GREETING, Term::literal(format!("Hello, {name}!")));
//!         Ok(output)
//!     }
//! }
//! ```
//!
//! # 失敗の扱い
//! - `Err` を返しても panic しても dispatcher / task manager は落ちない
//! - 同期実行なら 500、非同期なら task に失敗として記録される

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Entity, TaskId};
use crate::service::definition::{Invocation, ParameterSpec, ServiceDefinition};

/// Error returned by [`Service::process`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("input is missing required property <{0}>")]
    MissingProperty(String),

    #[error("{0}")]
    Failed(String),
}

impl TransformError {
    pub fn missing(property: impl Into<String>) -> Self {
        TransformError::MissingProperty(property.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        TransformError::Failed(message.into())
    }
}

/// A data transformation exposed over HTTP.
///
/// # Thread Safety
/// - 1 つのインスタンスを全リクエストと全 worker で共有する（`Arc<dyn Service>`）
#[async_trait]
pub trait Service: Send + Sync + 'static {
    fn definition(&self) -> &ServiceDefinition;

    /// Sync or deferred, decided per input entity.
    fn invocation(&self, _input: &Entity) -> Invocation {
        Invocation::Sync
    }

    /// Derive facts for one input entity.
    ///
    /// `output` already carries the input subject typed with the output class.
    async fn process(&self, input: Entity, output: Entity) -> Result<Entity, TransformError>;

    /// Optional secondary-parameter class. Read once when the dispatcher is built.
    fn parameters(&self) -> Option<ParameterSpec> {
        None
    }

    /// Wait hint for a pending task; `None` uses the configured default.
    fn suggested_wait(&self, _task: &TaskId) -> Option<Duration> {
        None
    }
}
