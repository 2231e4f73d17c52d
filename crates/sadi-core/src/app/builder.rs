//! DispatcherBuilder - dispatcher の構築とワイヤリング
//!
//! # Fail-fast
//! - 設定の検証は build() 時に行う
//! - registry が空なら BuildError（negotiation が常に成功する前提を守る）

use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::app::config::ServiceConfig;
use crate::app::dispatcher::Dispatcher;
use crate::app::task_manager::TaskManager;
use crate::error::SadiError;
use crate::format::FormatRegistry;
use crate::ports::{Clock, SystemClock};
use crate::service::Service;

/// Errors raised while wiring a dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("format registry is empty; at least one codec must be registered")]
    EmptyRegistry,

    #[error(transparent)]
    InvalidConfig(#[from] SadiError),
}

/// # 使用例
/// ```ignore
/// let dispatcher = Dispatcher::builder(Arc::new(HelloService::new(Invocation::Sync)))
///     .registry(FormatRegistry::standard())
///     .config(config)
///     .build()?;
/// ```
pub struct DispatcherBuilder {
    service: Arc<dyn Service>,
    registry: Option<Arc<FormatRegistry>>,
    config: ServiceConfig,
    clock: Option<Arc<dyn Clock>>,
    tasks: Option<TaskManager>,
}

impl DispatcherBuilder {
    pub fn new(service: Arc<dyn Service>) -> Self {
        Self {
            service,
            registry: None,
            config: ServiceConfig::default(),
            clock: None,
            tasks: None,
        }
    }

    /// Formats to negotiate over. Defaults to [`FormatRegistry::standard`].
    pub fn registry(mut self, registry: impl Into<Arc<FormatRegistry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Clock for task ids and eviction. Ignored when a task manager is supplied.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Share an existing task manager.
    pub fn task_manager(mut self, tasks: TaskManager) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn build(self) -> Result<Dispatcher, BuildError> {
        self.config.validate()?;

        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(FormatRegistry::standard()));
        if registry.is_empty() {
            return Err(BuildError::EmptyRegistry);
        }

        let tasks = match (self.tasks, self.clock) {
            (Some(tasks), _) => tasks,
            (None, Some(clock)) => TaskManager::new(clock),
            (None, None) => TaskManager::new(Arc::new(SystemClock)),
        };

        let parameters = self.service.parameters();
        if self.config.service_url.is_none() {
            debug!("no service_url configured; task URLs follow the request URL");
        }

        Ok(Dispatcher {
            service: self.service,
            registry,
            config: self.config,
            tasks,
            parameters,
            description: OnceLock::new(),
        })
    }
}
