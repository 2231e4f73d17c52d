//! App - アプリケーションロジック
//!
//! - **dispatcher**: HTTP verb + query → Describe / Process / Poll
//! - **task_manager**: 遅延実行の task table
//! - **reaper_loop**: 完了済み task の定期回収
//! - **builder**: 依存の注入と起動時検証
//! - **config / status / http**: 設定、集計、hosting 非依存の request/response

pub mod builder;
pub mod config;
pub mod dispatcher;
pub mod http;
pub mod reaper_loop;
pub mod status;
pub mod task_manager;

pub use self::builder::{BuildError, DispatcherBuilder};
pub use self::config::ServiceConfig;
pub use self::dispatcher::{DispatchState, Dispatched, Dispatcher, TASK_PARAM, retry_after_secs};
pub use self::http::{ServiceRequest, ServiceResponse};
pub use self::reaper_loop::Reaper;
pub use self::status::TaskCounts;
pub use self::task_manager::TaskManager;
