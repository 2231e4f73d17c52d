//! sadi-core
//!
//! Protocol core for publishing graph-to-graph transformations over HTTP:
//! content negotiation, sync / deferred dispatch, and task polling.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Graph, Term, Entity, TaskId, PollResult）
//! - **ports**: 抽象化レイヤー（Codec, Clock, IdGenerator）
//! - **impls**: Codec の実装（Turtle, N-Triples, RDF/JSON）
//! - **format**: FormatRegistry と Negotiator
//! - **service**: サービス作者向け API（Service trait, ServiceDefinition, description）
//! - **app**: Dispatcher, TaskManager, Reaper, 設定
//! - **error**: エラー型

pub mod app;
pub mod domain;
pub mod error;
pub mod format;
pub mod impls;
pub mod ports;
pub mod service;

pub use app::{Dispatcher, ServiceConfig, ServiceRequest, ServiceResponse, TaskManager};
pub use domain::{Entity, Graph, Literal, PollResult, TaskId, Term, Triple};
pub use error::SadiError;
pub use format::{ContentType, FormatRegistry};
pub use service::{Invocation, ParameterSpec, Service, ServiceDefinition, TransformError};
