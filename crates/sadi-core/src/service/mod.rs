//! Service - サービス作者向けの API
//!
//! - **Service**: 変換ロジック（process）と同期／非同期の選択
//! - **ServiceDefinition**: 名前・入出力クラスなどのメタデータ
//! - **describe**: メタデータから記述グラフを組み立てる

pub mod definition;
pub mod description;
pub mod transform;

pub use self::definition::{Invocation, ParameterSpec, ServiceDefinition};
pub use self::description::describe;
pub use self::transform::{Service, TransformError};
