//! Ports - 抽象化レイヤー
//!
//! 外部要素（シリアライズ形式、時刻、ID 生成）への interface を定義します。
//! 実装は `impls` にあり、テストでは差し替え可能です。

pub mod clock;
pub mod codec;
pub mod id_generator;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::codec::{Codec, CodecError};
pub use self::id_generator::{IdGenerator, UlidGenerator};
