//! Codec port - bytes と Graph の相互変換
//!
//! # 設計原則
//! - decode(encode(g)) == g（自分で encode したものは失わずに読める）
//! - blank node のラベルは 1 回の encode/decode の中でだけ保たれる
//! - 片方向しかできない codec は `can_decode` / `can_encode` で申告する

use thiserror::Error;

use crate::domain::Graph;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),

    /// A term the format has no way to write or keep (literal subject, RDF-star, ...).
    #[error("{format} cannot represent {what}")]
    Unsupported { format: &'static str, what: String },
}

impl CodecError {
    pub fn syntax(message: impl Into<String>) -> Self {
        CodecError::Syntax(message.into())
    }

    pub fn unsupported(format: &'static str, what: impl Into<String>) -> Self {
        CodecError::Unsupported {
            format,
            what: what.into(),
        }
    }
}

/// A serialization format.
///
/// # 使用例
/// ```ignore
/// let graph = codec.decode(body, Some("text/turtle"))?;
/// let bytes = codec.encode(&graph)?;
/// ```
pub trait Codec: Send + Sync {
    /// Canonical content type of this format.
    fn content_type(&self) -> &'static str;

    /// Parse `content`. `hint` is the content type the bytes arrived with.
    fn decode(&self, content: &[u8], hint: Option<&str>) -> Result<Graph, CodecError>;

    fn encode(&self, graph: &Graph) -> Result<Vec<u8>, CodecError>;

    fn can_decode(&self) -> bool {
        true
    }

    fn can_encode(&self) -> bool {
        true
    }
}
