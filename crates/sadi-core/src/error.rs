use http::StatusCode;
use thiserror::Error;

use crate::domain::TaskId;
use crate::ports::CodecError;

/// Errors of the protocol core.
///
/// 分類と HTTP ステータスの対応:
/// - UnsupportedFormat: クライアントには出さない（既定フォーマットへフォールバック）
/// - Decode: 400（Transformer は呼ばない）
/// - Encode / TransformFailure: 500
/// - TaskNotFound: 404
/// - MethodNotAllowed: 405
#[derive(Debug, Error)]
pub enum SadiError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode request body: {0}")]
    Decode(#[source] CodecError),

    #[error("failed to encode response: {0}")]
    Encode(#[source] CodecError),

    #[error("transform failed for {subject}: {message}")]
    TransformFailure { subject: String, message: String },

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SadiError {
    /// Narrowest status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            SadiError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            SadiError::Decode(_) => StatusCode::BAD_REQUEST,
            SadiError::Encode(_) | SadiError::TransformFailure { .. } | SadiError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            SadiError::TaskNotFound(_) => StatusCode::NOT_FOUND,
            SadiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn task_not_found(id: &TaskId) -> Self {
        SadiError::TaskNotFound(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::decode(SadiError::Decode(CodecError::syntax("boom")), 400)]
    #[case::not_found(SadiError::TaskNotFound("task-x".into()), 404)]
    #[case::method(SadiError::MethodNotAllowed("PUT".into()), 405)]
    #[case::transform(
        SadiError::TransformFailure { subject: "<s>".into(), message: "boom".into() },
        500
    )]
    fn status_codes_are_narrow(#[case] err: SadiError, #[case] expected: u16) {
        assert_eq!(err.status().as_u16(), expected);
    }
}
