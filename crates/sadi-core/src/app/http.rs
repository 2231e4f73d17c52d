//! HTTP values - hosting 層から独立したリクエスト／レスポンス
//!
//! dispatcher はこの 2 つの型だけを扱い、axum などへの変換は呼び出し側が行う。

use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, HeaderName};
use http::{HeaderMap, HeaderValue, Method, StatusCode};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// An inbound request, already stripped down to what the protocol needs.
#[derive(Debug, Clone)]
pub struct ServiceRequest {
    pub method: Method,
    /// scheme + authority + path, without the query string.
    pub base_url: String,
    /// Raw query string (no leading `?`).
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ServiceRequest {
    pub fn new(method: Method, base_url: impl Into<String>) -> Self {
        Self {
            method,
            base_url: base_url.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Add a header. Values that are not valid header text are dropped.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.append(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// First value of `key` in the query string. Values are not percent-decoded.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.as_deref()?.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (k == key).then_some(v)
        })
    }
}

/// An outbound response. Every response allows any origin.
#[derive(Debug, Clone)]
pub struct ServiceResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ServiceResponse {
    pub fn new(status: StatusCode) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        Self {
            status,
            headers,
            body: Vec::new(),
        }
    }

    /// Plain-text body, used for every error payload.
    pub fn text(status: StatusCode, message: impl Into<String>) -> Self {
        let mut response = Self::new(status);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
        response.body = message.into().into_bytes();
        response
    }

    /// Encoded graph with its content type.
    pub fn graph(status: StatusCode, content_type: &str, body: Vec<u8>) -> Self {
        let mut response = Self::new(status);
        if let Ok(value) = HeaderValue::from_str(content_type) {
            response.headers.insert(CONTENT_TYPE, value);
        }
        response.body = body;
        response
    }

    /// Set a header; values that are not valid header text are skipped.
    pub fn set_header(&mut self, name: HeaderName, value: &str) -> bool {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
                true
            }
            Err(_) => false,
        }
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_are_split_without_decoding() {
        let req = ServiceRequest::new(Method::GET, "http://localhost/svc")
            .with_query("a=1&task=task-01ARZ3NDEKTSV4RRFFQ69G5FAV&flag");
        assert_eq!(req.query_param("task"), Some("task-01ARZ3NDEKTSV4RRFFQ69G5FAV"));
        assert_eq!(req.query_param("flag"), Some(""));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn every_response_allows_any_origin() {
        let res = ServiceResponse::text(StatusCode::NOT_FOUND, "gone");
        assert_eq!(res.header(&ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));
        assert_eq!(res.header(&CONTENT_TYPE), Some(TEXT_PLAIN));
        assert_eq!(res.body_text(), "gone");
    }
}
