//! ContentType - media type token と重み
//!
//! token は小文字化・パラメータ除去済みで保持します（比較は case-insensitive）。

use std::fmt;

/// A media type token (`type/subtype`) with the weight it was chosen at.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentType {
    token: String,
    quality: f32,
}

impl ContentType {
    /// Normalize `raw`: drop parameters, trim, lower-case. Weight is 1.
    pub fn new(raw: &str) -> Self {
        Self {
            token: normalize(raw),
            quality: 1.0,
        }
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// `Content-Type` header value for a textual response.
    pub fn header_value(&self) -> String {
        format!("{}; charset=utf-8", self.token)
    }

    /// Case-insensitive token comparison.
    pub fn matches(&self, other: &str) -> bool {
        self.token == normalize(other)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

pub(crate) fn normalize(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
