//! FormatRegistry - content type → Codec の対応表
//!
//! # 設計
//! - 登録順を保持する（negotiation の最終 tie-break に使う）
//! - 同じ token の再登録は codec だけ差し替え、位置は変えない
//! - 1 つの codec を複数の alias で登録できる（Arc で共有）
//! - 構築後は不変。dispatcher へは Arc で注入する

use std::sync::Arc;

use crate::error::SadiError;
use crate::format::content_type::{ContentType, normalize};
use crate::impls::{NTriplesCodec, RdfJsonCodec, TurtleCodec};
use crate::ports::Codec;

/// Ordered content type → codec table with a default entry.
///
/// # 使用例
/// ```ignore
/// let mut registry = FormatRegistry::new();
/// registry.register("text/turtle", Arc::new(TurtleCodec));
/// let codec = registry.lookup("Text/Turtle")?;
/// ```
#[derive(Clone, Default)]
pub struct FormatRegistry {
    entries: Vec<(String, Arc<dyn Codec>)>,
    default: Option<usize>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turtle (default), N-Triples and RDF/JSON under their usual aliases.
    pub fn standard() -> Self {
        let turtle: Arc<dyn Codec> = Arc::new(TurtleCodec);
        let ntriples: Arc<dyn Codec> = Arc::new(NTriplesCodec);
        let rdf_json: Arc<dyn Codec> = Arc::new(RdfJsonCodec);

        let mut registry = Self::new();
        registry.register("text/turtle", turtle.clone());
        registry.register("application/x-turtle", turtle.clone());
        registry.register("text/n3", turtle.clone());
        // curl -d posts with this content type
        registry.register("application/x-www-form-urlencoded", turtle);
        registry.register("text/plain", ntriples.clone());
        registry.register("application/n-triples", ntriples);
        registry.register("application/json", rdf_json.clone());
        registry.register("application/rdf+json", rdf_json);
        registry
    }

    /// Register `codec` under `content_type`.
    pub fn register(&mut self, content_type: &str, codec: Arc<dyn Codec>) {
        let token = normalize(content_type);
        match self.position(&token) {
            Some(idx) => self.entries[idx].1 = codec,
            None => self.entries.push((token, codec)),
        }
    }

    pub fn lookup(&self, content_type: &str) -> Result<Arc<dyn Codec>, SadiError> {
        let token = normalize(content_type);
        self.position(&token)
            .map(|idx| self.entries[idx].1.clone())
            .ok_or(SadiError::UnsupportedFormat(token))
    }

    /// Make an already registered token the default.
    pub fn set_default(&mut self, content_type: &str) -> Result<(), SadiError> {
        let token = normalize(content_type);
        let idx = self
            .position(&token)
            .ok_or(SadiError::UnsupportedFormat(token))?;
        self.default = Some(idx);
        Ok(())
    }

    /// The explicit default, or the first registered entry.
    ///
    /// `None` only for an empty registry.
    pub fn default_codec(&self) -> Option<(ContentType, Arc<dyn Codec>)> {
        let idx = self.default.unwrap_or(0);
        self.entries
            .get(idx)
            .map(|(token, codec)| (ContentType::new(token), codec.clone()))
    }

    /// Registered tokens in registration order.
    pub fn supported_types(&self) -> Vec<&str> {
        self.entries.iter().map(|(token, _)| token.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &Arc<dyn Codec>)> {
        self.entries.iter().map(|(token, codec)| (token.as_str(), codec))
    }

    fn position(&self, token: &str) -> Option<usize> {
        self.entries.iter().position(|(t, _)| t == token)
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("types", &self.supported_types())
            .field("default", &self.default_codec().map(|(ct, _)| ct))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_order_and_default() {
        let registry = FormatRegistry::standard();
        assert_eq!(
            registry.supported_types(),
            vec![
                "text/turtle",
                "application/x-turtle",
                "text/n3",
                "application/x-www-form-urlencoded",
                "text/plain",
                "application/n-triples",
                "application/json",
                "application/rdf+json",
            ]
        );
        let (ct, codec) = registry.default_codec().unwrap();
        assert_eq!(ct.token(), "text/turtle");
        assert_eq!(codec.content_type(), "text/turtle");
    }

    #[test]
    fn aliases_share_a_codec() {
        let registry = FormatRegistry::standard();
        let a = registry.lookup("text/turtle").unwrap();
        let b = registry.lookup("APPLICATION/X-TURTLE; charset=utf-8").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn lookup_of_unknown_type_is_unsupported() {
        let registry = FormatRegistry::standard();
        assert!(matches!(
            registry.lookup("image/png"),
            Err(SadiError::UnsupportedFormat(t)) if t == "image/png"
        ));
    }

    #[test]
    fn reregistering_keeps_position() {
        let mut registry = FormatRegistry::new();
        registry.register("text/turtle", Arc::new(TurtleCodec));
        registry.register("text/plain", Arc::new(TurtleCodec));
        registry.register("text/turtle", Arc::new(NTriplesCodec));

        assert_eq!(registry.supported_types(), vec!["text/turtle", "text/plain"]);
        assert_eq!(
            registry.lookup("text/turtle").unwrap().content_type(),
            "application/n-triples"
        );
    }

    #[test]
    fn set_default_requires_a_registered_type() {
        let mut registry = FormatRegistry::standard();
        registry.set_default("application/rdf+json").unwrap();
        assert_eq!(registry.default_codec().unwrap().0.token(), "application/rdf+json");
        assert!(registry.set_default("application/rdf+xml").is_err());
        assert!(FormatRegistry::new().default_codec().is_none());
    }
}
