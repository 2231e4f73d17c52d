//! RDF/JSON codec (`application/rdf+json`, also served as `application/json`).
//!
//! ```json
//! { "http://e/s": { "http://e/p": [ { "type": "literal", "value": "x", "lang": "en" } ] } }
//! ```
//!
//! Blank nodes are written as `_:label` both as keys and as `bnode` values.
//! On read, `"language"` is accepted as an alias of `"lang"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::vocab::xsd;
use crate::domain::{Graph, Literal, Term, Triple};
use crate::ports::{Codec, CodecError};

type Document = BTreeMap<String, BTreeMap<String, Vec<JsonObject>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ObjectKind {
    Uri,
    Bnode,
    Literal,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonObject {
    #[serde(rename = "type")]
    kind: ObjectKind,
    value: String,
    #[serde(default, alias = "language", skip_serializing_if = "Option::is_none")]
    lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    datatype: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RdfJsonCodec;

impl Codec for RdfJsonCodec {
    fn content_type(&self) -> &'static str {
        "application/rdf+json"
    }

    fn decode(&self, content: &[u8], _hint: Option<&str>) -> Result<Graph, CodecError> {
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Graph::new());
        }
        let document: Document = serde_json::from_slice(content)?;

        let mut graph = Graph::new();
        for (subject, predicates) in document {
            let subject = resource_key(subject);
            for (predicate, objects) in predicates {
                if predicate.starts_with("_:") {
                    return Err(CodecError::Invalid(format!(
                        "blank node {predicate} used as a predicate"
                    )));
                }
                for object in objects {
                    graph.insert(Triple::new(
                        subject.clone(),
                        Term::iri(predicate.clone()),
                        object_term(object)?,
                    ));
                }
            }
        }
        Ok(graph)
    }

    fn encode(&self, graph: &Graph) -> Result<Vec<u8>, CodecError> {
        let mut document = Document::new();
        for triple in graph {
            let Some(predicate) = triple.predicate.as_iri() else {
                return Err(CodecError::Invalid(format!(
                    "predicate {} is not an IRI",
                    triple.predicate
                )));
            };
            document
                .entry(key_of(&triple.subject)?)
                .or_default()
                .entry(predicate.to_string())
                .or_default()
                .push(json_object(&triple.object));
        }
        Ok(serde_json::to_vec_pretty(&document)?)
    }
}

fn resource_key(key: String) -> Term {
    match key.strip_prefix("_:") {
        Some(label) => Term::blank(label),
        None => Term::Iri(key),
    }
}

fn key_of(subject: &Term) -> Result<String, CodecError> {
    match subject {
        Term::Iri(iri) => Ok(iri.clone()),
        Term::Blank(label) => Ok(format!("_:{label}")),
        Term::Literal(_) => Err(CodecError::unsupported(
            "RDF/JSON",
            format!("literal {subject} as a subject"),
        )),
    }
}

fn object_term(object: JsonObject) -> Result<Term, CodecError> {
    match object.kind {
        ObjectKind::Uri => Ok(Term::Iri(object.value)),
        ObjectKind::Bnode => match object.value.strip_prefix("_:") {
            Some(label) => Ok(Term::blank(label)),
            None => Err(CodecError::Invalid(format!(
                "bnode value {:?} must start with _:",
                object.value
            ))),
        },
        ObjectKind::Literal => Ok(Term::Literal(match (object.lang, object.datatype) {
            (Some(lang), _) => Literal::lang(object.value, lang),
            (None, Some(datatype)) => Literal::typed(object.value, datatype),
            (None, None) => Literal::string(object.value),
        })),
    }
}

fn json_object(term: &Term) -> JsonObject {
    match term {
        Term::Iri(iri) => JsonObject {
            kind: ObjectKind::Uri,
            value: iri.clone(),
            lang: None,
            datatype: None,
        },
        Term::Blank(label) => JsonObject {
            kind: ObjectKind::Bnode,
            value: format!("_:{label}"),
            lang: None,
            datatype: None,
        },
        Term::Literal(lit) => JsonObject {
            kind: ObjectKind::Literal,
            value: lit.lexical().to_string(),
            lang: lit.language().map(str::to_string),
            datatype: (lit.language().is_none() && lit.datatype() != xsd::STRING)
                .then(|| lit.datatype().to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn reads_both_lang_spellings() {
        let body = json!({
            "http://e/s": {
                "http://e/p": [
                    { "type": "literal", "value": "a", "lang": "en" },
                    { "type": "literal", "value": "b", "language": "FR" },
                    { "type": "literal", "value": "1", "datatype": xsd::INTEGER },
                    { "type": "bnode", "value": "_:n1" },
                    { "type": "uri", "value": "http://e/o" }
                ]
            }
        });
        let g = RdfJsonCodec
            .decode(body.to_string().as_bytes(), None)
            .unwrap();
        assert_eq!(g.len(), 5);
        let s = Term::iri("http://e/s");
        let objects: Vec<_> = g.objects(&s, "http://e/p").collect();
        assert!(objects.contains(&&Term::Literal(Literal::lang("b", "fr"))));
        assert!(objects.contains(&&Term::blank("n1")));
    }

    #[test]
    fn writes_lang_and_omits_xsd_string() {
        let mut g = Graph::new();
        g.add(Term::blank("s"), Term::iri("http://e/p"), Term::Literal(Literal::lang("a", "en")));
        g.add(Term::blank("s"), Term::iri("http://e/q"), Term::literal("plain"));

        let bytes = RdfJsonCodec.encode(&g).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            json!({
                "_:s": {
                    "http://e/p": [ { "type": "literal", "value": "a", "lang": "en" } ],
                    "http://e/q": [ { "type": "literal", "value": "plain" } ]
                }
            })
        );
        assert_eq!(RdfJsonCodec.decode(&bytes, None).unwrap(), g);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(
            RdfJsonCodec.decode(b"{\"http://e/s\": 3}", None),
            Err(CodecError::Json(_))
        ));
        assert!(matches!(
            RdfJsonCodec.decode(
                br#"{"http://e/s": {"http://e/p": [{"type": "bnode", "value": "x"}]}}"#,
                None
            ),
            Err(CodecError::Invalid(_))
        ));
    }

    #[test]
    fn literal_subjects_cannot_be_written() {
        let mut g = Graph::new();
        g.add(Term::literal("s"), Term::iri("http://e/p"), Term::literal("o"));
        match RdfJsonCodec.encode(&g) {
            Err(err @ CodecError::Unsupported { format: "RDF/JSON", .. }) => {
                assert!(err.to_string().starts_with("RDF/JSON cannot represent literal"), "{err}");
            }
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }

    #[test]
    fn blank_body_is_an_empty_graph() {
        assert!(RdfJsonCodec.decode(b"  \n", None).unwrap().is_empty());
    }
}
