//! Turtle codec (`text/turtle`).
//!
//! Parsing and serialization are done by `sophia_turtle`; this module only
//! bounds the input nesting and converts terms through [`rdf_terms`].
//!
//! [`rdf_terms`]: crate::impls::rdf_terms

use sophia_api::serializer::{Stringifier, TripleSerializer};
use sophia_turtle::parser::turtle as turtle_parser;
use sophia_turtle::serializer::turtle::TurtleSerializer;

use crate::domain::Graph;
use crate::impls::rdf_terms::{self, MAX_NESTING};
use crate::ports::{Codec, CodecError};

const FORMAT: &str = "Turtle";

#[derive(Debug, Clone, Copy, Default)]
pub struct TurtleCodec;

impl Codec for TurtleCodec {
    fn content_type(&self) -> &'static str {
        "text/turtle"
    }

    fn decode(&self, content: &[u8], _hint: Option<&str>) -> Result<Graph, CodecError> {
        parse(std::str::from_utf8(content)?)
    }

    fn encode(&self, graph: &Graph) -> Result<Vec<u8>, CodecError> {
        Ok(write(graph)?.into_bytes())
    }
}

/// Parse a Turtle document.
pub fn parse(input: &str) -> Result<Graph, CodecError> {
    rdf_terms::check_nesting(input, MAX_NESTING)?;
    rdf_terms::collect(FORMAT, turtle_parser::parse_str(input))
}

/// Serialize `graph` as Turtle.
pub fn write(graph: &Graph) -> Result<String, CodecError> {
    let triples = rdf_terms::to_rdf(FORMAT, graph)?;
    let mut serializer = TurtleSerializer::new_stringifier();
    serializer
        .serialize_graph(&triples)
        .map_err(|err| CodecError::Invalid(format!("Turtle serializer: {err}")))?;
    Ok(serializer.as_str().to_string())
}
