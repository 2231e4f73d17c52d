//! N-Triples codec (`application/n-triples`, also served as `text/plain`).

use sophia_api::serializer::{Stringifier, TripleSerializer};
use sophia_turtle::parser::nt;
use sophia_turtle::serializer::nt::NtSerializer;

use crate::domain::Graph;
use crate::impls::rdf_terms;
use crate::ports::{Codec, CodecError};

const FORMAT: &str = "N-Triples";

#[derive(Debug, Clone, Copy, Default)]
pub struct NTriplesCodec;

impl Codec for NTriplesCodec {
    fn content_type(&self) -> &'static str {
        "application/n-triples"
    }

    fn decode(&self, content: &[u8], _hint: Option<&str>) -> Result<Graph, CodecError> {
        let text = std::str::from_utf8(content)?;
        rdf_terms::collect(FORMAT, nt::parse_str(text))
    }

    fn encode(&self, graph: &Graph) -> Result<Vec<u8>, CodecError> {
        let triples = rdf_terms::to_rdf(FORMAT, graph)?;
        let mut serializer = NtSerializer::new_stringifier();
        serializer
            .serialize_graph(&triples)
            .map_err(|err| CodecError::Invalid(format!("N-Triples serializer: {err}")))?;
        Ok(serializer.as_utf8().to_vec())
    }
}
