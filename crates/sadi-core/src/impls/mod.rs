//! Impls - port の具体実装
//!
//! 現在はシリアライズ形式（Codec）のみ。Turtle / N-Triples は sophia、
//! RDF/JSON は serde_json に任せ、term の変換は rdf_terms にまとめています。
//! Clock / IdGenerator の実装は port と同じファイルに置いています。

pub mod ntriples;
pub mod rdf_json;
pub(crate) mod rdf_terms;
pub mod turtle;

pub use self::ntriples::NTriplesCodec;
pub use self::rdf_json::RdfJsonCodec;
pub use self::turtle::TurtleCodec;
