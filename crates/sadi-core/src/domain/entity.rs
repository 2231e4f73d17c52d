//! Entity - サービスの入出力単位
//!
//! 1 つの subject とそれに付随する facts。
//! 出力 Entity は原則として入力と同じ subject を使う（サービスが新しく発行する場合を除く）。

use super::graph::{Graph, Term, Triple};
use super::vocab::rdf;

/// A subject together with the facts attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    subject: Term,
    graph: Graph,
}

impl Entity {
    /// Empty entity for `subject`.
    pub fn new(subject: Term) -> Self {
        Self {
            subject,
            graph: Graph::new(),
        }
    }

    /// Input entity: `subject` plus its reachable closure in `source`.
    pub fn from_graph(subject: Term, source: &Graph) -> Self {
        let graph = source.reachable_closure(&subject);
        Self { subject, graph }
    }

    /// Fresh output entity that reuses this entity's subject, typed with `class`.
    pub fn output_of(&self, class: &str) -> Self {
        let mut out = Entity::new(self.subject.clone());
        out.add_type(class);
        out
    }

    pub fn subject(&self) -> &Term {
        &self.subject
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Assert `(subject, predicate, object)`.
    pub fn add(&mut self, predicate: &str, object: Term) -> &mut Self {
        self.graph.insert(Triple::new(
            self.subject.clone(),
            Term::iri(predicate),
            object,
        ));
        self
    }

    pub fn add_type(&mut self, class: &str) -> &mut Self {
        self.add(rdf::TYPE, Term::iri(class))
    }

    /// Assert an arbitrary fact (e.g. about a blank node hanging off the subject).
    pub fn add_fact(&mut self, triple: Triple) -> &mut Self {
        self.graph.insert(triple);
        self
    }

    /// Values of `predicate` on the subject.
    pub fn values<'a, 'p>(&'a self, predicate: &'p str) -> impl Iterator<Item = &'a Term> {
        self.graph.objects(&self.subject, predicate)
    }

    /// First literal value of `predicate`, if any.
    pub fn literal_value(&self, predicate: &str) -> Option<&str> {
        self.values(predicate)
            .find_map(Term::as_literal)
            .map(|lit| lit.lexical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocab::rdfs;

    #[test]
    fn output_reuses_subject_and_types_it() {
        let subject = Term::iri("http://example.org/jim");
        let input = Entity::new(subject.clone());
        let out = input.output_of("http://example.org/Out");

        assert_eq!(out.subject(), &subject);
        let types: Vec<_> = out.values(rdf::TYPE).collect();
        assert_eq!(types, vec![&Term::iri("http://example.org/Out")]);
    }

    #[test]
    fn literal_value_skips_resources() {
        let mut e = Entity::new(Term::blank("b0"));
        e.add(rdfs::LABEL, Term::iri("http://example.org/not-a-literal"));
        e.add(rdfs::LABEL, Term::literal("label"));
        assert_eq!(e.literal_value(rdfs::LABEL), Some("label"));
        assert_eq!(e.literal_value(rdfs::COMMENT), None);
    }

    #[test]
    fn value_outlives_the_lookup_key() {
        let mut e = Entity::new(Term::iri("http://example.org/jo"));
        e.add("http://example.org/name", Term::literal("Jo"));

        let name = {
            let key = format!("http://example.org/{}", "name");
            e.literal_value(&key)
        };
        assert_eq!(name, Some("Jo"));

        let types = {
            let key = rdf::TYPE.to_string();
            e.values(&key).count()
        };
        assert_eq!(types, 0);
    }
}
