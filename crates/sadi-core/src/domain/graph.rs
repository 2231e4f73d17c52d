//! Graph - トリプル集合と RDF term
//!
//! サービスが受け取る／返すデータの最小モデルです。
//!
//! # 設計
//! - `Graph` は `BTreeSet<Triple>` を持つ（重複は自動で畳まれる）
//! - 順序付き集合なので iterate / encode の結果が決定的になる
//! - Literal の datatype は常に埋める（plain → xsd:string, 言語タグ付き → rdf:langString）
//!   これで「"x" と "x"^^xsd:string が別物になる」問題を避ける

use std::collections::btree_set;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use super::vocab::{rdf, xsd};

/// A literal value: lexical form plus datatype IRI and optional language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    lexical: String,
    datatype: String,
    language: Option<String>,
}

impl Literal {
    /// Plain string literal (`xsd:string`).
    pub fn string(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: xsd::STRING.to_string(),
            language: None,
        }
    }

    /// Typed literal. A missing datatype means `xsd:string`.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: datatype.into(),
            language: None,
        }
    }

    /// Language-tagged literal (`rdf:langString`). Tags compare lower-cased.
    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: rdf::LANG_STRING.to_string(),
            language: Some(language.into().to_ascii_lowercase()),
        }
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// `true` when the datatype is `xsd:string` (no annotation needed on output).
    pub fn is_simple(&self) -> bool {
        self.language.is_none() && self.datatype == xsd::STRING
    }
}

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(String),
    /// Blank node label, without the `_:` prefix.
    Blank(String),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn blank(label: impl Into<String>) -> Self {
        Term::Blank(label.into())
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Term::Literal(Literal::string(lexical))
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    /// Subjects can only be IRIs or blank nodes.
    pub fn is_resource(&self) -> bool {
        !matches!(self, Term::Literal(_))
    }
}

impl fmt::Display for Term {
    /// N-Triples style rendering, handy for logs and assertion messages.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(label) => write!(f, "_:{label}"),
            Term::Literal(lit) => {
                write!(f, "{:?}", lit.lexical)?;
                match lit.language() {
                    Some(lang) => write!(f, "@{lang}"),
                    None if lit.is_simple() => Ok(()),
                    None => write!(f, "^^<{}>", lit.datatype),
                }
            }
        }
    }
}

/// One fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// An unordered set of triples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one fact. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn add(&mut self, subject: Term, predicate: Term, object: Term) -> bool {
        self.insert(Triple::new(subject, predicate, object))
    }

    /// Union `other` into `self`.
    pub fn merge(&mut self, other: Graph) {
        self.triples.extend(other.triples);
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Triple> {
        self.triples.iter()
    }

    /// All triples whose subject is `subject`.
    pub fn about<'a, 's>(&'a self, subject: &'s Term) -> impl Iterator<Item = &'a Triple> {
        self.triples.iter().filter(move |t| &t.subject == subject)
    }

    /// Objects of `(subject, predicate, ?)`.
    ///
    /// Items borrow from the graph only, so they outlive `subject` and `predicate`.
    pub fn objects<'a, 's, 'p>(
        &'a self,
        subject: &'s Term,
        predicate: &'p str,
    ) -> impl Iterator<Item = &'a Term> {
        self.about(subject)
            .filter(move |t| t.predicate.as_iri() == Some(predicate))
            .map(|t| &t.object)
    }

    /// Distinct subjects typed with `class` (`?s rdf:type <class>`).
    pub fn instances_of(&self, class: &str) -> Vec<Term> {
        let mut out: Vec<Term> = self
            .triples
            .iter()
            .filter(|t| t.predicate.as_iri() == Some(rdf::TYPE) && t.object.as_iri() == Some(class))
            .map(|t| t.subject.clone())
            .collect();
        out.dedup();
        out
    }

    /// Facts reachable from `root` by following resource objects.
    pub fn reachable_closure(&self, root: &Term) -> Graph {
        let mut closure = Graph::new();
        let mut seen: BTreeSet<&Term> = BTreeSet::new();
        let mut queue: VecDeque<&Term> = VecDeque::from([root]);

        while let Some(node) = queue.pop_front() {
            if !seen.insert(node) {
                continue;
            }
            for triple in self.about(node) {
                closure.insert(triple.clone());
                if triple.object.is_resource() {
                    queue.push_back(&triple.object);
                }
            }
        }
        closure
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = btree_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}
