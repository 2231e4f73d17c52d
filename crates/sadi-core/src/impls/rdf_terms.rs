//! sophia bridge - Graph と sophia の term を相互変換する
//!
//! - 読み込み: sophia の `TripleSource` を流して `Graph` を組み立てる
//! - 書き出し: `Graph` を `[SimpleTerm; 3]` の列にして sophia の serializer に渡す
//! - blank node ラベルのうち Turtle / N-Triples で書けないものは `b{n}` に付け替える
//! - Turtle の入れ子は parser に渡す前に深さを数えて打ち切る

use std::collections::{BTreeSet, HashMap};

use sophia_api::source::{StreamError, TripleSource};
use sophia_api::term::{BnodeId, IriRef, LanguageTag, SimpleTerm, Term as RdfTerm, TermKind};
use sophia_api::triple::Triple as _;

use crate::domain::{Graph, Literal, Term, Triple};
use crate::ports::CodecError;

/// Deepest `(` / `[` nesting accepted in a Turtle document.
pub(crate) const MAX_NESTING: usize = 128;

/// Drain `source` into a [`Graph`].
pub(crate) fn collect<S: TripleSource>(
    format: &'static str,
    mut source: S,
) -> Result<Graph, CodecError> {
    let mut graph = Graph::new();
    source
        .try_for_each_triple(|t| {
            let triple = Triple::new(
                from_rdf(format, t.s())?,
                from_rdf(format, t.p())?,
                from_rdf(format, t.o())?,
            );
            graph.insert(triple);
            Ok::<_, CodecError>(())
        })
        .map_err(|err| match err {
            StreamError::SourceError(err) => CodecError::syntax(err.to_string()),
            StreamError::SinkError(err) => err,
        })?;
    Ok(graph)
}

fn from_rdf<T: RdfTerm>(format: &'static str, term: T) -> Result<Term, CodecError> {
    let converted = match term.kind() {
        TermKind::Iri => term.iri().map(|iri| Term::iri(iri.as_str())),
        TermKind::BlankNode => term.bnode_id().map(|id| Term::blank(id.as_str())),
        TermKind::Literal => term.lexical_form().and_then(|lexical| {
            let lexical: &str = &lexical;
            match term.language_tag() {
                Some(tag) => Some(Literal::lang(lexical, tag.as_str())),
                None => term.datatype().map(|dt| Literal::typed(lexical, dt.as_str())),
            }
            .map(Term::Literal)
        }),
        _ => None,
    };
    converted.ok_or_else(|| CodecError::unsupported(format, format!("{:?} terms", term.kind())))
}

/// `graph` as sophia triples, ready for a serializer.
pub(crate) fn to_rdf<'a>(
    format: &'static str,
    graph: &'a Graph,
) -> Result<Vec<[SimpleTerm<'a>; 3]>, CodecError> {
    let blanks = BlankLabels::new(graph);
    graph
        .iter()
        .map(|triple| {
            let subject = match &triple.subject {
                Term::Literal(_) => {
                    return Err(CodecError::unsupported(
                        format,
                        format!("literal {} as a subject", triple.subject),
                    ));
                }
                other => term(other, &blanks)?,
            };
            let Some(predicate) = triple.predicate.as_iri() else {
                return Err(CodecError::unsupported(
                    format,
                    format!("{} as a predicate", triple.predicate),
                ));
            };
            Ok([subject, iri(predicate)?, term(&triple.object, &blanks)?])
        })
        .collect()
}

fn iri(iri: &str) -> Result<SimpleTerm<'_>, CodecError> {
    IriRef::new(iri.into())
        .map(SimpleTerm::Iri)
        .map_err(|_| CodecError::Invalid(format!("<{iri}> is not a valid IRI")))
}

fn term<'a>(term: &'a Term, blanks: &BlankLabels<'a>) -> Result<SimpleTerm<'a>, CodecError> {
    match term {
        Term::Iri(value) => iri(value),
        Term::Blank(label) => Ok(blanks.term(label)),
        Term::Literal(lit) => literal(lit),
    }
}

fn literal(lit: &Literal) -> Result<SimpleTerm<'_>, CodecError> {
    match lit.language() {
        Some(tag) => LanguageTag::new(tag.into())
            .map(|tag| SimpleTerm::LiteralLanguage(lit.lexical().into(), tag))
            .map_err(|_| CodecError::Invalid(format!("{tag:?} is not a valid language tag"))),
        None => IriRef::new(lit.datatype().into())
            .map(|dt| SimpleTerm::LiteralDatatype(lit.lexical().into(), dt))
            .map_err(|_| CodecError::Invalid(format!("<{}> is not a valid datatype IRI", lit.datatype()))),
    }
}

/// Per-document blank node labels.
///
/// Labels that are valid `BLANK_NODE_LABEL`s are kept as-is. The others get
/// the first free `b{n}`.
struct BlankLabels<'a> {
    renamed: HashMap<&'a str, String>,
}

impl<'a> BlankLabels<'a> {
    fn new(graph: &'a Graph) -> Self {
        let labels: BTreeSet<&str> = graph
            .iter()
            .flat_map(|t| [&t.subject, &t.object])
            .filter_map(|term| match term {
                Term::Blank(label) => Some(label.as_str()),
                _ => None,
            })
            .collect();

        let mut renamed = HashMap::new();
        let mut next = 0usize;
        for label in labels.iter().copied().filter(|l| BnodeId::new(*l).is_err()) {
            let fresh = loop {
                let candidate = format!("b{next}");
                next += 1;
                if !labels.contains(candidate.as_str()) {
                    break candidate;
                }
            };
            renamed.insert(label, fresh);
        }
        Self { renamed }
    }

    fn term(&self, label: &'a str) -> SimpleTerm<'a> {
        match self.renamed.get(label) {
            Some(fresh) => SimpleTerm::BlankNode(BnodeId::new_unchecked(fresh.clone().into())),
            None => SimpleTerm::BlankNode(BnodeId::new_unchecked(label.into())),
        }
    }
}

/// Reject Turtle whose `(` / `[` nesting goes past `limit`.
///
/// IRIs, strings, comments and escapes are skipped; everything else is left
/// to the parser.
pub(crate) fn check_nesting(text: &str, limit: usize) -> Result<(), CodecError> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'#' => i = find(bytes, i, b'\n'),
            b'<' => i = find(bytes, i + 1, b'>'),
            b'\\' => i += 1,
            quote @ (b'"' | b'\'') => {
                i = if bytes[i + 1..].starts_with(&[quote, quote]) {
                    skip_long_string(bytes, i + 3, quote)
                } else {
                    skip_short_string(bytes, i + 1, quote)
                };
            }
            b'(' | b'[' => {
                depth += 1;
                if depth > limit {
                    let (line, column) = position(bytes, i);
                    return Err(CodecError::syntax(format!(
                        "nesting deeper than {limit} levels at line {line}, column {column}"
                    )));
                }
            }
            b')' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    Ok(())
}

fn find(bytes: &[u8], from: usize, needle: u8) -> usize {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|&b| b == needle)
        .map_or(bytes.len(), |offset| from + offset)
}

/// Index of the closing quote (or of the newline that ends an unterminated string).
fn skip_short_string(bytes: &[u8], mut j: usize, quote: u8) -> usize {
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' | b'\r' => return j,
            b if b == quote => return j,
            _ => j += 1,
        }
    }
    bytes.len()
}

/// Index of the last quote of the closing triple.
fn skip_long_string(bytes: &[u8], mut j: usize, quote: u8) -> usize {
    while j < bytes.len() {
        if bytes[j] == b'\\' {
            j += 2;
        } else if bytes[j..].starts_with(&[quote, quote, quote]) {
            return j + 2;
        } else {
            j += 1;
        }
    }
    bytes.len()
}

fn position(bytes: &[u8], index: usize) -> (usize, usize) {
    let before = &bytes[..index];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = match before.iter().rposition(|&b| b == b'\n') {
        Some(newline) => index - newline,
        None => index + 1,
    };
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::flat("<http://e/s> <http://e/p> <http://e/o> .".to_string())]
    #[case::at_limit(format!(
        "<http://e/s> <http://e/p> {}{} .",
        "(".repeat(MAX_NESTING),
        ")".repeat(MAX_NESTING)
    ))]
    #[case::parens_in_string(format!("<http://e/s> <http://e/p> \"{}\" .", "(".repeat(1000)))]
    #[case::parens_in_long_string(format!("<http://e/s> <http://e/p> '''{}''' .", "[".repeat(1000)))]
    #[case::parens_in_comment(format!("# {}\n<http://e/s> <http://e/p> 1 .", "(".repeat(1000)))]
    #[case::parens_in_iri("<http://e/((((> <http://e/p> 1 .".to_string())]
    #[case::escaped_quote(r#"<http://e/s> <http://e/p> "a \" ((" ."#.to_string())]
    fn nesting_within_limit_passes(#[case] text: String) {
        assert!(check_nesting(&text, MAX_NESTING).is_ok());
    }

    #[test]
    fn runaway_nesting_is_a_syntax_error() {
        let text = format!("<http://e/s> <http://e/p>\n  {} .", "(".repeat(2000));
        match check_nesting(&text, MAX_NESTING) {
            Err(CodecError::Syntax(message)) => {
                assert!(message.contains("line 2"), "{message}");
            }
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn unwritable_blank_labels_get_fresh_ones() {
        let mut g = Graph::new();
        g.add(Term::blank("x y"), Term::iri("http://e/p"), Term::blank("b0"));
        g.add(Term::blank("b0"), Term::iri("http://e/p"), Term::literal("kept"));

        let triples = to_rdf("Turtle", &g).unwrap();
        let labels: BTreeSet<String> = triples
            .iter()
            .flat_map(|[s, _, o]| [s, o])
            .filter_map(|t| t.bnode_id().map(|id| id.as_str().to_string()))
            .collect();
        assert_eq!(labels, BTreeSet::from(["b0".to_string(), "b1".to_string()]));
    }

    #[test]
    fn literal_subject_is_unsupported() {
        let mut g = Graph::new();
        g.add(Term::literal("s"), Term::iri("http://e/p"), Term::literal("o"));
        assert!(matches!(
            to_rdf("Turtle", &g),
            Err(CodecError::Unsupported { format: "Turtle", .. })
        ));
    }
}
