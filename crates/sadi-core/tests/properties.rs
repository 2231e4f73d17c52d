//! Property-based tests for negotiation, codecs and the task manager.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;
use sadi_core::domain::vocab::xsd;
use sadi_core::format::{FormatRegistry, negotiate};
use sadi_core::impls::{NTriplesCodec, RdfJsonCodec, TurtleCodec};
use sadi_core::ports::Codec;
use sadi_core::{Entity, Graph, Literal, PollResult, TaskManager, Term, Triple};

// =============================================================================
// Strategies
// =============================================================================

fn iri() -> impl Strategy<Value = Term> {
    "[a-zA-Z0-9_/-]{0,12}(#[a-zA-Z0-9]{0,6})?".prop_map(|path| Term::iri(format!("http://example.org/{path}")))
}

fn blank() -> impl Strategy<Value = Term> {
    "[a-z][a-z0-9]{0,6}".prop_map(Term::blank)
}

fn literal() -> impl Strategy<Value = Term> {
    prop_oneof![
        any::<String>().prop_map(Term::literal),
        (any::<String>(), "[a-z]{2,3}(-[a-z]{2})?")
            .prop_map(|(text, lang)| Term::Literal(Literal::lang(text, lang))),
        any::<i64>().prop_map(|n| Term::Literal(Literal::typed(n.to_string(), xsd::INTEGER))),
        (any::<String>(), "[a-z]{1,8}").prop_map(|(text, local)| {
            Term::Literal(Literal::typed(text, format!("http://example.org/dt/{local}")))
        }),
    ]
}

fn triple() -> impl Strategy<Value = Triple> {
    (
        prop_oneof![iri(), blank()],
        iri(),
        prop_oneof![iri(), blank(), literal()],
    )
        .prop_map(|(s, p, o)| Triple::new(s, p, o))
}

fn graph() -> impl Strategy<Value = Graph> {
    prop::collection::vec(triple(), 0..24).prop_map(Graph::from_iter)
}

/// Headers built from plausible pieces, so matches actually happen.
fn accept_header() -> impl Strategy<Value = String> {
    let range = prop_oneof![
        Just("*/*".to_string()),
        Just("*".to_string()),
        Just("text/*".to_string()),
        Just("application/*".to_string()),
        Just("text/turtle".to_string()),
        Just("text/plain".to_string()),
        Just("application/json".to_string()),
        Just("application/rdf+json".to_string()),
        Just("image/png".to_string()),
        "[a-z]{1,6}/[a-z+*]{1,6}",
    ];
    let quality = prop_oneof![
        Just(String::new()),
        (0u32..=1000).prop_map(|q| format!(";q={}", f64::from(q) / 1000.0)),
        Just(";q=banana".to_string()),
        Just(";q=-3".to_string()),
    ];
    prop::collection::vec((range, quality), 0..6).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(range, q)| format!("{range}{q}"))
            .collect::<Vec<_>>()
            .join(", ")
    })
}

// =============================================================================
// Negotiation
// =============================================================================

proptest! {
    /// Arbitrary text never makes negotiation fail.
    #[test]
    fn prop_negotiation_is_total(header in any::<String>()) {
        let registry = FormatRegistry::standard();
        let picked = negotiate(Some(&header), &registry);
        prop_assert!(picked.is_some());
        let (content_type, _) = picked.unwrap();
        prop_assert!(registry.supported_types().contains(&content_type.token()));
    }

    /// Same header, same registry, same answer.
    #[test]
    fn prop_negotiation_is_deterministic(header in accept_header()) {
        let registry = FormatRegistry::standard();
        let (first, _) = negotiate(Some(&header), &registry).unwrap();
        let (second, _) = negotiate(Some(&header), &registry).unwrap();
        prop_assert_eq!(first, second);
    }

    /// An exact, un-weighted request for a registered type is honoured.
    #[test]
    fn prop_exact_request_is_honoured(idx in 0usize..8, noise in accept_header()) {
        let registry = FormatRegistry::standard();
        let wanted = registry.supported_types()[idx].to_string();
        let header = if noise.is_empty() { wanted.clone() } else { format!("{wanted}, {noise}") };
        let (picked, _) = negotiate(Some(&header), &registry).unwrap();
        prop_assert_eq!(picked.token(), wanted.as_str());
    }
}

// =============================================================================
// Codec round-trip
// =============================================================================

fn round_trip(codec: &dyn Codec, g: &Graph) -> Result<(), TestCaseError> {
    let bytes = codec
        .encode(g)
        .map_err(|e| TestCaseError::fail(format!("encode: {e}")))?;
    let back = codec
        .decode(&bytes, Some(codec.content_type()))
        .map_err(|e| {
            TestCaseError::fail(format!(
                "decode: {e}\n--- document ---\n{}",
                String::from_utf8_lossy(&bytes)
            ))
        })?;
    prop_assert_eq!(&back, g);
    Ok(())
}

proptest! {
    #[test]
    fn prop_turtle_round_trip(g in graph()) {
        round_trip(&TurtleCodec, &g)?;
    }

    #[test]
    fn prop_ntriples_round_trip(g in graph()) {
        round_trip(&NTriplesCodec, &g)?;
    }

    #[test]
    fn prop_rdf_json_round_trip(g in graph()) {
        round_trip(&RdfJsonCodec, &g)?;
    }
}

// =============================================================================
// Task manager
// =============================================================================

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

async fn finished(manager: &TaskManager, id: &sadi_core::TaskId) -> PollResult {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let result = manager.poll(id).await;
            if !result.is_pending() {
                return result;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// N concurrent submissions run exactly N transforms, each once.
    #[test]
    fn prop_each_task_runs_exactly_once(n in 1usize..32) {
        let runs: Arc<Mutex<HashMap<String, usize>>> = Arc::default();
        let manager = TaskManager::default();

        let ids = runtime().block_on(async {
            let submissions = (0..n).map(|i| {
                let manager = manager.clone();
                let runs = Arc::clone(&runs);
                tokio::spawn(async move {
                    let input = Entity::new(Term::iri(format!("http://example.org/e{i}")));
                    manager
                        .submit(input, move |input| async move {
                            *runs
                                .lock()
                                .unwrap()
                                .entry(input.subject().to_string())
                                .or_default() += 1;
                            Ok(input.into_graph())
                        })
                        .await
                })
            });
            let mut ids = Vec::new();
            for handle in futures::future::join_all(submissions).await {
                ids.push(handle.unwrap());
            }
            for id in &ids {
                finished(&manager, id).await;
            }
            ids
        });

        let unique: std::collections::HashSet<_> = ids.iter().collect();
        prop_assert_eq!(unique.len(), n);
        let runs = runs.lock().unwrap();
        prop_assert_eq!(runs.len(), n);
        prop_assert!(runs.values().all(|&count| count == 1));
    }

    /// Pending → Done, and never back.
    #[test]
    fn prop_poll_never_returns_to_pending(delay_ms in 0u64..20, extra_polls in 1usize..5) {
        runtime().block_on(async {
            let manager = TaskManager::default();
            let id = manager
                .submit(Entity::new(Term::blank("x")), move |input| async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Ok(input.into_graph())
                })
                .await;

            let done = finished(&manager, &id).await;
            prop_assert!(matches!(done, PollResult::Done(_)));
            for _ in 0..extra_polls {
                prop_assert_eq!(manager.poll(&id).await, done.clone());
            }
            Ok(())
        })?;
    }
}
