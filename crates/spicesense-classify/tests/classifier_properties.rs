//! End-to-end classifier behaviour with a deterministic stub embedder.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::{array, Array1};
use serde_json::{json, Value};
use spicesense_classify::{
    no_embedder, normalize_text, Record, SpicesClassifier, SCORES_COLUMN, SPICES_COLUMN,
};
use spicesense_core::{Category, ClassifierConfig, Taxonomy, UNCATEGORIZED};
use spicesense_infer::{EmbedderBackend, EmbeddingResult};

/// Embeds known texts from a table and everything else as `default`.
struct StubEmbedder {
    table: HashMap<String, Array1<f32>>,
    default: Array1<f32>,
    calls: AtomicUsize,
}

impl StubEmbedder {
    /// Concept vectors on the first three axes for a three-category taxonomy.
    fn new(default: Array1<f32>) -> Self {
        let mut table = HashMap::new();
        table.insert("volunteer".to_string(), array![1.0, 0.0, 0.0, 0.0]);
        table.insert("bootcamp".to_string(), array![0.0, 1.0, 0.0, 0.0]);
        table.insert("festival".to_string(), array![0.0, 0.0, 1.0, 0.0]);
        Self {
            table,
            default,
            calls: AtomicUsize::new(0),
        }
    }

    fn with(mut self, text: &str, vector: Array1<f32>) -> Self {
        self.table.insert(text.to_string(), vector);
        self
    }
}

impl EmbedderBackend for StubEmbedder {
    fn embed(&self, text: &str) -> Option<EmbeddingResult> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let embedding = self.table.get(text).unwrap_or(&self.default).clone();
        Some(EmbeddingResult {
            embedding,
            cached: false,
        })
    }

    fn dimension(&self) -> usize {
        4
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn taxonomy() -> Taxonomy {
    Taxonomy::new(vec![
        Category::new("Service", ["volunteer"]),
        Category::new("Skill Development", ["bootcamp"]),
        Category::new("Cultural Exploration", ["festival"]),
    ])
    .unwrap()
}

fn semantic_classifier(embedder: StubEmbedder) -> SpicesClassifier {
    SpicesClassifier::new(taxonomy(), Arc::new(embedder), ClassifierConfig::default()).unwrap()
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => panic!("record must be an object"),
    }
}

#[test]
fn test_keyword_match_scores_exactly_one() {
    let classifier = SpicesClassifier::default();
    for category in Taxonomy::spices().iter() {
        for phrase in &category.phrases {
            let scores = classifier.classify("Weekly", &format!("a {} event", phrase));
            assert_eq!(
                scores.get(&category.name),
                Some(1.0),
                "'{}' should trigger {}",
                phrase,
                category.name
            );
        }
    }
}

#[test]
fn test_no_trigger_without_semantic_is_uncategorized() {
    let classifier = SpicesClassifier::keyword_only(taxonomy());
    let scores = classifier.classify("Quiet afternoon", "nothing planned");
    assert_eq!(scores.len(), 1);
    assert_eq!(scores.get(UNCATEGORIZED), Some(0.0));
}

#[test]
fn test_semantic_enabled_with_stub() {
    let classifier = semantic_classifier(StubEmbedder::new(array![0.0, 0.0, 0.0, 1.0]));
    assert!(classifier.semantic_enabled());
    assert_eq!(classifier.embedding_dimension(), Some(4));
}

#[test]
fn test_semantic_adds_suggestions_without_overriding_keywords() {
    // Leans strongly towards Skill Development, weakly towards Service.
    let embedder = StubEmbedder::new(array![0.1, 0.9, 0.0, 0.0]);
    let classifier = semantic_classifier(embedder);

    let scores = classifier.classify("Volunteer orientation", "");
    let entries: Vec<(&str, f32)> = scores.iter().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], ("Service", 1.0));
    assert_eq!(entries[1].0, "Skill Development");
    assert!(entries[1].1 > 0.45 && entries[1].1 < 1.0);
}

#[test]
fn test_semantic_tie_with_keyword_stays_bounded_and_ranks_after_it() {
    // Input embeds to a scaled copy of the Skill Development concept.
    let classifier = semantic_classifier(StubEmbedder::new(array![0.0, 0.7, 0.0, 0.0]));

    let scores = classifier.classify("Volunteer orientation", "");
    let semantic = scores.get("Skill Development").unwrap();
    assert!(semantic <= 1.0 && semantic > 0.999);
    assert_eq!(scores.get("Service"), Some(1.0));
    assert_eq!(scores.primary(), Some("Service"));
    assert_eq!(scores.labels(), "Service; Skill Development");
}

#[test]
fn test_semantic_matches_above_threshold() {
    let embedder = StubEmbedder::new(array![0.0, 0.0, 0.0, 1.0])
        .with(&normalize_text("Dance night", ""), array![0.0, 0.2, 0.9, 0.0]);
    let classifier = semantic_classifier(embedder);

    let scores = classifier.classify("Dance night", "");
    assert_eq!(scores.len(), 1);
    let score = scores.get("Cultural Exploration").unwrap();
    assert!(score >= 0.45 && score < 1.0);
}

#[test]
fn test_below_threshold_returns_top_two() {
    // Similarities ≈ 0.308, 0.205, 0.103: all below 0.45.
    let embedder = StubEmbedder::new(array![0.3, 0.2, 0.1, 0.9]);
    let classifier = semantic_classifier(embedder);

    let scores = classifier.classify("Campus tour", "meet at the fountain");
    let names: Vec<&str> = scores.categories().collect();
    assert_eq!(names, vec!["Service", "Skill Development"]);
    assert!(scores.iter().all(|(_, s)| s < 0.45));
}

#[test]
fn test_fallback_top_k_is_configurable() {
    let config = ClassifierConfig {
        fallback_top_k: 1,
        ..Default::default()
    };
    let classifier = SpicesClassifier::new(
        taxonomy(),
        Arc::new(StubEmbedder::new(array![0.3, 0.2, 0.1, 0.9])),
        config,
    )
    .unwrap();

    let scores = classifier.classify("Campus tour", "");
    assert_eq!(scores.categories().collect::<Vec<_>>(), vec!["Service"]);
}

#[test]
fn test_semantic_disabled_by_config_skips_embedder() {
    let embedder = Arc::new(StubEmbedder::new(array![0.3, 0.2, 0.1, 0.9]));
    let config = ClassifierConfig {
        use_semantic: false,
        ..Default::default()
    };
    let classifier = SpicesClassifier::new(taxonomy(), embedder.clone(), config).unwrap();

    assert!(classifier.classify("Campus tour", "").is_uncategorized());
    assert_eq!(embedder.calls.load(Ordering::Relaxed), 0);
}

#[test]
fn test_concepts_are_embedded_once() {
    let embedder = Arc::new(StubEmbedder::new(array![0.3, 0.2, 0.1, 0.9]));
    let classifier =
        SpicesClassifier::new(taxonomy(), embedder.clone(), ClassifierConfig::default()).unwrap();
    assert_eq!(embedder.calls.load(Ordering::Relaxed), 3);

    classifier.classify("Campus tour", "");
    classifier.classify("Campus tour", "");
    // One embedding per classified text; concepts are not recomputed.
    assert_eq!(embedder.calls.load(Ordering::Relaxed), 5);
}

#[test]
fn test_scores_bounded_and_never_empty() {
    let keyword_only = SpicesClassifier::default();
    let semantic = semantic_classifier(StubEmbedder::new(array![-0.5, 0.2, 0.0, 0.1]));
    let texts = [
        ("", ""),
        ("Volunteer", "food drive"),
        ("International festival", "heritage and culture"),
        ("Bootcamp", "coding"),
        ("???", "!!!"),
    ];

    for classifier in [&keyword_only, &semantic] {
        for (title, description) in texts {
            let scores = classifier.classify(title, description);
            assert!(!scores.is_empty());
            assert!(scores.iter().all(|(_, s)| (-1.0..=1.0).contains(&s)));
            if scores.contains(UNCATEGORIZED) {
                assert_eq!(scores.len(), 1);
            }
        }
    }
}

#[test]
fn test_classify_is_idempotent() {
    let classifier = semantic_classifier(StubEmbedder::new(array![0.3, 0.2, 0.1, 0.9]));
    let first = classifier.classify("Volunteer fair", "bootcamp sign-ups");
    let second = classifier.classify("Volunteer fair", "bootcamp sign-ups");
    assert_eq!(first, second);
}

#[test]
fn test_batch_preserves_count_and_order() {
    let classifier = SpicesClassifier::default();
    let input: Vec<Record> = vec![
        record(json!({"id": 1, "Title": "Food drive", "Description": "donate cans"})),
        record(json!({"id": 2, "Title": "", "Description": ""})),
        record(json!({"id": 3, "Title": "Yoga", "Description": null})),
        record(json!({"id": 4})),
    ];

    let output = classifier.classify_records(&input, "Title", "Description");
    assert_eq!(output.len(), input.len());
    for (i, row) in output.iter().enumerate() {
        assert_eq!(row["id"], input[i]["id"]);
        assert!(row[SPICES_COLUMN].is_string());
        assert!(row[SCORES_COLUMN].is_string());
    }
    assert_eq!(output[0][SPICES_COLUMN], json!("Service"));
    assert_eq!(output[1][SPICES_COLUMN], json!(UNCATEGORIZED));
    assert_eq!(output[2][SPICES_COLUMN], json!("Engaged Living"));
    assert_eq!(output[3][SCORES_COLUMN], json!("0.000"));
}

#[test]
fn test_batch_ranks_semantic_after_keywords() {
    let classifier = semantic_classifier(StubEmbedder::new(array![0.1, 0.9, 0.0, 0.0]));
    let input = vec![record(json!({"Title": "Volunteer orientation"}))];
    let row = &classifier.classify_records(&input, "Title", "Description")[0];
    assert_eq!(row[SPICES_COLUMN], json!("Service; Skill Development"));
    assert_eq!(row[SCORES_COLUMN], json!("1.000; 0.994"));
}

#[test]
fn test_classifier_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SpicesClassifier>();

    let classifier = Arc::new(SpicesClassifier::default());
    let handles: Vec<_> = ["Volunteer day", "Career fair", "Heritage night"]
        .into_iter()
        .map(|title| {
            let classifier = classifier.clone();
            std::thread::spawn(move || classifier.classify(title, "").labels())
        })
        .collect();

    let labels: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(labels, vec!["Service", "Professional Development", "Cultural Exploration"]);
}

#[test]
fn test_keyword_only_helper_embedder() {
    let classifier =
        SpicesClassifier::new(taxonomy(), no_embedder(), ClassifierConfig::default()).unwrap();
    assert!(!classifier.semantic_enabled());
    assert!(classifier.classify("Bootcamp", "").contains("Skill Development"));
}
