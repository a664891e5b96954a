use fossildex::core::config::Config;
use fossildex::core::error::ErrorKind;
use fossildex::{BoolQuery, DocId, Query, Record, Schema, SearchEngine};

fn schema() -> Schema {
    Schema::new()
        .analyzed_field("name")
        .analyzed_field("description")
        .exact_field("area")
        .exact_field("source_link")
}

fn dino(name: &str, area: &str, description: &str) -> Record {
    Record::new()
        .with("name", name)
        .with("area", area)
        .with("description", description)
        .with("source_link", &format!("https://en.wikipedia.org/wiki/{}", name))
}

fn dinosaurs() -> Vec<Record> {
    vec![
        dino("Triceratops", "North America", "Horned herbivore with a frill"),
        dino("Tyrannosaurus", "North America", "Giant carnivore"),
        dino("Stegosaurus", "Europe", "Plated herbivore"),
    ]
}

fn engine_with(records: Vec<Record>) -> SearchEngine {
    let engine = SearchEngine::open(schema(), Config::default()).unwrap();
    engine.build(records).unwrap();
    engine
}

fn names(engine: &SearchEngine, query: &Query) -> Vec<String> {
    engine
        .search(query, 10)
        .unwrap()
        .hits
        .iter()
        .map(|hit| hit.field("name").unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_scenario_wildcard_term_and_tie_break() {
    let engine = engine_with(dinosaurs());

    assert_eq!(names(&engine, &Query::wildcard("name", "*ceratops")), vec!["Triceratops"]);
    assert_eq!(names(&engine, &Query::term("area", "Europe")), vec!["Stegosaurus"]);

    // Docs 0 and 1 share area and length, so they score the same
    let results = engine.search(&Query::term("area", "North America"), 1).unwrap();
    assert_eq!(results.total_hits, 2);
    assert_eq!(results.doc_ids(), vec![DocId(0)]);
}

#[test]
fn test_round_trip_exact_and_analyzed() {
    let schema = Schema::new().exact_field("name");
    let engine = SearchEngine::open(schema, Config::default()).unwrap();
    engine.build(vec![Record::new().with("name", "Triceratops")]).unwrap();
    let results = engine.search(&Query::term("name", "Triceratops"), 10).unwrap();
    assert_eq!(results.doc_ids(), vec![DocId(0)]);
    assert!(results.hits[0].score > 0.0);

    let engine = engine_with(dinosaurs());
    let results = engine.search(&Query::parsed("name", "triceratops"), 10).unwrap();
    assert_eq!(results.doc_ids(), vec![DocId(0)]);
    assert!(results.hits[0].score > 0.0);
}

#[test]
fn test_round_trip_of_overlong_word() {
    let long = "a".repeat(300);
    let engine = engine_with(vec![
        dino(&long, "Asia", "Unnamed specimen"),
        dino("Triceratops", "North America", "Horned herbivore"),
    ]);

    let results = engine.search(&Query::parsed("name", &long), 10).unwrap();
    assert_eq!(results.doc_ids(), vec![DocId(0)]);
    assert!(results.hits[0].score > 0.0);
}

#[test]
fn test_referential_completeness() {
    let engine = engine_with(vec![
        dino("Triceratops", "North America", "Horned"),
        Record::new().with("name", "   ").with("area", ""),
        dino("Iguanodon", "Europe", "Thumb spikes"),
    ]);
    let searcher = engine.searcher().unwrap();
    let generation = searcher.generation();

    for term in generation.index.terms() {
        assert!(!term.text.is_empty());
        for posting in generation.index.search_term(&term).unwrap().iter() {
            assert!(generation.store.contains(posting.doc_id), "{:?} in {:?}", posting.doc_id, term);
        }
    }

    // The blank record still gets an id but stores and indexes nothing
    assert_eq!(generation.doc_count(), 3);
    assert!(generation.document(DocId(1)).unwrap().fields.is_empty());
}

#[test]
fn test_rebuild_is_idempotent() {
    let first = engine_with(dinosaurs());
    let second = engine_with(dinosaurs());
    let a = first.searcher().unwrap();
    let b = second.searcher().unwrap();

    assert_eq!(
        bincode::serialize(&a.generation().index).unwrap(),
        bincode::serialize(&b.generation().index).unwrap()
    );
    assert_eq!(a.generation().store.iter().collect::<Vec<_>>(), b.generation().store.iter().collect::<Vec<_>>());

    // Same engine, second build: new generation, same content
    first.build(dinosaurs()).unwrap();
    let c = first.searcher().unwrap();
    assert!(c.version() > a.version());
    assert_eq!(
        bincode::serialize(&a.generation().index).unwrap(),
        bincode::serialize(&c.generation().index).unwrap()
    );
}

#[test]
fn test_wildcard_prefix_is_case_insensitive_and_exclusive() {
    let engine = engine_with(vec![
        dino("Triceratops", "North America", ""),
        dino("TRIASSIC Tribe", "Asia", ""),
        dino("Atrium", "Asia", ""),
        dino("Tyrannosaurus", "North America", ""),
    ]);

    let mut found = names(&engine, &Query::wildcard("name", "Tri*"));
    found.sort();
    assert_eq!(found, vec!["TRIASSIC Tribe", "Triceratops"]);
}

#[test]
fn test_fuzzy_distance_bound() {
    let config = Config { max_edit_distance: 3, ..Config::default() };
    let engine = SearchEngine::open(schema(), config).unwrap();
    engine
        .build(vec![
            dino("Triceratops", "North America", ""),
            dino("Tricer", "Asia", ""),
        ])
        .unwrap();

    // triceratops is 2 edits away, tricer is 3
    assert_eq!(names(&engine, &Query::fuzzy("name", "tricerato", 2)), vec!["Triceratops"]);
    assert_eq!(engine.search(&Query::fuzzy("name", "tricerato", 3), 10).unwrap().total_hits, 2);
}

#[test]
fn test_fuzzy_distance_over_limit_is_rejected() {
    let engine = engine_with(dinosaurs());
    let err = engine.search(&Query::fuzzy("name", "tricerato", 3), 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QuerySyntax);
}

#[test]
fn test_multi_field_boost_ranking() {
    let engine = engine_with(vec![
        Record::new().with("name", "Alpha").with("description", "Giant"),
        Record::new().with("name", "Giant").with("description", "Alpha"),
    ]);

    let query = Query::multi_field(&[("name", 5.0), ("description", 1.0)], "giant");
    let results = engine.search(&query, 10).unwrap();
    assert_eq!(results.doc_ids(), vec![DocId(1), DocId(0)]);
    assert!((results.hits[0].score - 5.0 * results.hits[1].score).abs() < 1e-4);
}

#[test]
fn test_must_not_excludes_even_when_must_matches() {
    let engine = engine_with(dinosaurs());
    let query = BoolQuery::new()
        .with_must(Query::parsed("description", "herbivore"))
        .with_must_not(Query::term("area", "Europe"))
        .build();
    assert_eq!(names(&engine, &query), vec!["Triceratops"]);
}

#[test]
fn test_should_only_requires_a_match() {
    let engine = engine_with(dinosaurs());
    let query = BoolQuery::new()
        .with_should(Query::parsed("name", "stegosaurus"))
        .with_should(Query::parsed("name", "nothing"))
        .build();
    assert_eq!(names(&engine, &query), vec!["Stegosaurus"]);
}

#[test]
fn test_empty_inputs_return_no_results() {
    let engine = engine_with(dinosaurs());
    for query in [
        Query::parsed("name", ""),
        Query::parsed("name", "  ,;  "),
        Query::term("area", ""),
        Query::wildcard("name", ""),
        Query::fuzzy("name", "", 2),
        Query::multi_field(&[("name", 1.0)], ""),
        BoolQuery::new().build(),
    ] {
        let results = engine.search(&query, 10).unwrap();
        assert!(results.hits.is_empty(), "{:?}", query);
    }
    assert!(engine.search_str("", 10).unwrap().hits.is_empty());
}

#[test]
fn test_non_empty_requirement() {
    let config = Config { require_non_empty_query: true, ..Config::default() };
    let engine = SearchEngine::open(schema(), config).unwrap();
    engine.build(dinosaurs()).unwrap();

    let err = engine.search(&Query::parsed("name", "--"), 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QuerySyntax);
}

#[test]
fn test_unknown_field_matches_nothing() {
    let engine = engine_with(dinosaurs());
    assert!(engine.search(&Query::term("period", "Jurassic"), 10).unwrap().hits.is_empty());
}

#[test]
fn test_index_not_ready() {
    let engine = SearchEngine::open(schema(), Config::default()).unwrap();
    for result in [
        engine.search(&Query::term("area", "Europe"), 10).map(|_| ()),
        engine.search_str("rex", 10).map(|_| ()),
        engine.document(DocId(0)).map(|_| ()),
    ] {
        assert_eq!(result.unwrap_err().kind(), ErrorKind::IndexNotReady);
    }
}

#[test]
fn test_failed_build_keeps_previous_generation() {
    let config = Config {
        ingestion_policy: fossildex::core::config::IngestionPolicy::Abort,
        ..Config::default()
    };
    let engine = SearchEngine::open(schema(), config).unwrap();
    engine.build(dinosaurs()).unwrap();

    let malformed = vec![
        serde_json::json!({"name": "Raptor"}),
        serde_json::json!(["not", "a", "mapping"]),
    ];
    let err = engine.build(malformed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Ingestion);

    assert_eq!(engine.stats().unwrap().doc_count, 3);
}

#[test]
fn test_skip_policy_reports_malformed_records() {
    let engine = SearchEngine::open(schema(), Config::default()).unwrap();
    let report = engine
        .build(vec![
            serde_json::json!({"name": "Raptor"}),
            serde_json::json!({"name": {"nested": true}}),
            serde_json::json!({"name": "Compsognathus"}),
        ])
        .unwrap();

    assert_eq!(report.indexed, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].position, 1);
    // Skipped records do not consume an id
    assert_eq!(engine.document(DocId(1)).unwrap().unwrap().get_field("name"), Some("Compsognathus"));
}

#[test]
fn test_explain_agrees_with_score() {
    let engine = engine_with(dinosaurs());
    let query = Query::multi_field(&[("name", 5.0), ("description", 1.0)], "triceratops herbivore");
    let results = engine.search(&query, 10).unwrap();

    for hit in &results.hits {
        let explanation = engine.explain(&query, hit.doc_id).unwrap().unwrap();
        assert!((explanation.value - hit.score).abs() < 1e-4);
    }
}
