//! Builds a small dinosaur index and replays a fixed sequence of searches.
//!
//! Run with `RUST_LOG=fossildex=debug` to see planning and build logs. Pass a
//! directory as the first argument to persist the index there.

use fossildex::core::config::Config;
use fossildex::query::ast::Query;
use fossildex::{Record, Schema, SearchEngine, SearchResults};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXACT_FIELDS: [&str; 4] = ["area", "time_period", "length", "source_link"];

fn records() -> Vec<Record> {
    vec![
        Record::new()
            .with("name", "Triceratops")
            .with("area", "North America")
            .with("time_period", "68–66 Ma")
            .with("classification", "Ceratopsidae")
            .with("description", "Large horned herbivore with a bony frill")
            .with("length", "9 m")
            .with("source_link", "https://en.wikipedia.org/wiki/Triceratops"),
        Record::new()
            .with("name", "Tyrannosaurus")
            .with("area", "North America")
            .with("time_period", "68–66 Ma")
            .with("classification", "Tyrannosauridae")
            .with("description", "Giant carnivore of the late Cretaceous")
            .with("length", "12 m")
            .with("source_link", "https://en.wikipedia.org/wiki/Tyrannosaurus"),
        Record::new()
            .with("name", "Stegosaurus")
            .with("area", "Europe")
            .with("time_period", "155–145 Ma")
            .with("classification", "Stegosauridae")
            .with("description", "Plated herbivore of the late Jurassic")
            .with("length", "9 m")
            .with("source_link", "https://en.wikipedia.org/wiki/Stegosaurus"),
        Record::new()
            .with("name", "Iguanodon")
            .with("area", "Europe")
            .with("time_period", "126–122 Ma")
            .with("classification", "Iguanodontidae")
            .with("description", "Biggest herbivore found in Europe with thumb spikes")
            .with("length", "10 m")
            .with("source_link", "https://en.wikipedia.org/wiki/Iguanodon"),
        Record::new()
            .with("name", "Brachiosaurus")
            .with("area", "North America")
            .with("time_period", "154–153 Ma")
            .with("classification", "Brachiosauridae")
            .with("description", "Giant long-necked sauropod of the late Jurassic")
            .with("length", "22 m")
            .with("source_link", "https://en.wikipedia.org/wiki/Brachiosaurus"),
        Record::new()
            .with("name", "Protoceratops")
            .with("area", "Asia")
            .with("time_period", "75–71 Ma")
            .with("classification", "Protoceratopsidae")
            .with("description", "Small frilled herbivore")
            .with("length", "1.8 m")
            .with("source_link", "https://en.wikipedia.org/wiki/Protoceratops"),
    ]
}

fn schema() -> Schema {
    let mut schema = Schema::new()
        .analyzed_field("name")
        .analyzed_field("classification")
        .analyzed_field("description");
    for field in EXACT_FIELDS {
        schema = schema.exact_field(field);
    }
    schema
}

fn print_results(title: &str, results: &SearchResults) {
    println!("\n{}", title);
    println!("Hits: {}\n", results.total_hits);
    for (i, hit) in results.hits.iter().enumerate() {
        println!(
            "{}. {} | Source: {} | Score: {:.2}",
            i + 1,
            hit.field("name").unwrap_or("-"),
            hit.field("source_link").unwrap_or("-"),
            hit.score
        );
    }
}

fn banner(title: &str) {
    println!("{}", "=".repeat(80));
    println!("{}", title);
    println!("{}", "=".repeat(80));
}

fn field_search(engine: &SearchEngine, text: &str, field: &str) -> fossildex::Result<()> {
    let query = if EXACT_FIELDS.contains(&field) {
        Query::term(field, text)
    } else {
        Query::parsed(field, text)
    };
    let results = engine.search(&query, 10)?;
    print_results(&format!("Field: {}\nQuery: {}", field, text), &results);
    Ok(())
}

fn main() -> fossildex::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fossildex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config {
        default_fields: vec![
            ("name".to_string(), 5.0),
            ("classification".to_string(), 1.0),
            ("description".to_string(), 2.0),
        ],
        fuzzy_field: Some("name".to_string()),
        ..Config::default()
    };
    if let Some(dir) = std::env::args().nth(1) {
        config = config.with_storage_path(dir);
    }

    let engine = SearchEngine::open(schema(), config)?;

    banner("CREATE INDEX");
    let report = engine.build(records())?;
    println!("Indexed documents: {}", report.indexed);

    banner("SEARCH TESTS");
    field_search(&engine, "Triceratops", "name")?;
    field_search(&engine, "Europe", "area")?;
    field_search(&engine, "68–66 Ma", "time_period")?;

    banner("WILDCARD TEST");
    let results = engine.search(&Query::wildcard("name", "tri*"), 20)?;
    print_results("Wildcard: tri*", &results);

    banner("SMART SEARCH TESTS");
    for text in ["biggest dinosaur europe", "tricerato", "tri*", "*ceratops", "late jurassic giant"] {
        let results = engine.smart_search(text, 10)?;
        print_results(&format!("Query: {}", text), &results);
    }

    let stats = engine.stats()?;
    println!(
        "\nGeneration {}: {} documents, {} terms",
        stats.generation, stats.doc_count, stats.term_count
    );

    engine.close();
    Ok(())
}
