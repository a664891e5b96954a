use std::fs;
use fossildex::core::config::Config;
use fossildex::core::error::ErrorKind;
use fossildex::storage::layout::StorageLayout;
use fossildex::{DocId, Query, Record, Schema, SearchEngine};
use tempfile::TempDir;

fn schema() -> Schema {
    Schema::new().analyzed_field("name").exact_field("area")
}

fn records() -> Vec<Record> {
    vec![
        Record::new().with("name", "Triceratops").with("area", "North America"),
        Record::new().with("name", "Stegosaurus").with("area", "Europe"),
        Record::new().with("name", "Iguanodon").with("area", "Europe"),
    ]
}

fn open(dir: &TempDir) -> fossildex::Result<SearchEngine> {
    SearchEngine::open(schema(), Config::default().with_storage_path(dir.path()))
}

#[test]
fn test_reopen_restores_last_generation() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;

    {
        let engine = open(&dir)?;
        engine.build(records())?;
        engine.build(records().into_iter().take(2).collect::<Vec<_>>())?;
        engine.close();
    }

    let engine = open(&dir)?;
    let stats = engine.stats()?;
    assert_eq!(stats.generation, 2);
    assert_eq!(stats.doc_count, 2);

    let results = engine.search(&Query::wildcard("name", "*saurus"), 10)?;
    assert_eq!(results.doc_ids(), vec![DocId(1)]);
    assert_eq!(results.hits[0].field("area"), Some("Europe"));

    // Versions keep increasing after a restore
    engine.build(records())?;
    assert_eq!(engine.stats()?.generation, 3);

    // Only the newest snapshot is kept
    let layout = StorageLayout::new(dir.path().to_path_buf())?;
    let versions: Vec<u64> = layout.list_generations()?.into_iter().map(|(v, _)| v).collect();
    assert_eq!(versions, vec![3]);
    Ok(())
}

#[test]
fn test_empty_storage_is_not_ready() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let engine = open(&dir)?;
    assert_eq!(engine.search_str("rex", 10).unwrap_err().kind(), ErrorKind::IndexNotReady);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_second_writer_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let engine = open(&dir)?;

    assert_eq!(open(&dir).err().map(|e| e.kind()), Some(ErrorKind::InvalidState));

    engine.close();
    assert!(open(&dir).is_ok());
    Ok(())
}

#[test]
fn test_corrupted_snapshot_fails_open() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    {
        let engine = open(&dir)?;
        engine.build(records())?;
    }

    let layout = StorageLayout::new(dir.path().to_path_buf())?;
    let (_, path) = layout.list_generations()?.remove(0);
    let mut bytes = fs::read(&path)?;
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x5A;
    fs::write(&path, bytes)?;

    assert_eq!(open(&dir).err().map(|e| e.kind()), Some(ErrorKind::Corrupted));
    Ok(())
}

#[test]
fn test_close_during_build_discards_the_build() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let engine = open(&dir)?;
    engine.build(records())?;

    let engine = &engine;
    std::thread::scope(|scope| {
        // The second record asks for close while the build holds the writer
        let records = records().into_iter().enumerate().map(|(i, record)| {
            if i == 1 {
                scope.spawn(move || engine.close());
                while !engine.is_closed() {
                    std::thread::yield_now();
                }
            }
            record
        });
        let err = engine.build(records).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    });

    assert!(engine.is_closed());
    assert_eq!(engine.search_str("rex", 10).unwrap_err().kind(), ErrorKind::IndexNotReady);
    assert_eq!(engine.build(records()).unwrap_err().kind(), ErrorKind::InvalidState);

    let layout = StorageLayout::new(dir.path().to_path_buf())?;
    let versions: Vec<u64> = layout.list_generations()?.into_iter().map(|(v, _)| v).collect();
    assert_eq!(versions, vec![1]);
    Ok(())
}
