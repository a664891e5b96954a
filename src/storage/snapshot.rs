use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::core::error::{Error, ErrorKind, Result};
use crate::mvcc::controller::Generation;
use crate::storage::layout::StorageLayout;

/// Snapshot file header, followed by the lz4-compressed bincode body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub format_version: u32,
    pub generation: u64,
    pub body_len: u64,
    pub checksum: u32,  // crc32 of the compressed body
}

impl SnapshotHeader {
    pub const MAGIC: [u8; 4] = *b"FDXG";
    pub const VERSION: u32 = 1;
    pub const SIZE: usize = 28; // Fixed-width bincode encoding

    fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(corrupted("file shorter than header"));
        }

        let header: SnapshotHeader = bincode::deserialize(&bytes[..Self::SIZE])
            .map_err(|e| corrupted(&format!("unreadable header: {}", e)))?;

        if header.magic != Self::MAGIC {
            return Err(corrupted("bad magic"));
        }
        if header.format_version != Self::VERSION {
            return Err(corrupted(&format!("unsupported format version {}", header.format_version)));
        }
        Ok(header)
    }
}

fn corrupted(reason: &str) -> Error {
    Error::new(ErrorKind::Corrupted, format!("snapshot: {}", reason))
}

/// Write a generation to a temp file, fsync it, then rename over its final name
pub fn save(layout: &StorageLayout, generation: &Generation) -> Result<PathBuf> {
    let encoded = bincode::serialize(generation)?;
    let body = lz4_flex::compress_prepend_size(&encoded);

    let mut hasher = Hasher::new();
    hasher.update(&body);

    let header = SnapshotHeader {
        magic: SnapshotHeader::MAGIC,
        format_version: SnapshotHeader::VERSION,
        generation: generation.version,
        body_len: body.len() as u64,
        checksum: hasher.finalize(),
    };

    let temp_path = layout.temp_path(generation.version);
    let final_path = layout.generation_path(generation.version);
    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&bincode::serialize(&header)?)?;
        file.write_all(&body)?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, &final_path)?;

    info!(
        version = generation.version,
        bytes = SnapshotHeader::SIZE + body.len(),
        path = %final_path.display(),
        "generation persisted"
    );
    Ok(final_path)
}

/// Read and verify one snapshot file
pub fn load(path: &Path) -> Result<Generation> {
    let bytes = fs::read(path)?;
    let header = SnapshotHeader::read(&bytes)?;

    let body = &bytes[SnapshotHeader::SIZE..];
    if body.len() as u64 != header.body_len {
        return Err(corrupted("truncated body"));
    }

    let mut hasher = Hasher::new();
    hasher.update(body);
    if hasher.finalize() != header.checksum {
        return Err(corrupted("checksum mismatch"));
    }

    let encoded = lz4_flex::decompress_size_prepended(body)
        .map_err(|e| corrupted(&e.to_string()))?;
    let mut generation: Generation = bincode::deserialize(&encoded)?;

    if generation.version != header.generation {
        return Err(corrupted("header and body disagree on the generation"));
    }

    // Prefix dictionaries are not persisted
    generation.index.rebuild()?;
    Ok(generation)
}

/// Newest snapshot on disk; a corrupted newest file is an error, not a fallback
pub fn load_latest(layout: &StorageLayout) -> Result<Option<Generation>> {
    match layout.list_generations()?.first() {
        Some((version, path)) => {
            debug!(version, path = %path.display(), "loading generation");
            load(path).map(Some)
        }
        None => Ok(None),
    }
}

/// Remove snapshots older than `keep`, plus stale temp files
pub fn prune(layout: &StorageLayout, keep: u64) -> Result<usize> {
    let mut removed = 0;

    for (version, path) in layout.list_generations()? {
        if version < keep {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }

    for entry in fs::read_dir(&layout.generations_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "tmp") {
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "failed to remove temp snapshot");
            }
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::core::types::{DocId, Record};
    use crate::analysis::analyzer::Analyzer;
    use crate::index::index_writer::IndexBuilder;
    use crate::index::inverted::Term;
    use crate::schema::schema::Schema;
    use std::sync::Arc;

    fn generation(version: u64) -> Generation {
        let schema = Schema::new().analyzed_field("name").exact_field("area");
        let builder = IndexBuilder::new(
            Arc::new(schema.clone()),
            Arc::new(Analyzer::standard()),
            &Config::default(),
        );
        let output = builder
            .build(vec![
                Record::new().with("name", "Triceratops").with("area", "North America"),
                Record::new().with("name", "Stegosaurus").with("area", "Europe"),
            ])
            .unwrap();
        Generation::new(version, schema, output)
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().to_path_buf()).unwrap();

        let path = save(&layout, &generation(3)).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.version, 3);
        assert_eq!(loaded.doc_count(), 2);
        assert_eq!(loaded.document(DocId(1)).unwrap().get_field("area"), Some("Europe"));
        assert!(loaded.index.search_term(&Term::new("name", "stegosaurus")).is_some());
        // Rebuilt prefix dictionary
        assert_eq!(loaded.index.field("name").unwrap().prefix_index.len(), 2);
    }

    #[test]
    fn test_header_has_fixed_size() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().to_path_buf()).unwrap();
        let path = save(&layout, &generation(7)).unwrap();

        let bytes = fs::read(&path).unwrap();
        let header = SnapshotHeader::read(&bytes).unwrap();
        assert_eq!(bincode::serialize(&header).unwrap().len(), SnapshotHeader::SIZE);
        assert_eq!(header.generation, 7);
        assert_eq!(header.body_len as usize, bytes.len() - SnapshotHeader::SIZE);
        assert_eq!(&bytes[..4], b"FDXG");
    }

    #[test]
    fn test_checksum_mismatch_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().to_path_buf()).unwrap();
        let path = save(&layout, &generation(1)).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        assert_eq!(load(&path).err().unwrap().kind(), ErrorKind::Corrupted);
    }

    #[test]
    fn test_bad_magic_and_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen_00000001.fdx");

        fs::write(&path, b"nope").unwrap();
        assert_eq!(load(&path).err().unwrap().kind(), ErrorKind::Corrupted);

        fs::write(&path, [0u8; 64]).unwrap();
        assert_eq!(load(&path).err().unwrap().kind(), ErrorKind::Corrupted);
    }

    #[test]
    fn test_latest_and_prune() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path().to_path_buf()).unwrap();
        assert!(load_latest(&layout).unwrap().is_none());

        save(&layout, &generation(1)).unwrap();
        save(&layout, &generation(2)).unwrap();
        fs::write(layout.temp_path(3), b"partial").unwrap();

        assert_eq!(load_latest(&layout).unwrap().unwrap().version, 2);
        assert_eq!(prune(&layout, 2).unwrap(), 1);
        assert_eq!(layout.list_generations().unwrap().len(), 1);
        assert!(!layout.temp_path(3).exists());
    }
}
