use std::path::{Path, PathBuf};
use std::fs;
use crate::core::error::Result;

/// Directory structure for persisted generations
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,         // Root directory
    pub generations_dir: PathBuf,  // One snapshot file per committed generation
    pub lock_path: PathBuf,        // Writer lock file
}

impl StorageLayout {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        let generations_dir = base_dir.join("generations");
        let lock_path = base_dir.join(".lock");

        fs::create_dir_all(&generations_dir)?;

        Ok(StorageLayout {
            base_dir,
            generations_dir,
            lock_path,
        })
    }

    pub fn generation_path(&self, version: u64) -> PathBuf {
        self.generations_dir.join(format!("gen_{:08}.fdx", version))
    }

    pub fn temp_path(&self, version: u64) -> PathBuf {
        self.generations_dir.join(format!("gen_{:08}.fdx.tmp", version))
    }

    /// Snapshot files present on disk, newest first
    pub fn list_generations(&self) -> Result<Vec<(u64, PathBuf)>> {
        let mut generations = Vec::new();

        for entry in fs::read_dir(&self.generations_dir)? {
            let path = entry?.path();
            if let Some(version) = parse_generation_name(&path) {
                generations.push((version, path));
            }
        }

        generations.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(generations)
    }
}

fn parse_generation_name(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    name.strip_prefix("gen_")?
        .strip_suffix(".fdx")?
        .parse()
        .ok()
}
