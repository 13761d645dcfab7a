use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::format::{parse_map_json, MapData, MapLoadError};

/// Where map documents come from. Implementations are shared with the
/// background fetch thread.
pub trait MapSource: Send + Sync {
    fn read_map(&self, path: &str) -> Result<String, MapLoadError>;
}

/// Reads maps from disk relative to the asset root.
#[derive(Debug, Clone)]
pub struct FsMapSource {
    root: PathBuf,
}

impl FsMapSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MapSource for FsMapSource {
    fn read_map(&self, path: &str) -> Result<String, MapLoadError> {
        let relative = path.trim_start_matches("./").trim_start_matches('/');
        let resolved = self.root.join(relative);
        fs::read_to_string(&resolved).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                MapLoadError::NotFound {
                    path: path.to_string(),
                }
            } else {
                MapLoadError::Read {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }
}

/// In-memory maps keyed by normalized path; counts reads for tests.
#[derive(Debug, Default)]
pub struct MemoryMapSource {
    maps: HashMap<String, String>,
    reads: AtomicUsize,
}

fn memory_key(path: &str) -> &str {
    path.trim_start_matches("./")
}

impl MemoryMapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(mut self, path: &str, raw: impl Into<String>) -> Self {
        self.insert(path, raw);
        self
    }

    pub fn insert(&mut self, path: &str, raw: impl Into<String>) {
        self.maps.insert(memory_key(path).to_string(), raw.into());
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }
}

impl MapSource for MemoryMapSource {
    fn read_map(&self, path: &str) -> Result<String, MapLoadError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.maps
            .get(memory_key(path))
            .cloned()
            .ok_or_else(|| MapLoadError::NotFound {
                path: path.to_string(),
            })
    }
}

pub fn load_map(source: &dyn MapSource, path: &str) -> Result<MapData, MapLoadError> {
    let raw = source.read_map(path)?;
    parse_map_json(path, &raw)
}
