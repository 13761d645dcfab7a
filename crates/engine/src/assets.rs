//! Image assets addressed by path.
//!
//! Components never reach for a global registry: they receive an
//! [`AssetProvider`] at draw time. The desktop implementation,
//! [`AssetCache`], is filled during a load phase and afterwards only grows
//! through one-shot lazy requests for paths that were missed.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Ready,
    Failed,
}

#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub trait AssetProvider {
    fn get_asset(&self, path: &str) -> Option<&ImageAsset>;

    /// Fetches a missing asset at most once per path; later calls report the
    /// remembered outcome without touching the source again.
    fn request_asset(&mut self, path: &str) -> AssetStatus;

    /// Records that `path` is being drawn as a placeholder. True only the
    /// first time for a path, whoever asks, so callers log at most once.
    fn note_placeholder(&mut self, path: &str) -> bool;
}

/// Returns the asset, issuing the one-shot lazy request on a miss.
pub fn fetch_asset<'a>(assets: &'a mut dyn AssetProvider, path: &str) -> Option<&'a ImageAsset> {
    if assets.get_asset(path).is_none() {
        assets.request_asset(path);
    }
    assets.get_asset(path)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub loaded: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub struct AssetCache {
    root: PathBuf,
    images: HashMap<String, ImageAsset>,
    queued: Vec<String>,
    lazy_requested: HashSet<String>,
    failed: HashSet<String>,
    warned: HashSet<String>,
}

impl AssetCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            images: HashMap::new(),
            queued: Vec::new(),
            lazy_requested: HashSet::new(),
            failed: HashSet::new(),
            warned: HashSet::new(),
        }
    }

    pub fn queue_download(&mut self, path: impl Into<String>) {
        let path = path.into();
        if !self.queued.contains(&path) {
            self.queued.push(path);
        }
    }

    /// Load phase: decodes every queued path that is not already cached.
    pub fn download_all(&mut self) -> DownloadSummary {
        let mut summary = DownloadSummary::default();
        let queued = std::mem::take(&mut self.queued);
        for path in queued {
            if self.images.contains_key(&path) {
                continue;
            }
            if self.load_into_cache(&path) {
                summary.loaded += 1;
            } else {
                summary.failed += 1;
            }
        }
        info!(
            loaded = summary.loaded,
            failed = summary.failed,
            "asset_download_complete"
        );
        summary
    }

    pub fn insert(&mut self, path: impl Into<String>, image: ImageAsset) {
        let path = path.into();
        self.failed.remove(&path);
        self.images.insert(path, image);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn has_failed(&self, path: &str) -> bool {
        self.failed.contains(path)
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let trimmed = path.strip_prefix("./").unwrap_or(path);
        self.root.join(trimmed)
    }

    fn load_into_cache(&mut self, path: &str) -> bool {
        let resolved = self.resolve(path);
        match load_image_rgba(&resolved) {
            Ok(image) => {
                debug!(path, width = image.width, height = image.height, "asset_loaded");
                self.failed.remove(path);
                self.images.insert(path.to_string(), image);
                true
            }
            Err(error) => {
                self.failed.insert(path.to_string());
                if self.warned.insert(path.to_string()) {
                    warn!(
                        path,
                        resolved = %resolved.display(),
                        error = %error,
                        "asset_load_failed_using_placeholder"
                    );
                }
                false
            }
        }
    }
}

impl AssetProvider for AssetCache {
    fn get_asset(&self, path: &str) -> Option<&ImageAsset> {
        self.images.get(path)
    }

    fn request_asset(&mut self, path: &str) -> AssetStatus {
        if self.images.contains_key(path) {
            return AssetStatus::Ready;
        }
        if !self.lazy_requested.insert(path.to_string()) {
            return AssetStatus::Failed;
        }
        if self.load_into_cache(path) {
            AssetStatus::Ready
        } else {
            AssetStatus::Failed
        }
    }

    fn note_placeholder(&mut self, path: &str) -> bool {
        self.warned.insert(path.to_string())
    }
}

pub fn load_image_rgba(path: &Path) -> Result<ImageAsset, AssetLoadError> {
    let reader = ImageReader::open(path).map_err(|source| AssetLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok(ImageAsset {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}
