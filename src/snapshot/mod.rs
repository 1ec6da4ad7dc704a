pub mod format;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub use format::{Snapshot, SnapshotKind, SnapshotMetadata};

/// Error type for snapshot operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Snapshot version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Snapshot manager for saving and loading snapshots
pub struct SnapshotManager {
    compress: bool,
}

impl Default for SnapshotManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotManager {
    pub fn new() -> Self {
        Self { compress: false }
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// File extension matching the compression setting
    pub fn extension(&self) -> &'static str {
        if self.compress {
            "json.gz"
        } else {
            "json"
        }
    }

    /// Builds `<dir>/<stem>.<ext>` with the stem reduced to file-name safe characters
    pub fn path_for(&self, dir: &Path, stem: &str) -> PathBuf {
        let stem: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        dir.join(format!("{}.{}", stem, self.extension()))
    }

    /// Save a snapshot to a file, creating parent directories as needed
    pub fn save<T: Serialize>(&self, snapshot: &Snapshot<T>, path: &Path) -> SnapshotResult<()> {
        info!("Saving snapshot to {:?}", path);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json_data = serde_json::to_vec_pretty(snapshot)?;

        let mut file = File::create(path)?;
        if self.compress {
            let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(&json_data)?;
            let compressed = encoder.finish()?;
            file.write_all(&compressed)?;

            debug!(
                "Snapshot compressed from {} to {} bytes",
                json_data.len(),
                compressed.len()
            );
        } else {
            file.write_all(&json_data)?;
        }

        info!("Snapshot saved successfully");
        Ok(())
    }

    /// Load a snapshot from a file, gzip or plain
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> SnapshotResult<Snapshot<T>> {
        info!("Loading snapshot from {:?}", path);

        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;

        let json_data = if is_compressed(&buffer) {
            let mut decoder = flate2::read::GzDecoder::new(&buffer[..]);
            let mut decompressed = Vec::new();
            decoder.read_to_end(&mut decompressed)?;
            decompressed
        } else {
            buffer
        };

        let snapshot: Snapshot<T> = serde_json::from_slice(&json_data)?;

        if snapshot.version != format::SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: format::SNAPSHOT_VERSION.to_string(),
                actual: snapshot.version.clone(),
            });
        }

        Ok(snapshot)
    }
}

/// Gzip magic numbers: 1f 8b
fn is_compressed(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}
