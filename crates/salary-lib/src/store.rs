//! Durable persistence for the trained tier
//!
//! The regressor, the fitted encoder (vocabularies + scaler), and the
//! format metadata persist as one binary blob. Saves are atomic; any load
//! failure is reported as absence so the caller retrains instead of
//! operating on a partially valid artifact.

use crate::encoder::{FeatureEncoder, NUM_FEATURES};
use crate::forest::Regressor;
use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Bumped whenever the persisted layout or the feature vector changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// The trained tier-1 bundle: one coherent, atomically persisted unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedArtifact {
    pub format_version: u32,
    pub feature_width: usize,
    pub encoder: FeatureEncoder,
    pub regressor: Regressor,
}

impl TrainedArtifact {
    pub fn new(encoder: FeatureEncoder, regressor: Regressor) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_width: NUM_FEATURES,
            encoder,
            regressor,
        }
    }

    /// An artifact with empty vocabularies and the constant regressor,
    /// the starting point for a fit over labeled rows
    pub fn untrained() -> Self {
        Self::new(FeatureEncoder::fit(&[]), Regressor::constant_fallback())
    }
}

#[derive(Debug, Error)]
enum ArtifactError {
    #[error("artifact format version {found} does not match expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("artifact feature width {found} does not match expected {expected}")]
    WidthMismatch { found: usize, expected: usize },
}

/// Loads and saves the trained artifact at a fixed path
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted artifact. Missing file, decode failure, and
    /// shape mismatch all report as `None`; the caller retrains.
    pub fn load(&self) -> Option<TrainedArtifact> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No persisted artifact");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read artifact");
                return None;
            }
        };

        match decode(&bytes) {
            Ok(artifact) => {
                info!(
                    path = %self.path.display(),
                    regressor = %artifact.regressor.describe(),
                    "Loaded trained artifact"
                );
                Some(artifact)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Rejected persisted artifact");
                None
            }
        }
    }

    /// Persist the artifact atomically: the previous blob stays intact
    /// until the new one is fully written
    pub fn save(&self, artifact: &TrainedArtifact) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create artifact directory {}", parent.display())
                })?;
            }
        }

        let bytes = bincode::serialize(artifact).context("Failed to encode artifact")?;
        AtomicFile::new(&self.path, OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(&bytes))
            .with_context(|| format!("Failed to write artifact {}", self.path.display()))?;

        info!(
            path = %self.path.display(),
            size = bytes.len(),
            "Saved trained artifact"
        );
        Ok(())
    }
}

fn decode(bytes: &[u8]) -> Result<TrainedArtifact> {
    let artifact: TrainedArtifact =
        bincode::deserialize(bytes).context("Failed to decode artifact")?;
    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ArtifactError::VersionMismatch {
            found: artifact.format_version,
            expected: ARTIFACT_FORMAT_VERSION,
        }
        .into());
    }
    if artifact.feature_width != NUM_FEATURES {
        return Err(ArtifactError::WidthMismatch {
            found: artifact.feature_width,
            expected: NUM_FEATURES,
        }
        .into());
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobRecord;
    use tempfile::TempDir;

    fn fitted_artifact() -> TrainedArtifact {
        let corpus = vec![
            JobRecord {
                location: "北京".to_string(),
                experience: "3-5年".to_string(),
                education: "本科".to_string(),
                industry: "互联网".to_string(),
                ..JobRecord::default()
            },
            JobRecord {
                location: "上海".to_string(),
                experience: "1-3年".to_string(),
                education: "硕士".to_string(),
                industry: "金融".to_string(),
                ..JobRecord::default()
            },
        ];
        let encoder = FeatureEncoder::fit(&corpus);
        TrainedArtifact::new(encoder, Regressor::constant_fallback())
    }

    #[test]
    fn test_load_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("model.bin"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("model.bin"));

        let artifact = fitted_artifact();
        store.save(&artifact).unwrap();

        let restored = store.load().expect("artifact should load");
        assert_eq!(restored.format_version, ARTIFACT_FORMAT_VERSION);
        assert_eq!(restored.feature_width, NUM_FEATURES);
        assert_eq!(restored.regressor.predict(&[0.0; 6]), 19_000.0);
    }

    #[test]
    fn test_corrupt_blob_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.bin");
        fs::write(&path, b"not a real artifact").unwrap();

        let store = ArtifactStore::new(&path);
        assert!(store.load().is_none());
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("model.bin"));

        let mut artifact = fitted_artifact();
        artifact.format_version = ARTIFACT_FORMAT_VERSION + 1;
        store.save(&artifact).unwrap();

        assert!(store.load().is_none());
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("model.bin"));

        let mut artifact = fitted_artifact();
        artifact.feature_width = NUM_FEATURES + 1;
        store.save(&artifact).unwrap();

        assert!(store.load().is_none());
    }
}
