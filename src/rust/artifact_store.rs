use std::collections::HashMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::classifier::{ClassifierArtifact, ClassifierError, RiskClassifier};
use crate::registry::ModelRegistry;

/// Classifier-mapping artifact: `{category: classifier}`
pub const MODELS_FILE: &str = "models.json";
/// Category-list artifact: `[category, ...]`
pub const RISKS_FILE: &str = "risks.json";
/// Optional `{file name: sha256 hex}` integrity manifest
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    Missing(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
}

impl From<ArtifactError> for ClassifierError {
    fn from(err: ArtifactError) -> Self {
        ClassifierError::ArtifactLoad(err.to_string())
    }
}

lazy_static! {
    static ref DEFAULT_STORE: ArtifactStore = ArtifactStore::new_default();
}

/// Loads the process-wide registry from the default artifact directory.
///
/// The first successful call reads the artifacts; every later call returns the
/// same `Arc` without touching storage again.
pub fn load() -> Result<Arc<ModelRegistry>, ClassifierError> {
    DEFAULT_STORE.load()
}

/// Read-only access to the persisted classifier artifacts in one directory.
///
/// Clones share the same load-once cache.
#[derive(Clone, Debug)]
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
    cached: Arc<Mutex<Option<Arc<ModelRegistry>>>>,
}

impl ArtifactStore {
    /// Creates an ArtifactStore over the default artifacts directory
    pub fn new_default() -> Self {
        Self::new(Self::get_default_artifacts_dir())
    }

    /// Returns the default artifacts directory path
    pub fn get_default_artifacts_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("PROTOCOL_RISK_ARTIFACTS") {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("protocol-risk").join("artifacts");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir
                .join(".local")
                .join("share")
                .join("protocol-risk")
                .join("artifacts");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("protocol-risk").join("artifacts")
    }

    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> Self {
        Self {
            artifacts_dir: artifacts_dir.as_ref().to_path_buf(),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn models_path(&self) -> PathBuf {
        self.artifacts_dir.join(MODELS_FILE)
    }

    pub fn risks_path(&self) -> PathBuf {
        self.artifacts_dir.join(RISKS_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.artifacts_dir.join(MANIFEST_FILE)
    }

    pub fn artifacts_present(&self) -> bool {
        let models_path = self.models_path();
        let risks_path = self.risks_path();
        log::debug!("Checking artifacts:");
        log::debug!("  Models path: {:?} (exists: {})", models_path, models_path.exists());
        log::debug!("  Risks path: {:?} (exists: {})", risks_path, risks_path.exists());
        models_path.exists() && risks_path.exists()
    }

    /// Returns true once a registry has been cached by `load`
    pub fn is_loaded(&self) -> bool {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Loads the registry on first use and returns the cached instance afterwards.
    ///
    /// Loading is all-or-nothing: a failure leaves the cache empty, so a later
    /// call reads the artifacts again.
    pub fn load(&self) -> Result<Arc<ModelRegistry>, ClassifierError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(registry) = cached.as_ref() {
            log::debug!("Reusing cached model registry from {:?}", self.artifacts_dir);
            return Ok(Arc::clone(registry));
        }

        let start = Instant::now();
        let registry = match self.read_registry() {
            Ok(registry) => Arc::new(registry),
            Err(e) => {
                log::error!("Failed to load artifacts from {:?}: {}", self.artifacts_dir, e);
                return Err(e);
            }
        };
        log::info!(
            "Loaded {} risk categories from {:?} (took {:.2?})",
            registry.len(),
            self.artifacts_dir,
            start.elapsed()
        );

        *cached = Some(Arc::clone(&registry));
        Ok(registry)
    }

    fn read_registry(&self) -> Result<ModelRegistry, ClassifierError> {
        let manifest = self.read_manifest()?;
        let models_bytes = self.read_artifact(MODELS_FILE, manifest.as_ref())?;
        let risks_bytes = self.read_artifact(RISKS_FILE, manifest.as_ref())?;

        let artifacts: HashMap<String, ClassifierArtifact> = parse(MODELS_FILE, &models_bytes)?;
        let categories: Vec<String> = parse(RISKS_FILE, &risks_bytes)?;
        log::debug!(
            "Parsed {} classifiers and {} categories",
            artifacts.len(),
            categories.len()
        );

        let classifiers: HashMap<String, Box<dyn RiskClassifier>> = artifacts
            .into_iter()
            .map(|(category, artifact)| (category, artifact.into_classifier()))
            .collect();

        ModelRegistry::from_parts(categories, classifiers)
    }

    fn read_manifest(&self) -> Result<Option<HashMap<String, String>>, ArtifactError> {
        let path = self.manifest_path();
        if !path.exists() {
            log::debug!("No manifest at {:?}, skipping integrity checks", path);
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        parse(MANIFEST_FILE, &bytes).map(Some)
    }

    fn read_artifact(
        &self,
        name: &str,
        manifest: Option<&HashMap<String, String>>,
    ) -> Result<Vec<u8>, ArtifactError> {
        let path = self.artifacts_dir.join(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArtifactError::Missing(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        log::debug!("Read {} bytes from {:?}", bytes.len(), path);

        if let Some(manifest) = manifest {
            let expected = manifest
                .get(name)
                .ok_or_else(|| ArtifactError::Missing(format!("{} entry for {}", MANIFEST_FILE, name)))?;
            let actual = sha256_hex(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                log::error!("{} hash mismatch: expected {}, got {}", name, expected, actual);
                return Err(ArtifactError::HashMismatch {
                    file: name.to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
            log::debug!("{} verified against manifest", name);
        }

        Ok(bytes)
    }
}

fn parse<T: DeserializeOwned>(file: &str, bytes: &[u8]) -> Result<T, ArtifactError> {
    serde_json::from_slice(bytes).map_err(|source| ArtifactError::Json {
        file: file.to_string(),
        source,
    })
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_default_artifacts_dir() {
        // Test with environment variable
        env::set_var("PROTOCOL_RISK_ARTIFACTS", "/tmp/test-protocol-risk");
        let path = ArtifactStore::get_default_artifacts_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-protocol-risk"));
        env::remove_var("PROTOCOL_RISK_ARTIFACTS");

        // Test without environment variable
        let path = ArtifactStore::get_default_artifacts_dir();
        assert!(path.ends_with("protocol-risk/artifacts"));
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(!store.artifacts_present());
        assert!(matches!(store.load(), Err(ClassifierError::ArtifactLoad(_))));
        assert!(!store.is_loaded());
    }
}
