//! A multi-label risk classifier for clinical protocol text.
//!
//! Each risk category has its own independently trained binary classifier.
//! A [`ModelRegistry`] holds them, loaded once from persisted artifacts, and
//! [`classify`] scores one document against every category, producing a
//! probability and a thresholded presence flag per category.
//!
//! Predictions are illustrative only and carry no regulatory or clinical
//! decision authority.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use protocol_risk::{classify, ClassifyOptions, ModelRegistry, PriorModel};
//!
//! let registry = ModelRegistry::builder()
//!     .add_category("legal", PriorModel::new(0.82)?)?
//!     .add_category("privacy", PriorModel::new(0.31)?)?
//!     .build()?;
//!
//! let table = classify("Protocol text...", &registry, &ClassifyOptions::default())?;
//! for row in &table {
//!     println!("{}: {:.1}% present={}", row.label(), row.probability * 100.0, row.present);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Loading Artifacts
//!
//! In production the registry comes from `models.json` and `risks.json` in the
//! artifacts directory, read once per process:
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use protocol_risk::{ArtifactStore, ClassifyOptions, RiskAggregator, TranslationMap};
//!
//! let registry = ArtifactStore::new("/srv/protocol-risk/artifacts").load()?;
//! let aggregator = RiskAggregator::new(registry)
//!     .with_options(ClassifyOptions::default().with_translation(TranslationMap::builtin()));
//! let table = aggregator.classify("Se tomarán muestras de sangre a menores de edad.")?;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod artifact_store;
pub mod classifier;
pub mod input;
pub mod prediction;
pub mod registry;
pub mod translation;

pub use aggregator::{classify, ClassifyOptions, RiskAggregator, SortBy, DEFAULT_THRESHOLD};
pub use artifact_store::{load, ArtifactError, ArtifactStore, MANIFEST_FILE, MODELS_FILE, RISKS_FILE};
pub use classifier::{
    ClassifierArtifact, ClassifierError, LogisticTextModel, Norm, PriorModel, RiskClassifier,
    TfidfVectorizer,
};
pub use input::{decode_document, prepare_document};
pub use prediction::{PredictionRow, ResultTable};
pub use registry::{ModelRegistry, RegistryBuilder, RegistryInfo};
pub use translation::TranslationMap;

pub fn init_logger() {
    env_logger::init();
}
