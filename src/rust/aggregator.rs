use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::classifier::ClassifierError;
use crate::prediction::{PredictionRow, ResultTable};
use crate::registry::ModelRegistry;
use crate::translation::TranslationMap;

/// Probability at or above which a risk is flagged present
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Row ordering of a result table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Registry iteration order
    #[default]
    Registry,
    /// Descending probability, ties kept in registry order
    Probability,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registry" | "category" => Ok(Self::Registry),
            "probability" => Ok(Self::Probability),
            other => Err(format!(
                "unknown sort order '{}' (expected 'registry' or 'probability')",
                other
            )),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry => write!(f, "registry"),
            Self::Probability => write!(f, "probability"),
        }
    }
}

/// Per-call settings for [`classify`]
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyOptions {
    /// Inclusive decision threshold in [0, 1]
    pub threshold: f32,
    /// Display names to attach to each row; `None` leaves rows untranslated
    pub translation: Option<TranslationMap>,
    pub sort_by: SortBy,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            translation: None,
            sort_by: SortBy::Registry,
        }
    }
}

impl ClassifyOptions {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_translation(mut self, translation: TranslationMap) -> Self {
        self.translation = Some(translation);
        self
    }

    pub fn sorted_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }
}

/// Scores `document` against every category in `registry` and returns one row per category.
///
/// The caller is responsible for rejecting empty or whitespace-only documents
/// before calling (see [`crate::prepare_document`]).
///
/// # Errors
/// - `InvalidThreshold` if `options.threshold` is outside [0, 1] (checked before any scoring)
/// - `Scoring` naming the first category whose classifier fails or returns a
///   probability outside [0, 1]; no partial table is returned
///
/// # Example
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use protocol_risk::{classify, ClassifyOptions, ModelRegistry, PriorModel, SortBy};
///
/// let registry = ModelRegistry::builder()
///     .add_category("privacy", PriorModel::new(0.31)?)?
///     .add_category("legal", PriorModel::new(0.82)?)?
///     .build()?;
///
/// let options = ClassifyOptions::default().sorted_by(SortBy::Probability);
/// let table = classify("Participants' records are shared with sponsors.", &registry, &options)?;
/// assert_eq!(table.rows()[0].category, "legal");
/// assert!(table.rows()[0].present);
/// # Ok(())
/// # }
/// ```
pub fn classify(
    document: &str,
    registry: &ModelRegistry,
    options: &ClassifyOptions,
) -> Result<ResultTable, ClassifierError> {
    if !(0.0..=1.0).contains(&options.threshold) {
        return Err(ClassifierError::InvalidThreshold(options.threshold));
    }

    let start = Instant::now();
    let mut rows = Vec::with_capacity(registry.len());

    for category in registry.categories() {
        let classifier = registry.classifier_for(category)?;
        let probability = classifier
            .predict_proba(document)
            .map_err(|e| ClassifierError::scoring(category, e))?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(ClassifierError::scoring(
                category,
                format!("probability {} outside [0, 1]", probability),
            ));
        }

        let present = probability >= options.threshold;
        debug!("{}: p={:.4} present={}", category, probability, present);

        rows.push(PredictionRow {
            category: category.clone(),
            probability,
            present,
            display_name: options
                .translation
                .as_ref()
                .map(|names| names.resolve(category).to_string()),
        });
    }

    // Vec::sort_by is stable, so equal probabilities keep registry order
    if options.sort_by == SortBy::Probability {
        rows.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(Ordering::Equal)
        });
    }

    let table = ResultTable::new(rows);
    info!(
        "Classified document ({} chars): {}/{} risks present (took {:.2?})",
        document.chars().count(),
        table.present_categories().len(),
        table.len(),
        start.elapsed()
    );
    Ok(table)
}

/// Binds a shared registry to one set of classification options.
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use protocol_risk::{ClassifyOptions, ModelRegistry, PriorModel, RiskAggregator, TranslationMap};
/// use std::sync::Arc;
///
/// let registry = Arc::new(
///     ModelRegistry::builder()
///         .add_category("riesgo_biologico", PriorModel::new(0.64)?)?
///         .build()?,
/// );
/// let aggregator = RiskAggregator::new(registry)
///     .with_options(ClassifyOptions::default().with_translation(TranslationMap::builtin()));
///
/// let table = aggregator.classify("Blood samples will be stored for ten years.")?;
/// assert_eq!(table.rows()[0].label(), "Biological Risk");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RiskAggregator {
    registry: Arc<ModelRegistry>,
    options: ClassifyOptions,
}

impl RiskAggregator {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            options: ClassifyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ClassifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ClassifyOptions {
        &self.options
    }

    pub fn classify(&self, document: &str) -> Result<ResultTable, ClassifierError> {
        classify(document, &self.registry, &self.options)
    }
}
