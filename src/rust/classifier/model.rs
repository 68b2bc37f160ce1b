use std::convert::TryFrom;
use std::fmt;

use ndarray::Array1;
use serde::Deserialize;

use super::error::ClassifierError;
use super::features::TfidfVectorizer;
use super::utils::sigmoid;

/// A trained binary decision function for one risk category.
///
/// Implementations must be pure with respect to the document: the same text
/// always yields the same probability. They are shared read-only across
/// threads once registered, hence the `Send + Sync` bound.
pub trait RiskClassifier: Send + Sync + fmt::Debug {
    /// Returns the probability in [0, 1] that the category's risk is present
    fn predict_proba(&self, document: &str) -> Result<f32, ClassifierError>;

    /// Short name of the classifier family, used in registry summaries
    fn kind(&self) -> &str {
        "custom"
    }
}

/// A serialized classifier as stored in the classifier-mapping artifact.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    /// TF-IDF features followed by binary logistic regression
    TfidfLogistic(LogisticTextModel),
    /// Constant probability, for categories trained on a single class
    Prior(PriorModel),
}

impl ClassifierArtifact {
    /// Turns the artifact into a registrable classifier
    pub fn into_classifier(self) -> Box<dyn RiskClassifier> {
        match self {
            Self::TfidfLogistic(model) => Box::new(model),
            Self::Prior(model) => Box::new(model),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LogisticSpec {
    vectorizer: TfidfVectorizer,
    coef: Vec<f32>,
    intercept: f32,
}

/// Logistic regression over TF-IDF features.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "LogisticSpec")]
pub struct LogisticTextModel {
    vectorizer: TfidfVectorizer,
    coef: Array1<f32>,
    intercept: f32,
}

impl TryFrom<LogisticSpec> for LogisticTextModel {
    type Error = String;

    fn try_from(spec: LogisticSpec) -> Result<Self, Self::Error> {
        if spec.coef.len() != spec.vectorizer.n_features() {
            return Err(format!(
                "coef has {} weights but the vectorizer produces {} features",
                spec.coef.len(),
                spec.vectorizer.n_features()
            ));
        }
        if !spec.intercept.is_finite() || spec.coef.iter().any(|w| !w.is_finite()) {
            return Err("logistic weights must be finite".into());
        }
        Ok(Self {
            vectorizer: spec.vectorizer,
            coef: Array1::from(spec.coef),
            intercept: spec.intercept,
        })
    }
}

impl LogisticTextModel {
    /// Raw decision value `x · coef + intercept` before the logistic link
    pub fn decision_function(&self, document: &str) -> f32 {
        let features = self.vectorizer.transform(document);
        features.dot(&self.coef) + self.intercept
    }
}

impl RiskClassifier for LogisticTextModel {
    fn predict_proba(&self, document: &str) -> Result<f32, ClassifierError> {
        let z = self.decision_function(document);
        if !z.is_finite() {
            return Err(ClassifierError::PredictionError(format!(
                "non-finite decision value {}",
                z
            )));
        }
        Ok(sigmoid(z))
    }

    fn kind(&self) -> &str {
        "tfidf_logistic"
    }
}

#[derive(Debug, Deserialize)]
struct PriorSpec {
    probability: f32,
}

/// Ignores the document and always reports the same probability.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(try_from = "PriorSpec")]
pub struct PriorModel {
    probability: f32,
}

impl PriorModel {
    pub fn new(probability: f32) -> Result<Self, ClassifierError> {
        Self::try_from(PriorSpec { probability }).map_err(ClassifierError::ArtifactLoad)
    }
}

impl TryFrom<PriorSpec> for PriorModel {
    type Error = String;

    fn try_from(spec: PriorSpec) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&spec.probability) {
            return Err(format!(
                "prior probability {} must lie in [0, 1]",
                spec.probability
            ));
        }
        Ok(Self {
            probability: spec.probability,
        })
    }
}

impl RiskClassifier for PriorModel {
    fn predict_proba(&self, _document: &str) -> Result<f32, ClassifierError> {
        Ok(self.probability)
    }

    fn kind(&self) -> &str {
        "prior"
    }
}
