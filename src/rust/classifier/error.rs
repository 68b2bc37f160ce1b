/// Represents the different types of errors that can occur while loading
/// risk classifiers or classifying a document.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The registry could not be constructed: missing, corrupt or
    /// inconsistent artifacts.
    #[error("Artifact load error: {0}")]
    ArtifactLoad(String),
    /// A classifier was requested for a category that is not registered
    #[error("Unknown risk category: {0}")]
    UnknownCategory(String),
    /// The decision threshold lies outside [0, 1]
    #[error("Invalid threshold {0}: must lie in [0, 1]")]
    InvalidThreshold(f32),
    /// A category's classifier failed while scoring the document
    #[error("Scoring failed for category '{category}': {reason}")]
    Scoring { category: String, reason: String },
    /// Raised by a classifier implementation when it cannot score a document.
    /// The aggregator reports it as `Scoring` for the offending category.
    #[error("Prediction error: {0}")]
    PredictionError(String),
}

impl ClassifierError {
    pub(crate) fn scoring(category: &str, source: impl std::fmt::Display) -> Self {
        Self::Scoring {
            category: category.to_string(),
            reason: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_error_names_category() {
        let err = ClassifierError::scoring(
            "privacy",
            ClassifierError::PredictionError("bad input".into()),
        );
        let message = err.to_string();
        assert!(message.contains("'privacy'"));
        assert!(message.contains("bad input"));
    }

    #[test]
    fn test_invalid_threshold_message() {
        let err = ClassifierError::InvalidThreshold(1.5);
        assert_eq!(err.to_string(), "Invalid threshold 1.5: must lie in [0, 1]");
    }
}
