mod error;
mod features;
mod model;
mod utils;

pub use error::ClassifierError;
pub use features::{Norm, TfidfVectorizer, DEFAULT_TOKEN_PATTERN};
pub use model::{ClassifierArtifact, LogisticTextModel, PriorModel, RiskClassifier};
