use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::classifier::{ClassifierError, RiskClassifier};

/// Information about the categories and classifiers held by a registry
#[derive(Debug, Clone)]
pub struct RegistryInfo {
    /// Number of registered risk categories
    pub num_categories: usize,
    /// Category identifiers in iteration order
    pub categories: Vec<String>,
    /// Classifier family per category
    pub classifier_kinds: HashMap<String, String>,
}

/// The immutable set of per-category risk classifiers.
///
/// A registry pairs an ordered list of category identifiers with exactly one
/// classifier per category. It is validated once at construction and never
/// mutated afterwards, so a single instance can be shared across threads
/// behind an `Arc`:
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use protocol_risk::{ModelRegistry, PriorModel};
/// use std::sync::Arc;
/// use std::thread;
///
/// let registry = Arc::new(
///     ModelRegistry::builder()
///         .add_category("legal", PriorModel::new(0.8)?)?
///         .add_category("privacy", PriorModel::new(0.3)?)?
///         .build()?,
/// );
///
/// let shared = Arc::clone(&registry);
/// thread::spawn(move || {
///     assert_eq!(shared.categories(), ["legal", "privacy"]);
/// })
/// .join()
/// .unwrap();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ModelRegistry {
    categories: Vec<String>,
    classifiers: HashMap<String, Box<dyn RiskClassifier>>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<ModelRegistry>();
    }
};

impl ModelRegistry {
    /// Creates a new RegistryBuilder for fluent construction
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Builds a registry from an ordered category list and a classifier mapping.
    ///
    /// Construction is all-or-nothing. It fails with
    /// `ClassifierError::ArtifactLoad` if:
    /// - a category identifier is empty or listed twice
    /// - a listed category has no classifier
    /// - a classifier is bound to a category that is not listed
    pub fn from_parts(
        categories: Vec<String>,
        classifiers: HashMap<String, Box<dyn RiskClassifier>>,
    ) -> Result<Self, ClassifierError> {
        let mut seen = HashSet::with_capacity(categories.len());
        for category in &categories {
            if category.is_empty() {
                return Err(ClassifierError::ArtifactLoad(
                    "Risk category identifier cannot be empty".into(),
                ));
            }
            if !seen.insert(category.as_str()) {
                return Err(ClassifierError::ArtifactLoad(format!(
                    "Risk category '{}' is listed more than once",
                    category
                )));
            }
            if !classifiers.contains_key(category) {
                return Err(ClassifierError::ArtifactLoad(format!(
                    "Risk category '{}' has no classifier",
                    category
                )));
            }
        }

        let mut orphans: Vec<&str> = classifiers
            .keys()
            .map(String::as_str)
            .filter(|name| !seen.contains(name))
            .collect();
        if !orphans.is_empty() {
            orphans.sort_unstable();
            return Err(ClassifierError::ArtifactLoad(format!(
                "Classifiers without a category entry: {}",
                orphans.join(", ")
            )));
        }

        if categories.is_empty() {
            warn!("Model registry has no risk categories; every result table will be empty");
        }
        debug!("Model registry validated with {} categories", categories.len());

        Ok(Self {
            categories,
            classifiers,
        })
    }

    /// Category identifiers in iteration order
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Returns the classifier bound to `category`
    pub fn classifier_for(&self, category: &str) -> Result<&dyn RiskClassifier, ClassifierError> {
        self.classifiers
            .get(category)
            .map(|classifier| classifier.as_ref())
            .ok_or_else(|| ClassifierError::UnknownCategory(category.to_string()))
    }

    pub fn contains(&self, category: &str) -> bool {
        self.classifiers.contains_key(category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Returns a summary of the registered categories and classifier kinds
    pub fn info(&self) -> RegistryInfo {
        RegistryInfo {
            num_categories: self.categories.len(),
            categories: self.categories.clone(),
            classifier_kinds: self
                .classifiers
                .iter()
                .map(|(category, classifier)| (category.clone(), classifier.kind().to_string()))
                .collect(),
        }
    }
}

/// A builder for constructing a ModelRegistry with a fluent interface.
///
/// Categories are iterated in the order they are added.
#[derive(Default, Debug)]
pub struct RegistryBuilder {
    categories: Vec<String>,
    classifiers: HashMap<String, Box<dyn RiskClassifier>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a classifier for a new category
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or
    ///   `ClassifierError::ArtifactLoad` if the identifier is empty or already registered
    pub fn add_category(
        self,
        category: impl Into<String>,
        classifier: impl RiskClassifier + 'static,
    ) -> Result<Self, ClassifierError> {
        self.add_boxed(category, Box::new(classifier))
    }

    /// Same as `add_category`, for classifiers that are already boxed
    pub fn add_boxed(
        mut self,
        category: impl Into<String>,
        classifier: Box<dyn RiskClassifier>,
    ) -> Result<Self, ClassifierError> {
        let category = category.into();
        if category.is_empty() {
            return Err(ClassifierError::ArtifactLoad(
                "Risk category identifier cannot be empty".into(),
            ));
        }
        if self.classifiers.contains_key(&category) {
            return Err(ClassifierError::ArtifactLoad(format!(
                "Risk category '{}' is already registered",
                category
            )));
        }
        self.categories.push(category.clone());
        self.classifiers.insert(category, classifier);
        Ok(self)
    }

    /// Builds and returns the final ModelRegistry
    pub fn build(self) -> Result<ModelRegistry, ClassifierError> {
        ModelRegistry::from_parts(self.categories, self.classifiers)
    }
}
