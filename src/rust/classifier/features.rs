use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::convert::TryFrom;

use ndarray::Array1;
use regex::Regex;
use serde::Deserialize;

use super::utils::{l1_normalize_vector, normalize_vector};

/// Token pattern used when an artifact does not carry its own: words of two
/// or more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Row normalization applied after TF-IDF weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    #[default]
    L2,
    None,
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// On-disk shape of a vectorizer, validated into a [`TfidfVectorizer`].
#[derive(Debug, Deserialize)]
struct VectorizerSpec {
    vocabulary: HashMap<String, usize>,
    #[serde(default)]
    idf: Option<Vec<f32>>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    stop_words: Vec<String>,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    norm: Norm,
}

/// Converts a document into a TF-IDF weighted feature vector over a fixed vocabulary.
///
/// The transformation follows the usual bag-of-words pipeline:
/// 1. Optional lowercasing
/// 2. Tokenization with the artifact's token pattern, minus stop words
/// 3. Word n-gram counting against the vocabulary (n-grams joined by one space)
/// 4. Optional sublinear term frequency (`1 + ln(tf)`)
/// 5. Inverse document frequency weighting, when idf weights are present
/// 6. L1 or L2 row normalization
///
/// Terms outside the vocabulary are ignored, so a document with no known
/// terms maps to the zero vector.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "VectorizerSpec")]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Array1<f32>>,
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    sublinear_tf: bool,
    norm: Norm,
}

impl TryFrom<VectorizerSpec> for TfidfVectorizer {
    type Error = String;

    fn try_from(spec: VectorizerSpec) -> Result<Self, Self::Error> {
        let n_features = spec.vocabulary.len();
        if n_features == 0 {
            return Err("vectorizer vocabulary cannot be empty".into());
        }

        let mut seen_columns = HashSet::with_capacity(n_features);
        for (term, &column) in &spec.vocabulary {
            if column >= n_features {
                return Err(format!(
                    "vocabulary term '{}' maps to column {} (vocabulary size is {})",
                    term, column, n_features
                ));
            }
            if !seen_columns.insert(column) {
                return Err(format!("vocabulary column {} is assigned twice", column));
            }
        }

        let idf = match spec.idf {
            Some(weights) => {
                if weights.len() != n_features {
                    return Err(format!(
                        "idf has {} weights but the vocabulary has {} terms",
                        weights.len(),
                        n_features
                    ));
                }
                if weights.iter().any(|w| !w.is_finite()) {
                    return Err("idf weights must be finite".into());
                }
                Some(Array1::from(weights))
            }
            None => None,
        };

        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({}, {})", min_n, max_n));
        }

        let token_pattern = Regex::new(&spec.token_pattern)
            .map_err(|e| format!("invalid token_pattern '{}': {}", spec.token_pattern, e))?;

        Ok(Self {
            vocabulary: spec.vocabulary,
            idf,
            lowercase: spec.lowercase,
            token_pattern,
            ngram_range: spec.ngram_range,
            stop_words: spec.stop_words.into_iter().collect(),
            sublinear_tf: spec.sublinear_tf,
            norm: spec.norm,
        })
    }
}

impl TfidfVectorizer {
    /// Number of columns in the feature vector
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    /// Splits text into tokens, applying lowercasing and stop-word removal
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let text: Cow<'_, str> = if self.lowercase {
            Cow::Owned(text.to_lowercase())
        } else {
            Cow::Borrowed(text)
        };

        self.token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|token| !self.stop_words.contains(*token))
            .map(str::to_string)
            .collect()
    }

    /// Converts text into a normalized TF-IDF vector of length `n_features()`
    pub fn transform(&self, text: &str) -> Array1<f32> {
        let tokens = self.tokenize(text);
        let mut features = Array1::<f32>::zeros(self.n_features());

        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&column) = self.vocabulary.get(&term) {
                    features[column] += 1.0;
                }
            }
        }

        if self.sublinear_tf {
            features.mapv_inplace(|tf| if tf > 0.0 { 1.0 + tf.ln() } else { 0.0 });
        }
        if let Some(idf) = &self.idf {
            features *= idf;
        }

        match self.norm {
            Norm::L2 => normalize_vector(&features),
            Norm::L1 => l1_normalize_vector(&features),
            Norm::None => features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vectorizer(value: serde_json::Value) -> TfidfVectorizer {
        serde_json::from_value(value).expect("valid vectorizer")
    }

    #[test]
    fn test_tokenize_defaults() {
        let v = vectorizer(json!({ "vocabulary": { "consent": 0 } }));
        let tokens = v.tokenize("Informed CONSENT: a minor's data");
        assert_eq!(tokens, vec!["informed", "consent", "minor", "data"]);
    }

    #[test]
    fn test_stop_words_and_case() {
        let v = vectorizer(json!({
            "vocabulary": { "Datos": 0 },
            "lowercase": false,
            "stop_words": ["de", "los"]
        }));
        assert_eq!(v.tokenize("Tratamiento de los Datos"), vec!["Tratamiento", "Datos"]);
    }

    #[test]
    fn test_transform_counts_bigrams() {
        let v = vectorizer(json!({
            "vocabulary": { "personal": 0, "data": 1, "personal data": 2 },
            "ngram_range": [1, 2],
            "norm": "none"
        }));
        let x = v.transform("personal data and more personal data");
        assert_eq!(x.to_vec(), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_transform_sublinear_idf_l2() {
        let v = vectorizer(json!({
            "vocabulary": { "risk": 0, "blood": 1 },
            "idf": [1.0, 2.0],
            "sublinear_tf": true
        }));
        let x = v.transform("blood blood risk");
        let blood = (1.0 + 2.0f32.ln()) * 2.0;
        let risk = 1.0f32;
        let norm = (blood * blood + risk * risk).sqrt();
        assert!((x[0] - risk / norm).abs() < 1e-6);
        assert!((x[1] - blood / norm).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_terms_map_to_zero_vector() {
        let v = vectorizer(json!({ "vocabulary": { "risk": 0 } }));
        assert_eq!(v.transform("nothing relevant here").to_vec(), vec![0.0]);
    }

    #[test]
    fn test_invalid_vectorizers_are_rejected() {
        let cases = vec![
            json!({ "vocabulary": {} }),
            json!({ "vocabulary": { "a": 0, "b": 2 } }),
            json!({ "vocabulary": { "a": 0, "b": 0 } }),
            json!({ "vocabulary": { "a": 0 }, "idf": [1.0, 2.0] }),
            json!({ "vocabulary": { "a": 0 }, "ngram_range": [2, 1] }),
            json!({ "vocabulary": { "a": 0 }, "ngram_range": [0, 1] }),
            json!({ "vocabulary": { "a": 0 }, "token_pattern": "(" }),
        ];
        for case in cases {
            assert!(
                serde_json::from_value::<TfidfVectorizer>(case.clone()).is_err(),
                "expected rejection of {}",
                case
            );
        }
    }
}
