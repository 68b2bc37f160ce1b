use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::artifact_store::ArtifactError;

/// Maps risk category identifiers to human-readable display names.
///
/// Lookups never fail: a category without an entry resolves to its raw
/// identifier, so unmapped categories stay visible in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TranslationMap {
    names: HashMap<String, String>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed Spanish to English table for the protocol review categories
    pub fn builtin() -> Self {
        [
            ("riesgo_resolucion_8430", "Regulatory Risk (Resolution 8430)"),
            ("riesgo_poblacion_vulnerable", "Vulnerable Population Risk"),
            ("riesgo_naturaleza_alcance", "Nature and Scope Risk"),
            ("riesgo_biologico", "Biological Risk"),
            ("riesgo_tratamiento_datos", "Data Processing Risk"),
            (
                "riesgo_sistemas_seguridad_informacion",
                "Information Security Systems Risk",
            ),
            ("Financial Risk", "Financial Risk"),
        ]
        .into_iter()
        .collect()
    }

    /// Reads a JSON object of `{category: display name}` pairs
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Json {
            file: path.display().to_string(),
            source,
        })
    }

    pub fn insert(&mut self, category: impl Into<String>, display_name: impl Into<String>) {
        self.names.insert(category.into(), display_name.into());
    }

    /// Returns the display name for `category`, or the identifier itself when unmapped
    pub fn resolve<'a>(&'a self, category: &'a str) -> &'a str {
        self.names.get(category).map(String::as_str).unwrap_or(category)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(category, name)| (category.into(), name.into()))
                .collect(),
        }
    }
}
