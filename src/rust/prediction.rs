use serde::Serialize;

/// One risk category's outcome for a single classification call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRow {
    /// Raw category identifier as registered
    pub category: String,
    /// Probability in [0, 1] that the risk is present
    pub probability: f32,
    /// `probability >= threshold`
    pub present: bool,
    /// Translated name; set only when a translation map was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl PredictionRow {
    /// Display name when translated, otherwise the raw identifier
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.category)
    }

    /// Presence as a 0/1 flag
    pub fn present_flag(&self) -> u8 {
        u8::from(self.present)
    }
}

/// The ordered rows produced by one classification call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<PredictionRow>,
}

impl ResultTable {
    pub(crate) fn new(rows: Vec<PredictionRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PredictionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PredictionRow> {
        self.rows.iter()
    }

    /// Looks up the row for a raw category identifier
    pub fn get(&self, category: &str) -> Option<&PredictionRow> {
        self.rows.iter().find(|row| row.category == category)
    }

    /// Raw identifiers of the categories flagged present, in table order
    pub fn present_categories(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| row.present)
            .map(|row| row.category.as_str())
            .collect()
    }

    pub fn into_rows(self) -> Vec<PredictionRow> {
        self.rows
    }
}

impl IntoIterator for ResultTable {
    type Item = PredictionRow;
    type IntoIter = std::vec::IntoIter<PredictionRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a PredictionRow;
    type IntoIter = std::slice::Iter<'a, PredictionRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
