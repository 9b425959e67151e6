use std::fmt;

use serde::{Deserialize, Serialize};

/// The coding system a [`Code`] is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Vocabulary {
    #[serde(rename = "ICD10")]
    Icd10,
    #[serde(rename = "RXNORM")]
    RxNorm,
    #[serde(rename = "SNOMED")]
    Snomed,
    #[serde(rename = "CPT")]
    Cpt,
}

impl Vocabulary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vocabulary::Icd10 => "ICD10",
            Vocabulary::RxNorm => "RXNORM",
            Vocabulary::Snomed => "SNOMED",
            Vocabulary::Cpt => "CPT",
        }
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A standardized identifier for a clinical concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Code {
    /// The code string, compared verbatim (case-sensitive).
    pub code: String,
    pub description: String,
    pub vocabulary: Vocabulary,
    pub category: Option<String>,
}

impl Code {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        vocabulary: Vocabulary,
    ) -> Self {
        Code {
            code: code.into(),
            description: description.into(),
            vocabulary,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vocabulary, self.code)
    }
}
