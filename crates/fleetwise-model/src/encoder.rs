//! One-hot encoding for the categorical branch.

use crate::error::{ModelError, Result};
use crate::frame::category_values;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sorted category labels seen for one column during fit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Column name
    pub column: String,
    /// Distinct non-null training labels, sorted
    pub categories: Vec<String>,
}

impl Vocabulary {
    fn position(&self, label: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|probe| probe.as_str().cmp(label))
            .ok()
    }
}

/// One indicator column per training category.
///
/// Labels not seen during fit, and missing cells, encode as all zeros for
/// that column's block instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    vocabularies: Option<Vec<Vocabulary>>,
}

impl OneHotEncoder {
    /// Create an unfitted encoder
    pub const fn new() -> Self {
        Self { vocabularies: None }
    }

    /// Learn the vocabulary of each column.
    pub fn fit<S: AsRef<str>>(&mut self, df: &DataFrame, columns: &[S]) -> Result<&mut Self> {
        let vocabularies = columns
            .iter()
            .map(|name| {
                let name = name.as_ref();
                let labels: BTreeSet<String> =
                    category_values(df, name)?.into_iter().flatten().collect();
                Ok(Vocabulary {
                    column: name.to_string(),
                    categories: labels.into_iter().collect(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.vocabularies = Some(vocabularies);
        Ok(self)
    }

    /// Fitted vocabularies, if any
    pub fn vocabularies(&self) -> Option<&[Vocabulary]> {
        self.vocabularies.as_deref()
    }

    /// Number of indicator columns
    pub fn width(&self) -> usize {
        self.vocabularies
            .as_ref()
            .map_or(0, |v| v.iter().map(|voc| voc.categories.len()).sum())
    }

    /// Indicator names as `column_category`, in output order
    pub fn feature_names(&self) -> Vec<String> {
        self.vocabularies
            .iter()
            .flatten()
            .flat_map(|voc| {
                voc.categories
                    .iter()
                    .map(move |category| format!("{}_{category}", voc.column))
            })
            .collect()
    }

    /// Encode the fitted columns of `df` into an `(rows, indicators)` matrix.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let vocabularies = self.vocabularies.as_ref().ok_or(ModelError::NotFitted)?;
        let mut out = Array2::zeros((df.height(), self.width()));

        let mut offset = 0;
        for vocabulary in vocabularies {
            let labels = category_values(df, &vocabulary.column)?;
            for (i, label) in labels.iter().enumerate() {
                if let Some(k) = label.as_deref().and_then(|l| vocabulary.position(l)) {
                    out[[i, offset + k]] = 1.0;
                }
            }
            offset += vocabulary.categories.len();
        }
        Ok(out)
    }
}
