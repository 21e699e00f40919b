//! Feature encoding for the salary model
//!
//! Converts a job record's ordinal and categorical fields into a
//! fixed-length numeric vector, consistently between training and
//! inference. Vocabularies and the scaler are fit once and frozen.

mod scaler;
mod vocabulary;

pub use scaler::StandardScaler;
pub use vocabulary::{CategoryVocabulary, UNKNOWN_CODE};

use crate::models::{JobRecord, MISSING_TOKEN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Width of the encoded feature vector: two ordinal codes followed by one
/// code per categorical field
pub const NUM_FEATURES: usize = 2 + CategoricalField::ALL.len();

/// The categorical fields carried through label encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoricalField {
    Location,
    CompanyType,
    CompanySize,
    Industry,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 4] = [
        CategoricalField::Location,
        CategoricalField::CompanyType,
        CategoricalField::CompanySize,
        CategoricalField::Industry,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Location => "location",
            CategoricalField::CompanyType => "company_type",
            CategoricalField::CompanySize => "company_size",
            CategoricalField::Industry => "industry",
        }
    }

    fn value<'a>(self, record: &'a JobRecord) -> &'a str {
        let raw = match self {
            CategoricalField::Location => &record.location,
            CategoricalField::CompanyType => &record.company_type,
            CategoricalField::CompanySize => &record.company_size,
            CategoricalField::Industry => &record.industry,
        };
        if raw.trim().is_empty() {
            MISSING_TOKEN
        } else {
            raw
        }
    }
}

/// Map experience text onto its ordinal bucket (0..=4)
pub fn experience_bucket(text: &str) -> u8 {
    if text.contains("应届") || text.contains("1年以下") {
        0
    } else if text.contains("1-3年") {
        1
    } else if text.contains("3-5年") {
        2
    } else if text.contains("5-10年") {
        3
    } else if text.contains("10年以上") {
        4
    } else {
        0
    }
}

/// Map education text onto its ordinal bucket (0..=3)
pub fn education_bucket(text: &str) -> u8 {
    if text.contains("博士") {
        3
    } else if text.contains("硕士") {
        2
    } else if text.contains("本科") {
        1
    } else {
        // 大专 and everything unrecognized share the lowest bucket
        0
    }
}

/// Encodes job records into standardized feature vectors.
///
/// Constructed only by fitting over a corpus (or by loading a persisted
/// artifact), so the vocabularies and scaler are always populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEncoder {
    vocabularies: BTreeMap<CategoricalField, CategoryVocabulary>,
    scaler: StandardScaler,
}

impl FeatureEncoder {
    /// Fit vocabularies and the scaler over the training corpus
    pub fn fit(records: &[JobRecord]) -> Self {
        let vocabularies: BTreeMap<CategoricalField, CategoryVocabulary> = CategoricalField::ALL
            .into_iter()
            .map(|field| {
                let values = records.iter().map(|record| field.value(record));
                (field, CategoryVocabulary::fit(values))
            })
            .collect();

        let raw_matrix: Vec<Vec<f64>> = records
            .iter()
            .map(|record| raw_features(record, &vocabularies))
            .collect();
        let scaler = StandardScaler::fit(&raw_matrix);

        tracing::debug!(
            records = records.len(),
            vocabulary_sizes = ?vocabularies
                .iter()
                .map(|(f, v)| (f.name(), v.len()))
                .collect::<Vec<_>>(),
            "Feature encoder fitted"
        );

        Self {
            vocabularies,
            scaler,
        }
    }

    /// Encode a record into the standardized feature vector
    pub fn transform(&self, record: &JobRecord) -> Vec<f64> {
        let raw = raw_features(record, &self.vocabularies);
        self.scaler.transform(&raw)
    }

    pub fn vocabulary(&self, field: CategoricalField) -> Option<&CategoryVocabulary> {
        self.vocabularies.get(&field)
    }

    pub fn width(&self) -> usize {
        NUM_FEATURES
    }
}

fn raw_features(
    record: &JobRecord,
    vocabularies: &BTreeMap<CategoricalField, CategoryVocabulary>,
) -> Vec<f64> {
    let mut features = Vec::with_capacity(NUM_FEATURES);
    features.push(experience_bucket(&record.experience) as f64);
    features.push(education_bucket(&record.education) as f64);
    for field in CategoricalField::ALL {
        let code = vocabularies
            .get(&field)
            .map(|vocab| vocab.code(field.value(record)))
            .unwrap_or(UNKNOWN_CODE);
        features.push(code as f64);
    }
    features
}
