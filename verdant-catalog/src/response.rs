//! Raw catalog response shapes

use serde::Deserialize;
use serde_json::{Map, Value};

/// The catalog answers in one of several envelope shapes depending on
/// endpoint version. The shape is resolved once here, at the parse boundary;
/// everything downstream sees a flat list of raw records.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawCatalogResponse {
    DataWrapped { data: Vec<Value> },
    StrainsWrapped { strains: Vec<Value> },
    BareList(Vec<Value>),
    BareObject(Map<String, Value>),
}

impl RawCatalogResponse {
    /// Flatten the envelope into raw strain records.
    pub fn into_records(self) -> Vec<Value> {
        match self {
            RawCatalogResponse::DataWrapped { data } => data,
            RawCatalogResponse::StrainsWrapped { strains } => strains,
            RawCatalogResponse::BareList(records) => records,
            RawCatalogResponse::BareObject(record) => vec![Value::Object(record)],
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
