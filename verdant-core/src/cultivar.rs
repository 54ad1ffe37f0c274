//! Normalized cultivar and breeder records
//!
//! These are the value objects the catalog client hands to the persistence
//! layer. They are created fresh on every normalization call and carry no
//! identity across calls.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// External-id namespace for records sourced from the cannabis catalog API.
pub const EXTERNAL_ID_CANNABIS_API: &str = "cannabis_api";

/// Indica/sativa split, each in 0..=100.
///
/// The pair need not sum to 100: a pure ruderalis maps to `(0, 0)` and an
/// annotated split only has to sum to at most 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genetics {
    pub indica: u8,
    pub sativa: u8,
}

impl Genetics {
    pub const INDICA: Genetics = Genetics { indica: 100, sativa: 0 };
    pub const SATIVA: Genetics = Genetics { indica: 0, sativa: 100 };
    pub const HYBRID: Genetics = Genetics { indica: 50, sativa: 50 };
    pub const RUDERALIS: Genetics = Genetics { indica: 0, sativa: 0 };
}

impl Default for Genetics {
    /// Unknown genetics are treated as an even hybrid.
    fn default() -> Self {
        Genetics::HYBRID
    }
}

/// A cannabinoid (THC/CBD) value as the source reported it.
///
/// `Unparsed` means the source mentioned the attribute but the value could
/// not be read as a single number (typically a range like "18-22%"); it
/// serializes as an explicit JSON `null`. A record whose source never
/// mentioned the attribute omits the field entirely instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CannabinoidContent {
    Unparsed,
    Value(f64),
}

impl CannabinoidContent {
    /// The parsed percentage, if one was readable.
    pub fn value(&self) -> Option<f64> {
        match self {
            CannabinoidContent::Unparsed => None,
            CannabinoidContent::Value(v) => Some(*v),
        }
    }
}

impl From<Option<f64>> for CannabinoidContent {
    fn from(parsed: Option<f64>) -> Self {
        match parsed {
            Some(v) => CannabinoidContent::Value(v),
            None => CannabinoidContent::Unparsed,
        }
    }
}

impl Serialize for CannabinoidContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CannabinoidContent::Unparsed => serializer.serialize_none(),
            CannabinoidContent::Value(v) => serializer.serialize_f64(*v),
        }
    }
}

impl<'de> Deserialize<'de> for CannabinoidContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.into())
    }
}

/// Normalized cultivar record produced from a raw catalog strain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultivarRecord {
    pub name: String,
    #[serde(flatten)]
    pub genetics: Genetics,
    pub autoflower: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage_json: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flowering_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Present iff the source carried a THC field; see [`CannabinoidContent`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thc_content: Option<CannabinoidContent>,
    /// Present iff the source carried a CBD field; see [`CannabinoidContent`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cbd_content: Option<CannabinoidContent>,
    pub external_id: String,
    pub external_id_value: String,
}

impl CultivarRecord {
    /// A record with only the required fields set.
    pub fn new(
        name: impl Into<String>,
        genetics: Genetics,
        external_id_value: impl Into<String>,
    ) -> Self {
        CultivarRecord {
            name: name.into(),
            genetics,
            autoflower: false,
            parent_1: None,
            parent_2: None,
            lineage_json: None,
            flowering_type: None,
            cycle_time: None,
            seed_count: None,
            url: None,
            description: None,
            thc_content: None,
            cbd_content: None,
            external_id: EXTERNAL_ID_CANNABIS_API.to_string(),
            external_id_value: external_id_value.into(),
        }
    }
}

/// Normalized breeder record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreederRecord {
    pub name: String,
    /// Title-cased country name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Website with an http(s) scheme guaranteed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seedfinder_id: Option<String>,
}

// =============================================================================
// TESTS
// =============================================================================
