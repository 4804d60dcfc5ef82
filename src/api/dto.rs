//! Response Types
//!
//! Wire shapes of the workshop API. The envelope types keep the optional
//! `error` field so every backend implementation applies the same rule:
//! an `error` field or a missing result array means "no data".

use serde::{Deserialize, Deserializer, Serialize};

use super::ApiError;

/// One row of `/api/categories/top`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    #[serde(deserialize_with = "number")]
    pub total_spent: f64,
}

/// One row of `/api/categories/{category}/top`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantTotal {
    pub merchant: String,
    #[serde(deserialize_with = "number")]
    pub amount: f64,
}

/// One row of `/api/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub merchant: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(deserialize_with = "number")]
    pub amount: f64,
    /// Cosine distance in [0, 1]
    #[serde(deserialize_with = "number")]
    pub score: f64,
}

impl SearchHit {
    pub fn similarity(&self) -> u8 {
        similarity_percent(self.score)
    }
}

/// Convert a cosine distance into a similarity percentage
pub fn similarity_percent(score: f64) -> u8 {
    ((1.0 - score) * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoriesResponse {
    #[serde(default)]
    pub categories: Option<Vec<CategoryTotal>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CategoriesResponse {
    pub fn into_items(self) -> Result<Vec<CategoryTotal>, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::Reported(error));
        }
        self.categories.ok_or(ApiError::MissingField("categories"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MerchantsResponse {
    #[serde(default)]
    pub merchants: Option<Vec<MerchantTotal>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl MerchantsResponse {
    pub fn into_items(self) -> Result<Vec<MerchantTotal>, ApiError> {
        if let Some(error) = self.error {
            return Err(ApiError::Reported(error));
        }
        self.merchants.ok_or(ApiError::MissingField("merchants"))
    }
}

/// Body of `/api/search`
///
/// Kept whole (rather than collapsed into a `Result`) because a reported
/// error still produces a toast with the measured round-trip time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub count: Option<usize>,
    /// Server-side search time
    #[serde(default)]
    pub search_ms: f64,
    #[serde(default)]
    pub error: Option<String>,
}

impl SearchResponse {
    /// Result count as reported by the server, falling back to the rows
    pub fn count(&self) -> usize {
        self.count.unwrap_or(self.results.len())
    }
}

/// A response paired with its client-measured round-trip time
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    pub roundtrip_ms: u64,
}

/// Amounts and scores arrive as numbers or as numeric strings depending on
/// the module that stored them
fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
