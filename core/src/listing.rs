//! Helpers over the `personalidade` search result.
//!
//! A listing is `{"data": [{"uuid": .., "dataAtualizacao": .., ...}]}`. Only
//! the two fields the batch jobs need are typed, the rest is kept verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub uuid: String,
    #[serde(rename = "dataAtualizacao", default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub data: Vec<ListingEntry>,
}

impl Listing {
    pub fn from_value(value: Value) -> Result<Listing, ApiError> {
        serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("listing: {e}")))
    }

    pub fn from_json(json: &str) -> Result<Listing, ApiError> {
        serde_json::from_str(json).map_err(|e| ApiError::Decode(format!("listing: {e}")))
    }

    /// Person identifiers in listing order.
    pub fn uuids(&self) -> Vec<&str> {
        self.data.iter().map(|e| e.uuid.as_str()).collect()
    }

    /// Last update date recorded for `uuid`, if the entry exists and has one.
    pub fn updated_at(&self, uuid: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|e| e.uuid == uuid)
            .and_then(|e| e.updated_at.as_deref())
    }
}
