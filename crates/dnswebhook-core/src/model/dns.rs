//! Remote DNS API resources
//!
//! Field names follow the STACKIT DNS REST API. Record-set fields are
//! optional because the API does not guarantee them; incomplete record sets
//! are skipped when converted to endpoints.

use serde::{Deserialize, Serialize};

/// Page size used for every listing call
pub const PAGE_SIZE: u32 = 10_000;

/// An authoritative zone owned by the project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub dns_name: String,
}

impl Zone {
    pub fn new(id: impl Into<String>, dns_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dns_name: dns_name.into(),
        }
    }
}

/// One target value within a record set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub content: Option<String>,
}

impl Record {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

/// A named, typed group of records within one zone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub records: Option<Vec<Record>>,
}

impl RecordSet {
    /// Create a fully populated record set
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: u32,
        contents: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            record_type: Some(record_type.into()),
            ttl: Some(ttl),
            records: Some(contents.iter().map(|c| Record::new(*c)).collect()),
        }
    }

    /// True when name and type equal the given values
    pub fn is(&self, name: &str, record_type: &str) -> bool {
        self.name.as_deref() == Some(name) && self.record_type.as_deref() == Some(record_type)
    }
}

/// Record entry of a create or update payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    pub content: String,
}

/// Body of `POST .../rrsets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRecordSetPayload {
    pub name: String,
    pub records: Vec<RecordPayload>,
    pub ttl: u32,
    #[serde(rename = "type")]
    pub record_type: String,
}

/// Body of `PATCH .../rrsets/{rrSetId}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialUpdateRecordSetPayload {
    pub name: String,
    pub records: Vec<RecordPayload>,
    pub ttl: u32,
}

/// Query of a zone listing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneQuery {
    pub active_only: bool,
    pub dns_name_like: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

/// Query of a record-set listing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetQuery {
    pub active_only: bool,
    pub name_like: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

/// One page of a zone listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonePage {
    pub zones: Vec<Zone>,
    pub total_pages: u32,
}

/// One page of a record-set listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSetPage {
    pub rr_sets: Vec<RecordSet>,
    pub total_pages: u32,
}
