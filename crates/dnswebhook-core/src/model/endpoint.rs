//! Provider-independent DNS records as exchanged with external-dns
//!
//! The JSON shapes follow the external-dns webhook protocol so these types
//! can be (de)serialized straight off the wire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// TTL applied when an endpoint carries none
pub const DEFAULT_TTL: u32 = 300;

/// Record types that can be represented as an [`Endpoint`]
pub const SUPPORTED_RECORD_TYPES: &[&str] = &["A", "AAAA", "CNAME", "MX", "NS", "SRV", "TXT"];

/// Check whether a record type can be represented as an [`Endpoint`]
pub fn is_supported_record_type(record_type: &str) -> bool {
    SUPPORTED_RECORD_TYPES.contains(&record_type)
}

/// Provider-specific key/value attached to an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpecificProperty {
    pub name: String,
    pub value: String,
}

/// A DNS record in external-dns' generic representation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully qualified record name
    #[serde(default)]
    pub dns_name: String,

    /// Ordered record contents
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<String>,

    /// Record type (A, AAAA, CNAME, ...)
    #[serde(default)]
    pub record_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub set_identifier: String,

    /// TTL in seconds; 0 means unset
    #[serde(default, rename = "recordTTL", skip_serializing_if = "is_zero")]
    pub record_ttl: u32,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider_specific: Vec<ProviderSpecificProperty>,
}

fn is_zero(ttl: &u32) -> bool {
    *ttl == 0
}

impl Endpoint {
    /// Create an endpoint without TTL
    pub fn new(
        dns_name: impl Into<String>,
        record_type: impl Into<String>,
        targets: Vec<String>,
    ) -> Self {
        Self {
            dns_name: dns_name.into(),
            record_type: record_type.into(),
            targets,
            ..Self::default()
        }
    }

    /// Create an endpoint with an explicit TTL
    pub fn with_ttl(
        dns_name: impl Into<String>,
        record_type: impl Into<String>,
        ttl: u32,
        targets: Vec<String>,
    ) -> Self {
        Self {
            record_ttl: ttl,
            ..Self::new(dns_name, record_type, targets)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} IN {} {:?}",
            self.dns_name, self.record_ttl, self.record_type, self.targets
        )
    }
}

/// The set of changes external-dns asks the provider to apply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Changes {
    /// Records to create
    #[serde(default, deserialize_with = "null_as_empty")]
    pub create: Vec<Endpoint>,

    /// Previous state of updated records, informational only
    #[serde(default, deserialize_with = "null_as_empty")]
    pub update_old: Vec<Endpoint>,

    /// Desired state of updated records
    #[serde(default, deserialize_with = "null_as_empty")]
    pub update_new: Vec<Endpoint>,

    /// Records to delete
    #[serde(default, deserialize_with = "null_as_empty")]
    pub delete: Vec<Endpoint>,
}

impl Changes {
    /// Number of mutations this change set asks for
    pub fn mutation_count(&self) -> usize {
        self.create.len() + self.update_new.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutation_count() == 0
    }
}

// external-dns encodes empty slices as `null`
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Endpoint>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Endpoint>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Zone name patterns restricting which zones are considered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainFilter {
    #[serde(default, rename = "include", alias = "filters")]
    pub filters: Vec<String>,
}

impl DomainFilter {
    pub fn new(filters: Vec<String>) -> Self {
        Self { filters }
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
