//! Data model
//!
//! - [`endpoint`]: external-dns facing records, change sets and domain filters
//! - [`dns`]: zones, record sets and payloads of the remote DNS API

pub mod dns;
pub mod endpoint;

pub use dns::{
    CreateRecordSetPayload, PAGE_SIZE, PartialUpdateRecordSetPayload, Record, RecordPayload,
    RecordSet, RecordSetPage, RecordSetQuery, Zone, ZonePage, ZoneQuery,
};
pub use endpoint::{
    Changes, DEFAULT_TTL, DomainFilter, Endpoint, ProviderSpecificProperty,
    is_supported_record_type,
};
