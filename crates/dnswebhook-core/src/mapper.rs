//! Conversion between endpoints and record sets
//!
//! Endpoints are normalized (trailing dot, default TTL) before they are
//! matched or sent, and record sets fetched from the API are turned back into
//! endpoints for external-dns.

use crate::model::{
    CreateRecordSetPayload, DEFAULT_TTL, Endpoint, PartialUpdateRecordSetPayload, RecordPayload,
    RecordSet, is_supported_record_type,
};

/// Append a dot unless `name` already ends with one
pub fn append_dot_if_missing(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Dot-terminate the name and default a zero TTL. Idempotent.
pub fn normalize(endpoint: &mut Endpoint) {
    endpoint.dns_name = append_dot_if_missing(&endpoint.dns_name);

    if endpoint.record_ttl == 0 {
        endpoint.record_ttl = DEFAULT_TTL;
    }
}

fn record_payloads(endpoint: &Endpoint) -> Vec<RecordPayload> {
    endpoint
        .targets
        .iter()
        .map(|target| RecordPayload {
            content: target.clone(),
        })
        .collect()
}

/// Body for creating a record set from an endpoint
pub fn to_create_payload(endpoint: &Endpoint) -> CreateRecordSetPayload {
    CreateRecordSetPayload {
        name: endpoint.dns_name.clone(),
        records: record_payloads(endpoint),
        ttl: endpoint.record_ttl,
        record_type: endpoint.record_type.clone(),
    }
}

/// Body for overwriting a record set with an endpoint
pub fn to_update_payload(endpoint: &Endpoint) -> PartialUpdateRecordSetPayload {
    PartialUpdateRecordSetPayload {
        name: endpoint.dns_name.clone(),
        records: record_payloads(endpoint),
        ttl: endpoint.record_ttl,
    }
}

/// Endpoints for one record set: one per record, each carrying that
/// record's content as its target.
///
/// Record sets missing name, type, TTL or records, and record sets of a type
/// external-dns cannot represent, yield nothing. Records without content are
/// dropped.
pub fn endpoints_from_record_set(record_set: &RecordSet) -> Vec<Endpoint> {
    let (Some(name), Some(record_type), Some(ttl), Some(records)) = (
        record_set.name.as_deref(),
        record_set.record_type.as_deref(),
        record_set.ttl,
        record_set.records.as_deref(),
    ) else {
        return Vec::new();
    };

    if !is_supported_record_type(record_type) {
        return Vec::new();
    }

    records
        .iter()
        .filter_map(|record| record.content.as_ref())
        .map(|content| Endpoint::with_ttl(name, record_type, ttl, vec![content.clone()]))
        .collect()
}

/// Flatten a zone's record sets into endpoints, preserving order
pub fn collect_endpoints(record_sets: &[RecordSet]) -> Vec<Endpoint> {
    record_sets
        .iter()
        .flat_map(endpoints_from_record_set)
        .collect()
}
