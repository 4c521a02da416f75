//! Common utilities for client contract tests
//!
//! Every test runs against its own `wiremock` server standing in for the
//! STACKIT DNS API.

#![allow(dead_code)]

use dnswebhook_core::config::ApiConfig;
use dnswebhook_core::model::{PAGE_SIZE, RecordSetQuery, ZoneQuery};
use dnswebhook_provider_stackit::StackitDnsClient;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";
pub const PROJECT_ID: &str = "1234";

/// Client pointed at `server` with a static token
pub fn client_for(server: &MockServer) -> StackitDnsClient {
    let config = ApiConfig::from_options(&server.uri(), Some(TOKEN), None)
        .expect("valid config")
        .with_timeout(Duration::from_secs(2));
    StackitDnsClient::new(&config).expect("client builds")
}

pub fn zones_path() -> String {
    format!("/v1/projects/{}/zones", PROJECT_ID)
}

pub fn rrsets_path(zone_id: &str) -> String {
    format!("/v1/projects/{}/zones/{}/rrsets", PROJECT_ID, zone_id)
}

pub fn zone_query(page: u32, dns_name_like: Option<&str>) -> ZoneQuery {
    ZoneQuery {
        active_only: true,
        dns_name_like: dns_name_like.map(str::to_string),
        page,
        page_size: PAGE_SIZE,
    }
}

pub fn rrset_query(page: u32, name_like: Option<&str>) -> RecordSetQuery {
    RecordSetQuery {
        active_only: true,
        name_like: name_like.map(str::to_string),
        page,
        page_size: PAGE_SIZE,
    }
}

/// A zone listing page as the API returns it
pub fn zones_body(zones: &[(&str, &str)], total_pages: u32) -> Value {
    json!({
        "zones": zones
            .iter()
            .map(|(id, dns_name)| json!({ "id": id, "dnsName": dns_name, "state": "CREATE_SUCCEEDED" }))
            .collect::<Vec<_>>(),
        "totalPages": total_pages,
        "totalItems": zones.len(),
        "itemsPerPage": PAGE_SIZE,
    })
}

/// A record-set listing page with single-record A sets
pub fn rrsets_body(rrsets: &[(&str, &str, &str)], total_pages: u32) -> Value {
    json!({
        "rrSets": rrsets
            .iter()
            .map(|(id, name, content)| json!({
                "id": id,
                "name": name,
                "type": "A",
                "ttl": 300,
                "active": true,
                "records": [{ "content": content, "id": format!("{}-rec", id) }],
            }))
            .collect::<Vec<_>>(),
        "totalPages": total_pages,
    })
}
