//! Test doubles and common utilities for engine contract tests
//!
//! [`MockDnsApi`] serves zones and record sets from memory, pages them with
//! a configurable page size, and counts every call so tests can assert on
//! exactly which requests the engine made.

#![allow(dead_code)]

use async_trait::async_trait;
use dnswebhook_core::error::{Error, Result};
use dnswebhook_core::model::{
    CreateRecordSetPayload, Endpoint, PartialUpdateRecordSetPayload, RecordSet, RecordSetPage,
    RecordSetQuery, Zone, ZonePage, ZoneQuery,
};
use dnswebhook_core::{Context, DnsApi, ProviderConfig};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Project id used by every test
pub const PROJECT_ID: &str = "1234";

/// In-memory DNS API that tracks calls
pub struct MockDnsApi {
    zones: Vec<Zone>,
    record_sets: HashMap<String, Vec<RecordSet>>,
    page_size: usize,
    fail_zone_listing: bool,
    failing_zone_page: Option<u32>,
    failing_zones: HashSet<String>,
    failing_names: HashSet<String>,
    mutation_delay: Option<Duration>,

    list_zones_calls: AtomicUsize,
    list_record_sets_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,

    created: Mutex<Vec<(String, CreateRecordSetPayload)>>,
    updated: Mutex<Vec<(String, PartialUpdateRecordSetPayload)>>,
    deleted: Mutex<Vec<String>>,
    queries: Mutex<Vec<ZoneQuery>>,
}

impl MockDnsApi {
    pub fn new() -> Self {
        Self {
            zones: Vec::new(),
            record_sets: HashMap::new(),
            page_size: 100,
            fail_zone_listing: false,
            failing_zone_page: None,
            failing_zones: HashSet::new(),
            failing_names: HashSet::new(),
            mutation_delay: None,
            list_zones_calls: AtomicUsize::new(0),
            list_record_sets_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_zone(mut self, id: &str, dns_name: &str) -> Self {
        self.zones.push(Zone::new(id, dns_name));
        self
    }

    pub fn with_record_set(mut self, zone_id: &str, record_set: RecordSet) -> Self {
        self.record_sets
            .entry(zone_id.to_string())
            .or_default()
            .push(record_set);
        self
    }

    /// Items per page for both listings
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn failing_zone_listing(mut self) -> Self {
        self.fail_zone_listing = true;
        self
    }

    /// Only this page of every zone listing fails
    pub fn failing_zone_page(mut self, page: u32) -> Self {
        self.failing_zone_page = Some(page);
        self
    }

    pub fn failing_record_sets_of(mut self, zone_id: &str) -> Self {
        self.failing_zones.insert(zone_id.to_string());
        self
    }

    /// Mutations of record sets with this name return a 500
    pub fn failing_mutations_of(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_string());
        self
    }

    pub fn with_mutation_delay(mut self, delay: Duration) -> Self {
        self.mutation_delay = Some(delay);
        self
    }

    pub fn list_zones_calls(&self) -> usize {
        self.list_zones_calls.load(Ordering::SeqCst)
    }

    pub fn list_record_sets_calls(&self) -> usize {
        self.list_record_sets_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.create_calls() + self.update_calls() + self.delete_calls()
    }

    /// Zone id and payload of every successful create
    pub fn created(&self) -> Vec<(String, CreateRecordSetPayload)> {
        self.created.lock().unwrap().clone()
    }

    pub fn updated(&self) -> Vec<(String, PartialUpdateRecordSetPayload)> {
        self.updated.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn zone_queries(&self) -> Vec<ZoneQuery> {
        self.queries.lock().unwrap().clone()
    }

    fn page_of<T: Clone>(&self, items: &[T], page: u32) -> (Vec<T>, u32) {
        let total_pages = items.len().div_ceil(self.page_size) as u32;
        let start = (page as usize).saturating_sub(1) * self.page_size;
        let items = items
            .iter()
            .skip(start)
            .take(self.page_size)
            .cloned()
            .collect();
        (items, total_pages)
    }

    fn record_set_by_id(&self, record_set_id: &str) -> Option<&RecordSet> {
        self.record_sets
            .values()
            .flatten()
            .find(|rrset| rrset.id == record_set_id)
    }

    async fn mutation(&self, name: &str) -> Result<()> {
        if let Some(delay) = self.mutation_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_names.contains(name) {
            return Err(Error::upstream(500, format!("cannot mutate {}", name)));
        }
        Ok(())
    }
}

#[async_trait]
impl DnsApi for MockDnsApi {
    async fn list_zones(&self, ctx: &Context, _project_id: &str, query: &ZoneQuery) -> Result<ZonePage> {
        self.list_zones_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        ctx.run(async {
            if self.fail_zone_listing {
                return Err(Error::upstream(500, "zone listing failed"));
            }
            if self.failing_zone_page == Some(query.page) {
                return Err(Error::upstream(500, format!("zone page {} failed", query.page)));
            }

            let zones: Vec<Zone> = self
                .zones
                .iter()
                .filter(|zone| match &query.dns_name_like {
                    Some(pattern) => zone.dns_name.contains(pattern.as_str()),
                    None => true,
                })
                .cloned()
                .collect();

            let (zones, total_pages) = self.page_of(&zones, query.page);
            Ok(ZonePage { zones, total_pages })
        })
        .await
    }

    async fn list_record_sets(
        &self,
        ctx: &Context,
        _project_id: &str,
        zone_id: &str,
        query: &RecordSetQuery,
    ) -> Result<RecordSetPage> {
        self.list_record_sets_calls.fetch_add(1, Ordering::SeqCst);

        ctx.run(async {
            if self.failing_zones.contains(zone_id) {
                return Err(Error::upstream(500, format!("listing {} failed", zone_id)));
            }

            let record_sets: Vec<RecordSet> = self
                .record_sets
                .get(zone_id)
                .map(|rrsets| {
                    rrsets
                        .iter()
                        .filter(|rrset| match (&query.name_like, &rrset.name) {
                            (Some(pattern), Some(name)) => name.contains(pattern.as_str()),
                            (Some(_), None) => false,
                            (None, _) => true,
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            let (rr_sets, total_pages) = self.page_of(&record_sets, query.page);
            Ok(RecordSetPage { rr_sets, total_pages })
        })
        .await
    }

    async fn create_record_set(
        &self,
        ctx: &Context,
        _project_id: &str,
        zone_id: &str,
        payload: &CreateRecordSetPayload,
    ) -> Result<RecordSet> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        ctx.run(async {
            self.mutation(&payload.name).await?;
            self.created
                .lock()
                .unwrap()
                .push((zone_id.to_string(), payload.clone()));
            Ok(RecordSet::new(
                format!("{}-new", zone_id),
                payload.name.clone(),
                payload.record_type.clone(),
                payload.ttl,
                &[],
            ))
        })
        .await
    }

    async fn partial_update_record_set(
        &self,
        ctx: &Context,
        _project_id: &str,
        _zone_id: &str,
        record_set_id: &str,
        payload: &PartialUpdateRecordSetPayload,
    ) -> Result<RecordSet> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        ctx.run(async {
            self.mutation(&payload.name).await?;
            self.updated
                .lock()
                .unwrap()
                .push((record_set_id.to_string(), payload.clone()));
            self.record_set_by_id(record_set_id)
                .cloned()
                .ok_or_else(|| Error::upstream(404, "record set not found"))
        })
        .await
    }

    async fn delete_record_set(
        &self,
        ctx: &Context,
        _project_id: &str,
        _zone_id: &str,
        record_set_id: &str,
    ) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        ctx.run(async {
            let name = self
                .record_set_by_id(record_set_id)
                .and_then(|rrset| rrset.name.clone())
                .unwrap_or_default();
            self.mutation(&name).await?;
            self.deleted.lock().unwrap().push(record_set_id.to_string());
            Ok(())
        })
        .await
    }

    fn api_name(&self) -> &'static str {
        "mock"
    }
}

/// Provider config for [`PROJECT_ID`] with a small pool
pub fn test_config() -> ProviderConfig {
    ProviderConfig::new(PROJECT_ID).with_workers(4)
}

/// The mock as the trait object the engine consumes
pub fn as_api(mock: &Arc<MockDnsApi>) -> Arc<dyn DnsApi> {
    Arc::clone(mock) as Arc<dyn DnsApi>
}

/// Shorthand for an A endpoint
pub fn a_record(name: &str, target: &str) -> Endpoint {
    Endpoint::new(name, "A", vec![target.to_string()])
}
