// # DNS API Trait
//
// Defines the minimal contract of the remote authoritative DNS service.
//
// ## Implementations
//
// - STACKIT DNS: `dnswebhook-provider-stackit` crate
//
// ## Usage
//
// ```rust,ignore
// use dnswebhook_core::{Context, DnsApi};
// use dnswebhook_core::model::{ZoneQuery, PAGE_SIZE};
//
// let page = api
//     .list_zones(&ctx, "project-id", &ZoneQuery {
//         active_only: true,
//         dns_name_like: None,
//         page: 1,
//         page_size: PAGE_SIZE,
//     })
//     .await?;
// ```

use crate::context::Context;
use crate::model::{
    CreateRecordSetPayload, PartialUpdateRecordSetPayload, RecordSet, RecordSetPage,
    RecordSetQuery, ZonePage, ZoneQuery,
};
use async_trait::async_trait;

/// Remote DNS API used by the resolvers and workers
///
/// # Thread Safety
///
/// One client is shared by every worker of an operation, so implementations
/// must be safe for concurrent use.
///
/// # Single-shot
///
/// Each method issues exactly one request and returns its outcome. Retries,
/// pagination and fan-out are owned by the engine. Every request must honor
/// `ctx` and fail with a context error once it is done.
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// List one page of zones of a project
    async fn list_zones(
        &self,
        ctx: &Context,
        project_id: &str,
        query: &ZoneQuery,
    ) -> Result<ZonePage, crate::Error>;

    /// List one page of record sets of a zone
    async fn list_record_sets(
        &self,
        ctx: &Context,
        project_id: &str,
        zone_id: &str,
        query: &RecordSetQuery,
    ) -> Result<RecordSetPage, crate::Error>;

    /// Create a record set in a zone
    async fn create_record_set(
        &self,
        ctx: &Context,
        project_id: &str,
        zone_id: &str,
        payload: &CreateRecordSetPayload,
    ) -> Result<RecordSet, crate::Error>;

    /// Overwrite name, TTL and records of an existing record set
    async fn partial_update_record_set(
        &self,
        ctx: &Context,
        project_id: &str,
        zone_id: &str,
        record_set_id: &str,
        payload: &PartialUpdateRecordSetPayload,
    ) -> Result<RecordSet, crate::Error>;

    /// Delete a record set
    async fn delete_record_set(
        &self,
        ctx: &Context,
        project_id: &str,
        zone_id: &str,
        record_set_id: &str,
    ) -> Result<(), crate::Error>;

    /// Get the API name (for logging/debugging)
    fn api_name(&self) -> &'static str;
}
