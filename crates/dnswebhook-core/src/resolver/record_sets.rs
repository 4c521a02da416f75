//! Record-set listing and lookup for mutations

use super::fetch_all_pages;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::matcher::{find_best_matching_zone, find_rrset};
use crate::model::{Endpoint, PAGE_SIZE, RecordSet, RecordSetQuery, Zone};
use crate::traits::DnsApi;
use std::sync::Arc;
use tracing::{error, info};

/// Fetches record sets of a zone
#[derive(Clone)]
pub struct RecordSetResolver {
    api: Arc<dyn DnsApi>,
    project_id: String,
}

impl RecordSetResolver {
    pub fn new(api: Arc<dyn DnsApi>, project_id: impl Into<String>) -> Self {
        Self {
            api,
            project_id: project_id.into(),
        }
    }

    /// All active record sets of `zone_id`, optionally restricted to names
    /// like `name_filter`
    pub async fn fetch_records(
        &self,
        ctx: &Context,
        zone_id: &str,
        name_filter: Option<&str>,
    ) -> Result<Vec<RecordSet>> {
        fetch_all_pages(|page| {
            let query = RecordSetQuery {
                active_only: true,
                name_like: name_filter.map(str::to_string),
                page,
                page_size: PAGE_SIZE,
            };
            async move {
                let response = self
                    .api
                    .list_record_sets(ctx, &self.project_id, zone_id, &query)
                    .await?;
                Ok((response.rr_sets, response.total_pages))
            }
        })
        .await
    }

    /// Locate the zone and the existing record set an update or delete of
    /// `endpoint` targets.
    ///
    /// `endpoint` is expected to be normalized already.
    pub async fn zone_and_record_set_for_mutation(
        &self,
        ctx: &Context,
        endpoint: &Endpoint,
        zones: &[Zone],
    ) -> Result<(Zone, RecordSet)> {
        let Some(zone) = find_best_matching_zone(&endpoint.dns_name, zones) else {
            error!(name = %endpoint.dns_name, "record set name contains no zone dns name");
            return Err(Error::zone_not_found(&endpoint.dns_name));
        };

        let record_sets = self
            .fetch_records(ctx, &zone.id, Some(&endpoint.dns_name))
            .await?;

        let Some(record_set) = find_rrset(&endpoint.dns_name, &endpoint.record_type, &record_sets)
        else {
            info!(name = %endpoint.dns_name, "record not found on record sets");
            return Err(Error::record_set_not_found(
                &endpoint.dns_name,
                &endpoint.record_type,
            ));
        };

        Ok((zone.clone(), record_set.clone()))
    }
}
