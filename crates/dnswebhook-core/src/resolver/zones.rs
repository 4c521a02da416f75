//! Zone listing

use super::fetch_all_pages;
use crate::context::Context;
use crate::error::Result;
use crate::model::{DomainFilter, PAGE_SIZE, Zone, ZoneQuery};
use crate::traits::DnsApi;
use std::sync::Arc;
use tracing::debug;

/// Fetches the zones an operation works on
#[derive(Clone)]
pub struct ZoneResolver {
    api: Arc<dyn DnsApi>,
    project_id: String,
    domain_filter: DomainFilter,
}

impl ZoneResolver {
    pub fn new(api: Arc<dyn DnsApi>, project_id: impl Into<String>, domain_filter: DomainFilter) -> Self {
        Self {
            api,
            project_id: project_id.into(),
            domain_filter,
        }
    }

    /// All active zones, or with a domain filter one listing per pattern,
    /// concatenated in filter order.
    ///
    /// Zones matched by several overlapping patterns appear once per pattern.
    pub async fn zones(&self, ctx: &Context) -> Result<Vec<Zone>> {
        if self.domain_filter.is_empty() {
            return self.fetch_zones(ctx, None).await;
        }

        let mut result = Vec::new();
        for filter in &self.domain_filter.filters {
            let zones = self.fetch_zones(ctx, Some(filter)).await?;
            result.extend(zones);
        }

        Ok(result)
    }

    async fn fetch_zones(&self, ctx: &Context, dns_name_like: Option<&str>) -> Result<Vec<Zone>> {
        let zones = fetch_all_pages(|page| {
            let query = ZoneQuery {
                active_only: true,
                dns_name_like: dns_name_like.map(str::to_string),
                page,
                page_size: PAGE_SIZE,
            };
            async move {
                let response = self.api.list_zones(ctx, &self.project_id, &query).await?;
                Ok((response.zones, response.total_pages))
            }
        })
        .await?;

        debug!(
            filter = dns_name_like.unwrap_or(""),
            count = zones.len(),
            "fetched zones"
        );

        Ok(zones)
    }
}
