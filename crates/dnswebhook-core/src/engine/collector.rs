//! Record collection
//!
//! Fetches the record sets of every zone concurrently and flattens them into
//! endpoints. The first failing zone stops the pool from starting further
//! zones and becomes the result; partial results are discarded.

use super::pool::{FailurePolicy, WorkerPool};
use crate::context::Context;
use crate::error::Result;
use crate::mapper::collect_endpoints;
use crate::model::{Endpoint, Zone};
use crate::resolver::RecordSetResolver;
use tracing::{debug, error};

/// Gathers the endpoints served by a set of zones
#[derive(Clone)]
pub struct RecordsCollector {
    record_sets: RecordSetResolver,
    pool: WorkerPool,
}

impl RecordsCollector {
    pub fn new(record_sets: RecordSetResolver, workers: usize) -> Self {
        Self {
            record_sets,
            pool: WorkerPool::new(workers),
        }
    }

    /// Endpoints of every zone with a non-empty id.
    ///
    /// Order across zones follows completion order.
    pub async fn collect(&self, ctx: &Context, zones: &[Zone]) -> Result<Vec<Endpoint>> {
        let zone_ids: Vec<String> = zones
            .iter()
            .filter(|zone| !zone.id.is_empty())
            .map(|zone| zone.id.clone())
            .collect();

        let record_sets = self.record_sets.clone();
        let results = self
            .pool
            .run(ctx, zone_ids, FailurePolicy::Halt, move |ctx, zone_id| {
                let record_sets = record_sets.clone();
                async move {
                    let rrsets = record_sets.fetch_records(&ctx, &zone_id, None).await?;
                    debug!(zone = %zone_id, count = rrsets.len(), "fetched record sets");
                    Ok(collect_endpoints(&rrsets))
                }
            })
            .await;

        let mut endpoints = Vec::new();
        let mut first_error = None;
        for result in results {
            match result {
                Ok(batch) => endpoints.extend(batch),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            error!(error = %e, "error collecting records");
            return Err(e);
        }

        Ok(endpoints)
    }
}
