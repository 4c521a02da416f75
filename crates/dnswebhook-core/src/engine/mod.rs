//! Webhook engine
//!
//! The WebhookProvider is responsible for:
//! - Listing the zones an operation works on
//! - Collecting the records of those zones
//! - Dispatching a change set as one concurrent task per endpoint
//!
//! ## Architecture
//!
//! ```text
//!                        ┌──────────────────┐
//!   records / apply ───▶ │ WebhookProvider  │
//!                        └──────────────────┘
//!                                 │
//!         ┌───────────────────────┼───────────────────────┐
//!         │                       │                       │
//!         ▼                       ▼                       ▼
//! ┌──────────────┐       ┌─────────────────┐     ┌─────────────────┐
//! │ ZoneResolver │       │ RecordsCollector│     │ ChangeExecutor  │
//! │ (zones)      │       │ (read fan-out)  │     │ (write fan-out) │
//! └──────────────┘       └─────────────────┘     └─────────────────┘
//!                                 │                       │
//!                                 └──────── WorkerPool ───┘
//! ```
//!
//! ## Apply Flow
//!
//! 1. Fetch zones once; a failure aborts before any mutation
//! 2. Build one task per create, update (new side) and delete endpoint
//! 3. Run tasks on a fresh pool of `workers` workers
//! 4. Return the first error, after every task has finished

pub mod collector;
pub mod executor;
pub mod pool;

pub use collector::RecordsCollector;
pub use executor::{ChangeAction, ChangeExecutor, ChangeTask, TaskOutcome, build_tasks};
pub use pool::{FailurePolicy, WorkerPool};

use crate::config::ProviderConfig;
use crate::context::Context;
use crate::error::Result;
use crate::model::{Changes, DomainFilter, Endpoint};
use crate::resolver::{RecordSetResolver, ZoneResolver};
use crate::traits::{DnsApi, Provider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Webhook provider backed by a remote DNS API
///
/// ## Threading
///
/// Every call builds its own worker pool, so concurrent `records` and
/// `apply_changes` calls share nothing but the API client.
pub struct WebhookProvider {
    config: ProviderConfig,
    zones: ZoneResolver,
    collector: RecordsCollector,
    executor: ChangeExecutor,
}

impl WebhookProvider {
    /// Create a new provider
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if `config` is invalid.
    pub fn new(api: Arc<dyn DnsApi>, config: ProviderConfig) -> Result<Self> {
        config.validate()?;

        info!(
            api = api.api_name(),
            project_id = %config.project_id,
            workers = config.workers,
            dry_run = config.dry_run,
            "creating webhook provider"
        );

        let zones = ZoneResolver::new(
            Arc::clone(&api),
            config.project_id.clone(),
            config.domain_filter.clone(),
        );
        let collector = RecordsCollector::new(
            RecordSetResolver::new(Arc::clone(&api), config.project_id.clone()),
            config.workers,
        );
        let executor = ChangeExecutor::new(api, config.project_id.clone(), config.workers, config.dry_run);

        Ok(Self {
            config,
            zones,
            collector,
            executor,
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

#[async_trait]
impl Provider for WebhookProvider {
    async fn records(&self, ctx: &Context) -> Result<Vec<Endpoint>> {
        let zones = self.zones.zones(ctx).await.inspect_err(|e| {
            error!(error = %e, "error fetching zones");
        })?;

        let endpoints = self.collector.collect(ctx, &zones).await?;
        debug!(zones = zones.len(), endpoints = endpoints.len(), "records collected");

        Ok(endpoints)
    }

    async fn apply_changes(&self, ctx: &Context, changes: Changes) -> Result<()> {
        if changes.is_empty() {
            debug!("empty change set");
            return Ok(());
        }

        for endpoint in &changes.update_old {
            debug!(record = %endpoint.dns_name, record_type = %endpoint.record_type, "update old");
        }
        for endpoint in &changes.delete {
            debug!(record = %endpoint.dns_name, record_type = %endpoint.record_type, "delete");
        }

        let zones = self.zones.zones(ctx).await.inspect_err(|e| {
            error!(error = %e, "error fetching zones, no changes applied");
        })?;

        info!(
            creates = changes.create.len(),
            updates = changes.update_new.len(),
            deletes = changes.delete.len(),
            zones = zones.len(),
            "applying changes"
        );

        self.executor.apply(ctx, changes, Arc::new(zones)).await
    }

    fn domain_filter(&self) -> DomainFilter {
        self.config.domain_filter.clone()
    }
}
