//! Change execution
//!
//! Turns a change set into one task per endpoint and applies the tasks
//! concurrently on a [`WorkerPool`].
//!
//! ## Task lifecycle
//!
//! ```text
//! Pending → Resolving (zone, then record set for update/delete)
//!         → Skipped (dry run)
//!         → Mutating → Succeeded | Failed
//! ```
//!
//! Failures do not stop sibling tasks and nothing is rolled back or retried.
//! The first failure in completion order becomes the result of the batch.

use super::pool::{FailurePolicy, WorkerPool};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::mapper::{normalize, to_create_payload, to_update_payload};
use crate::matcher::find_best_matching_zone;
use crate::model::{Changes, Endpoint, Zone};
use crate::resolver::RecordSetResolver;
use crate::traits::DnsApi;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Mutation requested for one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeAction::Create => "CREATE",
            ChangeAction::Update => "UPDATE",
            ChangeAction::Delete => "DELETE",
        })
    }
}

/// Unit of work handed to a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTask {
    pub action: ChangeAction,
    pub endpoint: Endpoint,
}

impl ChangeTask {
    pub fn new(action: ChangeAction, endpoint: Endpoint) -> Self {
        Self { action, endpoint }
    }
}

/// How a task that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The remote API call was made
    Applied,
    /// Dry run: resolved and logged, not sent
    Skipped,
}

/// Build the tasks of a change set: creates, then updates, then deletes.
///
/// `update_old` carries no work.
pub fn build_tasks(changes: Changes) -> Vec<ChangeTask> {
    let Changes {
        create,
        update_new,
        delete,
        ..
    } = changes;

    let mut tasks = Vec::with_capacity(create.len() + update_new.len() + delete.len());
    tasks.extend(create.into_iter().map(|ep| ChangeTask::new(ChangeAction::Create, ep)));
    tasks.extend(update_new.into_iter().map(|ep| ChangeTask::new(ChangeAction::Update, ep)));
    tasks.extend(delete.into_iter().map(|ep| ChangeTask::new(ChangeAction::Delete, ep)));
    tasks
}

/// Applies change sets against the remote API
#[derive(Clone)]
pub struct ChangeExecutor {
    api: Arc<dyn DnsApi>,
    record_sets: RecordSetResolver,
    project_id: String,
    dry_run: bool,
    pool: WorkerPool,
}

impl ChangeExecutor {
    pub fn new(
        api: Arc<dyn DnsApi>,
        project_id: impl Into<String>,
        workers: usize,
        dry_run: bool,
    ) -> Self {
        let project_id = project_id.into();
        Self {
            record_sets: RecordSetResolver::new(Arc::clone(&api), project_id.clone()),
            api,
            project_id,
            dry_run,
            pool: WorkerPool::new(workers),
        }
    }

    /// Apply every mutation of `changes` against `zones`.
    ///
    /// All tasks run to completion (or are skipped after cancellation);
    /// the first error observed is returned.
    pub async fn apply(&self, ctx: &Context, changes: Changes, zones: Arc<Vec<Zone>>) -> Result<()> {
        let tasks = build_tasks(changes);
        if tasks.is_empty() {
            debug!("no changes to apply");
            return Ok(());
        }

        let total = tasks.len();
        let executor = self.clone();
        let results = self
            .pool
            .run(ctx, tasks, FailurePolicy::Continue, move |ctx, task| {
                let executor = executor.clone();
                let zones = Arc::clone(&zones);
                async move { executor.execute(&ctx, task, &zones).await }
            })
            .await;

        let mut applied = 0;
        let mut skipped = 0;
        let mut first_error = None;
        for result in results {
            match result {
                Ok(TaskOutcome::Applied) => applied += 1,
                Ok(TaskOutcome::Skipped) => skipped += 1,
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        info!(total, applied, skipped, failed = total - applied - skipped, "changes processed");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Run one task
    pub async fn execute(&self, ctx: &Context, task: ChangeTask, zones: &[Zone]) -> Result<TaskOutcome> {
        let ChangeTask {
            action,
            mut endpoint,
        } = task;
        normalize(&mut endpoint);

        match action {
            ChangeAction::Create => self.create_rrset(ctx, &endpoint, zones).await,
            ChangeAction::Update => self.update_rrset(ctx, &endpoint, zones).await,
            ChangeAction::Delete => self.delete_rrset(ctx, &endpoint, zones).await,
        }
    }

    async fn create_rrset(&self, ctx: &Context, endpoint: &Endpoint, zones: &[Zone]) -> Result<TaskOutcome> {
        let Some(zone) = find_best_matching_zone(&endpoint.dns_name, zones) else {
            return Err(Error::zone_not_found(&endpoint.dns_name));
        };

        let action = ChangeAction::Create;
        let content = endpoint.targets.join(",");
        info!(record = %endpoint.dns_name, content = %content, record_type = %endpoint.record_type,
              action = %action, id = %zone.id, "create record set");

        if self.dry_run {
            debug!(record = %endpoint.dns_name, action = %action, id = %zone.id, "dry run, skipping");
            return Ok(TaskOutcome::Skipped);
        }

        let payload = to_create_payload(endpoint);
        if let Err(e) = self
            .api
            .create_record_set(ctx, &self.project_id, &zone.id, &payload)
            .await
        {
            error!(record = %endpoint.dns_name, error = %e, "error creating record set");
            return Err(e);
        }

        info!(record = %endpoint.dns_name, content = %content, record_type = %endpoint.record_type,
              action = %action, id = %zone.id, "create record set successfully");
        Ok(TaskOutcome::Applied)
    }

    async fn update_rrset(&self, ctx: &Context, endpoint: &Endpoint, zones: &[Zone]) -> Result<TaskOutcome> {
        let (zone, record_set) = self
            .record_sets
            .zone_and_record_set_for_mutation(ctx, endpoint, zones)
            .await?;

        let action = ChangeAction::Update;
        let content = endpoint.targets.join(",");
        info!(record = %endpoint.dns_name, content = %content, record_type = %endpoint.record_type,
              action = %action, id = %record_set.id, "update record set");

        if self.dry_run {
            debug!(record = %endpoint.dns_name, action = %action, id = %record_set.id, "dry run, skipping");
            return Ok(TaskOutcome::Skipped);
        }

        let payload = to_update_payload(endpoint);
        if let Err(e) = self
            .api
            .partial_update_record_set(ctx, &self.project_id, &zone.id, &record_set.id, &payload)
            .await
        {
            error!(record = %endpoint.dns_name, error = %e, "error updating record set");
            return Err(e);
        }

        info!(record = %endpoint.dns_name, content = %content, record_type = %endpoint.record_type,
              action = %action, id = %record_set.id, "update record set successfully");
        Ok(TaskOutcome::Applied)
    }

    async fn delete_rrset(&self, ctx: &Context, endpoint: &Endpoint, zones: &[Zone]) -> Result<TaskOutcome> {
        let (zone, record_set) = self
            .record_sets
            .zone_and_record_set_for_mutation(ctx, endpoint, zones)
            .await?;

        let action = ChangeAction::Delete;
        let content = endpoint.targets.join(",");
        info!(record = %endpoint.dns_name, content = %content, record_type = %endpoint.record_type,
              action = %action, id = %record_set.id, "delete record set");

        if self.dry_run {
            debug!(record = %endpoint.dns_name, action = %action, id = %record_set.id, "dry run, skipping");
            return Ok(TaskOutcome::Skipped);
        }

        if let Err(e) = self
            .api
            .delete_record_set(ctx, &self.project_id, &zone.id, &record_set.id)
            .await
        {
            error!(record = %endpoint.dns_name, error = %e, "error deleting record set");
            return Err(e);
        }

        info!(record = %endpoint.dns_name, content = %content, record_type = %endpoint.record_type,
              action = %action, id = %record_set.id, "delete record set successfully");
        Ok(TaskOutcome::Applied)
    }
}
