//! Provider trait
//!
//! The contract the webhook HTTP layer programs against. It mirrors the
//! operations external-dns calls on a webhook provider.

use crate::context::Context;
use crate::model::{Changes, DomainFilter, Endpoint};
use async_trait::async_trait;

/// DNS provider as seen by the external-dns webhook transport
#[async_trait]
pub trait Provider: Send + Sync {
    /// Return every record the provider currently serves
    async fn records(&self, ctx: &Context) -> Result<Vec<Endpoint>, crate::Error>;

    /// Apply a change set
    async fn apply_changes(&self, ctx: &Context, changes: Changes) -> Result<(), crate::Error>;

    /// The configured domain filter
    fn domain_filter(&self) -> DomainFilter;

    /// Adjust endpoints before external-dns plans with them.
    /// Pass-through by default.
    fn adjust_endpoints(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        endpoints
    }

    /// Compare two values of a provider-specific property
    fn property_values_equal(&self, _name: &str, previous: &str, current: &str) -> bool {
        previous == current
    }
}
