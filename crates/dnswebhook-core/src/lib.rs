// # dnswebhook-core
//
// Core library of the external-dns webhook for STACKIT DNS.
//
// ## Architecture Overview
//
// - **DnsApi**: Trait for the remote zone / record-set API
// - **Provider**: Trait for the operations the webhook HTTP layer exposes
// - **WebhookProvider**: Engine that lists zones, collects records and
//   applies change sets on a bounded worker pool
// - **Context**: Cancellation and deadline carried by every operation
//
// ## Design Principles
//
// 1. **Separation of Concerns**: The engine knows nothing about HTTP
// 2. **Single-shot API calls**: Pagination and fan-out live in the engine
// 3. **Library-First**: The daemon is a thin layer over this crate

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod mapper;
pub mod matcher;
pub mod model;
pub mod resolver;
pub mod traits;

// Re-export core types for convenience
pub use config::{ApiConfig, Credentials, ProviderConfig};
pub use context::{CancelHandle, Context};
pub use engine::{FailurePolicy, WebhookProvider, WorkerPool};
pub use error::{Error, Result};
pub use model::{Changes, DomainFilter, Endpoint, RecordSet, Zone};
pub use traits::{DnsApi, Provider};
