//! Core traits for the webhook
//!
//! This module defines the abstract interfaces at the two edges of the engine.
//!
//! - [`DnsApi`]: The remote DNS service the engine reads from and writes to
//! - [`Provider`]: The operations the webhook HTTP layer exposes

pub mod dns_api;
pub mod provider;

pub use dns_api::DnsApi;
pub use provider::Provider;
