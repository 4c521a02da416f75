// # STACKIT DNS API Client
//
// This crate provides the STACKIT DNS implementation of `DnsApi` for the
// external-dns webhook.
//
// ## Scope
//
// - One HTTP request per trait call
// - Full error propagation to the engine (no retry, no backoff)
// - HTTP timeout configured (10 seconds by default)
// - Specific error handling for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - Every request raced against the operation's `Context`
//
// Pagination, fan-out and dry-run are owned by the engine in
// `dnswebhook-core`; this client never spawns tasks and keeps no state
// beyond the bearer token.
//
// ## Security Requirements
//
// - The bearer token NEVER appears in logs or Debug output
// - Construction fails fast if the token is empty
//
// ## API Reference
//
// - List zones: GET `/v1/projects/:project_id/zones`
// - List record sets: GET `/v1/projects/:project_id/zones/:zone_id/rrsets`
// - Create record set: POST `/v1/projects/:project_id/zones/:zone_id/rrsets`
// - Update record set: PATCH `/v1/projects/:project_id/zones/:zone_id/rrsets/:rrset_id`
// - Delete record set: DELETE `/v1/projects/:project_id/zones/:zone_id/rrsets/:rrset_id`

pub mod auth;

use async_trait::async_trait;
use dnswebhook_core::config::ApiConfig;
use dnswebhook_core::model::{
    CreateRecordSetPayload, PartialUpdateRecordSetPayload, RecordSet, RecordSetPage,
    RecordSetQuery, ZonePage, ZoneQuery,
};
use dnswebhook_core::{Context, DnsApi, Error, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Name reported by [`DnsApi::api_name`]
pub const API_NAME: &str = "stackit";

/// Error body returned by the API on non-2xx responses
#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Envelope of create and update responses
#[derive(Deserialize, Default)]
struct RecordSetResponse {
    #[serde(default)]
    rrset: RecordSet,
}

/// STACKIT DNS REST client
///
/// Safe to share between workers; `reqwest::Client` pools connections
/// internally.
///
/// # Security
///
/// The Debug implementation does NOT expose the bearer token.
pub struct StackitDnsClient {
    /// Base URL without trailing slash
    base_url: String,

    /// Bearer token
    /// ⚠️ NEVER log this value
    token: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for StackitDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackitDnsClient")
            .field("base_url", &self.base_url)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl StackitDnsClient {
    /// Create a new client
    ///
    /// Resolves the bearer token (reading the key file if configured) and
    /// builds an HTTP client with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the credential cannot be resolved or the
    /// HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let token = auth::resolve_token(&config.credentials)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "STACKIT DNS client created");

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn zones_url(&self, project_id: &str) -> String {
        format!("{}/v1/projects/{}/zones", self.base_url, project_id)
    }

    fn rrsets_url(&self, project_id: &str, zone_id: &str) -> String {
        format!("{}/rrsets", self.zone_url(project_id, zone_id))
    }

    fn rrset_url(&self, project_id: &str, zone_id: &str, rrset_id: &str) -> String {
        format!("{}/rrsets/{}", self.zone_url(project_id, zone_id), rrset_id)
    }

    fn zone_url(&self, project_id: &str, zone_id: &str) -> String {
        format!("{}/{}", self.zones_url(project_id), zone_id)
    }

    /// Send `request` with bearer auth under `ctx` and check the status
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;

        check_status(response).await
    }

    /// Send `request` and decode the JSON body as `T`
    async fn send_json<T: DeserializeOwned>(&self, ctx: &Context, request: RequestBuilder) -> Result<T> {
        ctx.run(async {
            let response = self.send(request).await?;
            let body = response.bytes().await.map_err(transport_error)?;
            serde_json::from_slice(&body).map_err(|e| Error::malformed(e.to_string()))
        })
        .await
    }

    /// Send a mutation and extract the record set it returns
    async fn send_mutation(&self, ctx: &Context, request: RequestBuilder) -> Result<RecordSet> {
        ctx.run(async {
            let response = self.send(request).await?;
            let body = response.bytes().await.map_err(transport_error)?;
            if body.iter().all(u8::is_ascii_whitespace) {
                return Ok(RecordSet::default());
            }
            let envelope: RecordSetResponse =
                serde_json::from_slice(&body).map_err(|e| Error::malformed(e.to_string()))?;
            Ok(envelope.rrset)
        })
        .await
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::transport(format!("request timed out: {}", e))
    } else {
        Error::transport(format!("HTTP request failed: {}", e))
    }
}

/// Map a non-2xx response to [`Error::UpstreamApi`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    let message = error_message(&body);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            tracing::error!(status = status.as_u16(), "authentication failed");
            Error::upstream(
                status.as_u16(),
                format!("authentication failed, invalid token or insufficient permissions: {}", message),
            )
        }
        StatusCode::NOT_FOUND => Error::upstream(404, format!("not found: {}", message)),
        StatusCode::CONFLICT => Error::upstream(409, format!("conflict: {}", message)),
        StatusCode::TOO_MANY_REQUESTS => {
            tracing::warn!("rate limit exceeded");
            Error::upstream(429, format!("rate limit exceeded: {}", message))
        }
        s if s.is_server_error() => {
            Error::upstream(s.as_u16(), format!("server error (transient): {}", message))
        }
        s => Error::upstream(s.as_u16(), message),
    })
}

/// The `message` of a JSON error body, or the raw body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            message: Some(message),
        }) => message,
        _ => body.trim().to_string(),
    }
}

fn page_params(active_only: bool, page: u32, page_size: u32) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", page.to_string()),
        ("pageSize", page_size.to_string()),
    ];
    if active_only {
        params.push(("active[eq]", "true".to_string()));
    }
    params
}

#[async_trait]
impl DnsApi for StackitDnsClient {
    /// ```http
    /// GET /v1/projects/:project_id/zones?page=1&pageSize=10000&active[eq]=true&dnsName[like]=...
    /// Authorization: Bearer <token>
    /// ```
    async fn list_zones(&self, ctx: &Context, project_id: &str, query: &ZoneQuery) -> Result<ZonePage> {
        let mut params = page_params(query.active_only, query.page, query.page_size);
        if let Some(pattern) = &query.dns_name_like {
            params.push(("dnsName[like]", pattern.clone()));
        }

        tracing::debug!(project_id, page = query.page, filter = ?query.dns_name_like, "listing zones");

        let request = self.client.get(self.zones_url(project_id)).query(&params);
        self.send_json(ctx, request).await
    }

    /// ```http
    /// GET /v1/projects/:project_id/zones/:zone_id/rrsets?page=1&pageSize=10000&active[eq]=true&name[like]=...
    /// Authorization: Bearer <token>
    /// ```
    async fn list_record_sets(
        &self,
        ctx: &Context,
        project_id: &str,
        zone_id: &str,
        query: &RecordSetQuery,
    ) -> Result<RecordSetPage> {
        let mut params = page_params(query.active_only, query.page, query.page_size);
        if let Some(pattern) = &query.name_like {
            params.push(("name[like]", pattern.clone()));
        }

        tracing::debug!(zone_id, page = query.page, filter = ?query.name_like, "listing record sets");

        let request = self
            .client
            .get(self.rrsets_url(project_id, zone_id))
            .query(&params);
        self.send_json(ctx, request).await
    }

    async fn create_record_set(
        &self,
        ctx: &Context,
        project_id: &str,
        zone_id: &str,
        payload: &CreateRecordSetPayload,
    ) -> Result<RecordSet> {
        let request = self
            .client
            .post(self.rrsets_url(project_id, zone_id))
            .json(payload);
        self.send_mutation(ctx, request).await
    }

    async fn partial_update_record_set(
        &self,
        ctx: &Context,
        project_id: &str,
        zone_id: &str,
        record_set_id: &str,
        payload: &PartialUpdateRecordSetPayload,
    ) -> Result<RecordSet> {
        let request = self
            .client
            .patch(self.rrset_url(project_id, zone_id, record_set_id))
            .json(payload);
        self.send_mutation(ctx, request).await
    }

    async fn delete_record_set(
        &self,
        ctx: &Context,
        project_id: &str,
        zone_id: &str,
        record_set_id: &str,
    ) -> Result<()> {
        let request = self
            .client
            .delete(self.rrset_url(project_id, zone_id, record_set_id));
        ctx.run(async {
            self.send(request).await?;
            Ok(())
        })
        .await
    }

    fn api_name(&self) -> &'static str {
        API_NAME
    }
}
