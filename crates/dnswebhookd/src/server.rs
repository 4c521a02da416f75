//! external-dns webhook HTTP surface
//!
//! | Method | Path                    | Provider call            |
//! |--------|-------------------------|--------------------------|
//! | GET    | `/`                     | `domain_filter`          |
//! | GET    | `/records`              | `records`                |
//! | POST   | `/records`              | `apply_changes`          |
//! | POST   | `/adjustendpoints`      | `adjust_endpoints`       |
//! | POST   | `/propertyvaluesequals` | `property_values_equal`  |
//! | GET    | `/healthz`              | none                     |
//! | GET    | `/metrics`              | none                     |
//!
//! Successful webhook responses carry the versioned webhook media type and
//! `Vary: Content-Type`. Failures are plain text: 400 for a body that does
//! not parse, 500 for a provider error.
//!
//! Webhook routes are recorded by [`track_requests`]; `/healthz` and
//! `/metrics` are not.
//!
//! Every request runs under its own [`Context`], cancelled when the request
//! is dropped so abandoned calls stop their workers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dnswebhook_core::model::{Changes, Endpoint};
use dnswebhook_core::{CancelHandle, Context, Provider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use crate::metrics::{HttpMetrics, track_requests};

/// Media type of webhook protocol version 1
pub const MEDIA_TYPE_V1: &str = "application/external.dns.webhook+json;version=1";

const CONTENT_TYPE_PLAINTEXT: &str = "text/plain";

#[derive(Clone)]
struct AppState {
    provider: Arc<dyn Provider>,
    metrics: Arc<HttpMetrics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PropertyValuesEqualsRequest {
    name: String,
    previous: String,
    current: String,
}

#[derive(Debug, Serialize)]
struct PropertyValuesEqualsResponse {
    equals: bool,
}

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

/// Cancels the request context when the handler future is dropped
struct CancelOnDrop(CancelHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

fn request_context() -> (Context, CancelOnDrop) {
    let (ctx, handle) = Context::with_cancel();
    (ctx, CancelOnDrop(handle))
}

/// Build the webhook router around `provider`, recording into `metrics`
pub fn router(provider: Arc<dyn Provider>, metrics: Arc<HttpMetrics>) -> Router {
    Router::new()
        .route("/", get(negotiate))
        .route("/records", get(records).post(apply_changes))
        .route("/adjustendpoints", post(adjust_endpoints))
        .route("/propertyvaluesequals", post(property_values_equals))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&metrics),
            track_requests,
        ))
        .route("/healthz", get(health))
        .route("/metrics", get(export_metrics))
        .with_state(AppState { provider, metrics })
}

fn webhook_json<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, MEDIA_TYPE_V1),
                (header::VARY, "Content-Type"),
            ],
            body,
        )
            .into_response(),
        Err(e) => plain_text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn plain_text(status: StatusCode, message: String) -> Response {
    (status, [(header::CONTENT_TYPE, CONTENT_TYPE_PLAINTEXT)], message).into_response()
}

fn bad_request(e: serde_json::Error) -> Response {
    error!(error = %e, "error parsing body");
    plain_text(StatusCode::BAD_REQUEST, e.to_string())
}

async fn negotiate(State(state): State<AppState>) -> Response {
    webhook_json(&state.provider.domain_filter())
}

async fn records(State(state): State<AppState>) -> Response {
    let (ctx, _cancel) = request_context();

    match state.provider.records(&ctx).await {
        Ok(endpoints) => {
            debug!(count = endpoints.len(), "returning records");
            webhook_json(&endpoints)
        }
        Err(e) => {
            error!(error = %e, "error getting records");
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn apply_changes(State(state): State<AppState>, body: Bytes) -> Response {
    let changes: Changes = match serde_json::from_slice(&body) {
        Ok(changes) => changes,
        Err(e) => return bad_request(e),
    };

    debug!(
        create = changes.create.len(),
        update_old = changes.update_old.len(),
        update_new = changes.update_new.len(),
        delete = changes.delete.len(),
        "requesting apply changes"
    );

    let (ctx, _cancel) = request_context();
    match state.provider.apply_changes(&ctx, changes).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!(error = %e, "error applying changes");
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn adjust_endpoints(State(state): State<AppState>, body: Bytes) -> Response {
    let endpoints: Option<Vec<Endpoint>> = match serde_json::from_slice(&body) {
        Ok(endpoints) => endpoints,
        Err(e) => return bad_request(e),
    };

    let adjusted = state.provider.adjust_endpoints(endpoints.unwrap_or_default());
    debug!(count = adjusted.len(), "adjusted endpoints");
    webhook_json(&adjusted)
}

async fn property_values_equals(State(state): State<AppState>, body: Bytes) -> Response {
    let request: PropertyValuesEqualsRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return bad_request(e),
    };

    debug!(
        name = %request.name,
        previous = %request.previous,
        current = %request.current,
        "requesting property values"
    );

    let equals = state
        .provider
        .property_values_equal(&request.name, &request.previous, &request.current);
    webhook_json(&PropertyValuesEqualsResponse { equals })
}

async fn health() -> Json<Message> {
    Json(Message { message: "healthy" })
}

async fn export_metrics(State(state): State<AppState>) -> Response {
    match state.metrics.gather() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "error encoding metrics");
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use dnswebhook_core::{DomainFilter, Error};
    use http_body_util::BodyExt;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct MockProvider {
        fail: bool,
        applied: Mutex<Vec<Changes>>,
    }

    #[async_trait]
    impl Provider for MockProvider {
        async fn records(&self, _ctx: &Context) -> Result<Vec<Endpoint>, Error> {
            if self.fail {
                return Err(Error::upstream(500, "zone listing failed"));
            }
            Ok(vec![Endpoint::with_ttl(
                "www.example.com.",
                "A",
                300,
                vec!["1.2.3.4".into()],
            )])
        }

        async fn apply_changes(&self, _ctx: &Context, changes: Changes) -> Result<(), Error> {
            if self.fail {
                return Err(Error::zone_not_found("www.other.net."));
            }
            self.applied.lock().unwrap().push(changes);
            Ok(())
        }

        fn domain_filter(&self) -> DomainFilter {
            DomainFilter::new(vec!["example.com".into()])
        }
    }

    fn app(provider: Arc<MockProvider>) -> Router {
        app_with_metrics(provider, Arc::new(HttpMetrics::new().unwrap()))
    }

    fn app_with_metrics(provider: Arc<MockProvider>, metrics: Arc<HttpMetrics>) -> Router {
        router(provider, metrics)
    }

    async fn send(router: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Vec<(String, String)>, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, MEDIA_TYPE_V1)
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap().to_string()))
            .collect();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn negotiation_returns_domain_filter() {
        let (status, headers, body) = send(app(Arc::default()), "GET", "/", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(header_value(&headers, "content-type"), Some(MEDIA_TYPE_V1));
        assert_eq!(header_value(&headers, "vary"), Some("Content-Type"));
        assert_eq!(body, r#"{"include":["example.com"]}"#);
    }

    #[tokio::test]
    async fn records_are_listed() {
        let (status, headers, body) = send(app(Arc::default()), "GET", "/records", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(header_value(&headers, "vary"), Some("Content-Type"));
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value[0]["dnsName"], "www.example.com.");
        assert_eq!(value[0]["recordTTL"], 300);
        assert_eq!(value[0]["targets"][0], "1.2.3.4");
    }

    #[tokio::test]
    async fn records_failure_is_plain_text_500() {
        let provider = Arc::new(MockProvider {
            fail: true,
            ..MockProvider::default()
        });
        let (status, headers, body) = send(app(provider), "GET", "/records", "").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(header_value(&headers, "content-type"), Some("text/plain"));
        assert!(body.contains("zone listing failed"));
    }

    #[tokio::test]
    async fn apply_changes_returns_no_content() {
        let provider = Arc::new(MockProvider::default());
        let body = r#"{
            "Create": [{"dnsName": "a.example.com", "targets": ["1.1.1.1"], "recordType": "A"}],
            "UpdateOld": null,
            "UpdateNew": null,
            "Delete": [{"dnsName": "b.example.com", "targets": ["2.2.2.2"], "recordType": "A", "recordTTL": 60}]
        }"#;

        let (status, _, _) = send(app(Arc::clone(&provider)), "POST", "/records", body).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        let applied = provider.applied.lock().unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].create[0].dns_name, "a.example.com");
        assert!(applied[0].update_new.is_empty());
        assert_eq!(applied[0].delete[0].record_ttl, 60);
    }

    #[tokio::test]
    async fn apply_changes_rejects_unparsable_body() {
        let provider = Arc::new(MockProvider::default());
        let (status, headers, _) =
            send(app(Arc::clone(&provider)), "POST", "/records", "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(header_value(&headers, "content-type"), Some("text/plain"));
        assert!(provider.applied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn apply_changes_failure_is_500() {
        let provider = Arc::new(MockProvider {
            fail: true,
            ..MockProvider::default()
        });
        let (status, _, body) = send(app(provider), "POST", "/records", "{}").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("www.other.net."));
    }

    #[tokio::test]
    async fn adjust_endpoints_passes_through() {
        let body = r#"[{"dnsName":"a.example.com","targets":["1.1.1.1"],"recordType":"A"}]"#;
        let (status, _, response) =
            send(app(Arc::default()), "POST", "/adjustendpoints", body).await;

        assert_eq!(status, StatusCode::OK);
        let endpoints: Vec<Endpoint> = serde_json::from_str(&response).unwrap();
        assert_eq!(endpoints, vec![Endpoint::new("a.example.com", "A", vec!["1.1.1.1".into()])]);
    }

    #[tokio::test]
    async fn property_values_equals_compares_values() {
        let router = app(Arc::default());
        let (status, _, body) = send(
            router.clone(),
            "POST",
            "/propertyvaluesequals",
            r#"{"name":"ttl","previous":"300","current":"300"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"equals":true}"#);

        let (_, _, body) = send(
            router,
            "POST",
            "/propertyvaluesequals",
            r#"{"name":"ttl","previous":"300","current":"60"}"#,
        )
        .await;
        assert_eq!(body, r#"{"equals":false}"#);
    }

    #[tokio::test]
    async fn property_values_equals_rejects_unparsable_body() {
        let (status, _, _) =
            send(app(Arc::default()), "POST", "/propertyvaluesequals", "[").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (status, _, body) = send(app(Arc::default()), "GET", "/healthz", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"message":"healthy"}"#);
    }

    #[tokio::test]
    async fn webhook_requests_are_recorded() {
        let metrics = Arc::new(HttpMetrics::new().unwrap());
        let failing = Arc::new(MockProvider {
            fail: true,
            ..MockProvider::default()
        });

        send(app_with_metrics(Arc::default(), Arc::clone(&metrics)), "GET", "/records", "").await;
        send(app_with_metrics(Arc::default(), Arc::clone(&metrics)), "POST", "/records", "{bad").await;
        send(app_with_metrics(failing, Arc::clone(&metrics)), "GET", "/records", "").await;

        assert_eq!(metrics.requests_total.get(), 3.0);
        assert_eq!(metrics.requests_4xx_total.get(), 1.0);
        assert_eq!(metrics.requests_5xx_total.get(), 1.0);
        assert_eq!(
            metrics
                .requests
                .with_label_values(&["GET", "/records", "200"])
                .get(),
            1.0
        );
        assert_eq!(
            metrics
                .request_content_length
                .with_label_values(&["POST", "/records"])
                .get(),
            4.0
        );
        assert!(
            metrics
                .response_size
                .with_label_values(&["GET", "/records"])
                .get()
                > 0.0
        );
        assert_eq!(
            metrics
                .request_duration
                .with_label_values(&["GET", "/records"])
                .get_sample_count(),
            2
        );
    }

    #[tokio::test]
    async fn metrics_endpoint_exports_text_format() {
        let metrics = Arc::new(HttpMetrics::new().unwrap());
        let router = app_with_metrics(Arc::default(), Arc::clone(&metrics));

        send(router.clone(), "GET", "/", "").await;
        send(router.clone(), "GET", "/healthz", "").await;
        let (status, headers, body) = send(router, "GET", "/metrics", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(header_value(&headers, "content-type"), Some(prometheus::TEXT_FORMAT));
        assert!(body.contains("http_requests_total{method=\"GET\",path=\"/\",status_code=\"200\"} 1"));
        // health checks and scrapes are not recorded
        assert_eq!(metrics.requests_total.get(), 1.0);
    }
}
