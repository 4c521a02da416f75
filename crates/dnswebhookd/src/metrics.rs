//! Prometheus metrics of the webhook HTTP API
//!
//! # Series
//!
//! - `http_total_requests_total`: every handled request
//! - `http_requests_4xx_total` / `http_requests_5xx_total`: requests by status class
//! - `http_requests_total{method, path, status_code}`
//! - `http_requests_content_length_total{method, path}`: request body bytes
//! - `http_requests_response_size_total{method, path}`: response body bytes
//! - `http_requests_request_duration{method, path}`: latency in seconds
//!
//! Every [`HttpMetrics`] owns its registry, served as text on `/metrics`.

use axum::body::HttpBody;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Latency buckets in seconds
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.015, 0.02, 0.025, 0.03, 0.05, 0.07, 0.09, 0.1, 0.2, 0.3, 0.4, 0.5, 0.7, 0.9,
    1.0, 1.5, 2.0, 3.0, 5.0, 7.0, 10.0,
];

/// HTTP request metrics and the registry exposing them
pub struct HttpMetrics {
    registry: Registry,
    pub(crate) requests_total: Counter,
    pub(crate) requests_4xx_total: Counter,
    pub(crate) requests_5xx_total: Counter,
    pub(crate) requests: CounterVec,
    pub(crate) request_content_length: CounterVec,
    pub(crate) response_size: CounterVec,
    pub(crate) request_duration: HistogramVec,
}

impl HttpMetrics {
    /// Create the series and register them in a fresh registry
    ///
    /// # Errors
    ///
    /// Returns an error if a series is invalid or registered twice.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = Counter::with_opts(Opts::new(
            "http_total_requests_total",
            "The total number of processed HTTP requests",
        ))?;
        let requests_4xx_total = Counter::with_opts(Opts::new(
            "http_requests_4xx_total",
            "The total number of processed HTTP requests with status 4xx",
        ))?;
        let requests_5xx_total = Counter::with_opts(Opts::new(
            "http_requests_5xx_total",
            "The total number of processed HTTP requests with status 5xx",
        ))?;
        let requests = CounterVec::new(
            Opts::new("http_requests_total", "The total number of processed http requests"),
            &["method", "path", "status_code"],
        )?;
        let request_content_length = CounterVec::new(
            Opts::new(
                "http_requests_content_length_total",
                "The number of bytes received in each http request",
            ),
            &["method", "path"],
        )?;
        let response_size = CounterVec::new(
            Opts::new(
                "http_requests_response_size_total",
                "The number of bytes returned in each http request",
            ),
            &["method", "path"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_requests_request_duration",
                "Percentiles of HTTP request latencies in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "path"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(requests_4xx_total.clone()))?;
        registry.register(Box::new(requests_5xx_total.clone()))?;
        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(request_content_length.clone()))?;
        registry.register(Box::new(response_size.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            requests_4xx_total,
            requests_5xx_total,
            requests,
            request_content_length,
            response_size,
            request_duration,
        })
    }

    /// Record one handled request
    pub fn observe(
        &self,
        method: &str,
        path: &str,
        status: u16,
        content_length: Option<f64>,
        response_size: f64,
        duration: Duration,
    ) {
        self.requests_total.inc();
        match status {
            400..=499 => self.requests_4xx_total.inc(),
            500..=599 => self.requests_5xx_total.inc(),
            _ => {}
        }

        let status_code = status.to_string();
        self.requests
            .with_label_values(&[method, path, status_code.as_str()])
            .inc();
        if let Some(length) = content_length {
            self.request_content_length
                .with_label_values(&[method, path])
                .inc_by(length);
        }
        self.response_size
            .with_label_values(&[method, path])
            .inc_by(response_size);
        self.request_duration
            .with_label_values(&[method, path])
            .observe(duration.as_secs_f64());
    }

    /// Encode every series in the Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
    }
}

/// Middleware recording every request passing through it
pub async fn track_requests(
    State(metrics): State<Arc<HttpMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    // unknown for chunked bodies
    let content_length = request.body().size_hint().exact().map(|len| len as f64);

    let response = next.run(request).await;

    let response_size = response.body().size_hint().exact().unwrap_or(0) as f64;
    metrics.observe(
        &method,
        &path,
        response.status().as_u16(),
        content_length,
        response_size,
        started.elapsed(),
    );

    response
}
