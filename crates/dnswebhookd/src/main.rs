// # dnswebhookd - external-dns webhook for STACKIT DNS
//
// This daemon is a THIN integration layer:
// - DO NOT add DNS logic or retry logic here
// - All zone, record and change logic lives in dnswebhook-core
//
// The daemon is responsible for:
// 1. Reading configuration from flags and environment variables
// 2. Initializing logging and the runtime
// 3. Building the STACKIT client and the webhook provider
// 4. Serving the webhook API and its Prometheus metrics until SIGTERM/SIGINT
//
// ## Configuration
//
// Every flag can also be set through the environment variable named in
// parentheses.
//
// - `--api-port` (`API_PORT`): Port to listen on (default 8888)
// - `--auth-token` (`AUTH_TOKEN`): Bearer token for the STACKIT API
// - `--auth-key-path` (`AUTH_KEY_PATH`): Key file holding the bearer token
// - `--base-url` (`BASE_URL`): STACKIT DNS API endpoint
// - `--project-id` (`PROJECT_ID`): Project owning the zones
// - `--worker` (`WORKER`): Concurrent API workers per operation (default 10)
// - `--domain-filter` (`DOMAIN_FILTER`): Zone name pattern, repeatable
// - `--dry-run` (`DRY_RUN`): Log mutations without sending them
// - `--log-level` (`LOG_LEVEL`): DEBUG, INFO, WARN or ERROR (default INFO, unknown values fall back to INFO)
// - `--log-format` (`LOG_FORMAT`): json or text (default json)
// - `--http-timeout-secs` (`HTTP_TIMEOUT_SECS`): API request timeout (default 10)
//
// Exactly one of `--auth-token` and `--auth-key-path` is required.
//
// ## Example
//
// ```bash
// export AUTH_TOKEN=your_token
// export PROJECT_ID=your_project
//
// dnswebhookd --domain-filter example.com --domain-filter example.org
// ```

mod metrics;
mod server;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use dnswebhook_core::config::{DEFAULT_BASE_URL, DEFAULT_WORKERS};
use dnswebhook_core::{ApiConfig, DnsApi, DomainFilter, Provider, ProviderConfig, WebhookProvider};
use dnswebhook_provider_stackit::StackitDnsClient;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::metrics::HttpMetrics;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Time in-flight requests get to finish after a shutdown signal
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum WebhookExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<WebhookExitCode> for ExitCode {
    fn from(code: WebhookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

/// provider webhook for the STACKIT DNS service
#[derive(Debug, Parser)]
#[command(name = "dnswebhookd", version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 8888)]
    api_port: u16,

    /// Authentication token for the STACKIT API
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Path to a key file holding the STACKIT API token
    #[arg(long, env = "AUTH_KEY_PATH")]
    auth_key_path: Option<String>,

    /// Base URL of the STACKIT DNS API
    #[arg(long, env = "BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Project id of the STACKIT project
    #[arg(long, env = "PROJECT_ID")]
    project_id: Option<String>,

    /// Number of workers querying the API concurrently. Keep it moderate to
    /// avoid 429 responses.
    #[arg(long, env = "WORKER", default_value_t = DEFAULT_WORKERS)]
    worker: usize,

    /// Filter for DNS zone names, repeatable
    #[arg(long = "domain-filter", env = "DOMAIN_FILTER", value_delimiter = ',')]
    domain_filter: Vec<String>,

    /// Log changes instead of applying them
    #[arg(long, env = "DRY_RUN")]
    dry_run: bool,

    /// Log level: DEBUG, INFO, WARN or ERROR
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO")]
    log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// Timeout of a single STACKIT API request in seconds
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
    http_timeout_secs: u64,
}

fn parse_level(name: &str) -> Option<Level> {
    match name.to_uppercase().as_str() {
        "DEBUG" => Some(Level::DEBUG),
        "INFO" => Some(Level::INFO),
        "WARN" => Some(Level::WARN),
        "ERROR" => Some(Level::ERROR),
        _ => None,
    }
}

impl Args {
    /// Configured log level; unknown names fall back to INFO
    fn level(&self) -> Level {
        parse_level(&self.log_level).unwrap_or(Level::INFO)
    }

    fn api_config(&self) -> Result<ApiConfig> {
        let config = ApiConfig::from_options(
            &self.base_url,
            self.auth_token.as_deref(),
            self.auth_key_path.as_deref(),
        )?;

        if self.http_timeout_secs == 0 {
            anyhow::bail!("HTTP_TIMEOUT_SECS must be greater than 0");
        }

        Ok(config.with_timeout(Duration::from_secs(self.http_timeout_secs)))
    }

    fn provider_config(&self) -> Result<ProviderConfig> {
        let filters = self
            .domain_filter
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        let config = ProviderConfig::new(self.project_id.clone().unwrap_or_default())
            .with_domain_filter(DomainFilter::new(filters))
            .with_dry_run(self.dry_run)
            .with_workers(self.worker);
        config.validate()?;

        Ok(config)
    }
}

fn init_logging(level: Level, format: LogFormat) -> Result<()> {
    // RUST_LOG overrides the level for targeted debugging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let builder = FmtSubscriber::builder().with_env_filter(filter);

    let installed = match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.level(), args.log_format) {
        eprintln!("{}", e);
        return WebhookExitCode::ConfigError.into();
    }

    if parse_level(&args.log_level).is_none() {
        warn!(log_level = %args.log_level, "unknown log level, using INFO");
    }

    let provider = match build_provider(&args) {
        Ok(provider) => provider,
        Err(e) => {
            error!("Configuration error: {}", e);
            return WebhookExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return WebhookExitCode::RuntimeError.into();
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], args.api_port));
    let result = rt.block_on(async {
        if let Err(e) = run_daemon(addr, provider).await {
            error!("Daemon error: {}", e);
            WebhookExitCode::RuntimeError
        } else {
            WebhookExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the STACKIT client and the webhook provider on top of it
fn build_provider(args: &Args) -> Result<Arc<dyn Provider>> {
    let api_config = args.api_config()?;
    let provider_config = args.provider_config()?;

    info!(
        base_url = %api_config.base_url,
        project_id = %provider_config.project_id,
        workers = provider_config.workers,
        dry_run = provider_config.dry_run,
        domain_filter = ?provider_config.domain_filter.filters,
        "configuration loaded"
    );

    let api: Arc<dyn DnsApi> = Arc::new(StackitDnsClient::new(&api_config)?);
    let provider = WebhookProvider::new(api, provider_config)?;

    Ok(Arc::new(provider))
}

/// Serve the webhook until a shutdown signal arrives
async fn run_daemon(addr: SocketAddr, provider: Arc<dyn Provider>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;
    info!("Webhook listening on {}", addr);

    let metrics = Arc::new(
        HttpMetrics::new().map_err(|e| anyhow::anyhow!("Failed to register metrics: {}", e))?,
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let app = server::router(provider, metrics);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::select! {
        res = &mut server => {
            return match res {
                Ok(Ok(())) => Err(anyhow::anyhow!("Server stopped unexpectedly")),
                Ok(Err(e)) => Err(anyhow::anyhow!("Server error: {}", e)),
                Err(e) => Err(anyhow::anyhow!("Server task failed: {}", e)),
            };
        }
        signal = wait_for_shutdown() => {
            info!("shutting down server due to received signal: {}", signal?);
        }
    }

    let _ = shutdown_tx.send(());

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server).await {
        Ok(Ok(Ok(()))) => {
            info!("Server stopped");
            Ok(())
        }
        Ok(Ok(Err(e))) => Err(anyhow::anyhow!("Server error: {}", e)),
        Ok(Err(e)) => Err(anyhow::anyhow!("Server task failed: {}", e)),
        Err(_) => Err(anyhow::anyhow!("Shutdown timeout after {:?}", SHUTDOWN_TIMEOUT)),
    }
}

#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
