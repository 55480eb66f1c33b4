// Puppet Agent Exporter - Prometheus exporter for Puppet agent state
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Puppet Agent Exporter
//!
//! Prometheus exporter for the state a Puppet agent leaves on disk: its
//! configuration, the disabled lock and the last run report. Every scrape
//! re-reads the files.
//!
//! ## Usage
//!
//! ```bash
//! # Run with the platform default file locations
//! puppet-agent-exporter
//!
//! # Custom listen address and report location
//! puppet-agent-exporter --web.listen-address 127.0.0.1:9819 \
//!     --puppet.report-path /var/lib/puppet/state/last_run_report.yaml
//! ```

mod collector;
mod error;
mod metrics;
mod server;

use clap::{Parser, ValueEnum};
use collector::PuppetCollector;
use error::ExporterError;
use prometheus::Registry;
use puppet_agent::paths::{
    DEFAULT_CONFIG_PATH, DEFAULT_DISABLED_LOCK_PATH, DEFAULT_REPORT_PATH,
};
use puppet_agent::{PuppetPaths, DEFAULT_MAX_FILE_SIZE};
use server::{AppState, BasicAuth};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Logfmt,
    Json,
}

/// Puppet Agent Prometheus Exporter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on for web interface and telemetry
    #[arg(long = "web.listen-address", default_value = "0.0.0.0:9819")]
    listen_address: SocketAddr,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path", default_value = "/metrics")]
    telemetry_path: String,

    /// Basic auth username. Requires --web.auth-password.
    #[arg(long = "web.auth-user", env = "PUPPET_EXPORTER_AUTH_USER")]
    auth_user: Option<String>,

    /// Basic auth password.
    #[arg(long = "web.auth-password", env = "PUPPET_EXPORTER_AUTH_PASSWORD")]
    auth_password: Option<String>,

    /// Puppet agent configuration file
    #[arg(long = "puppet.config-path", default_value = DEFAULT_CONFIG_PATH)]
    config_path: PathBuf,

    /// Puppet last run report file
    #[arg(long = "puppet.report-path", default_value = DEFAULT_REPORT_PATH)]
    report_path: PathBuf,

    /// Puppet agent disabled lock file
    #[arg(long = "puppet.disabled-lock-path", default_value = DEFAULT_DISABLED_LOCK_PATH)]
    disabled_lock_path: PathBuf,

    /// Largest state file the exporter will read, in bytes
    #[arg(long = "puppet.max-file-size", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_file_size: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log.level", default_value = "info")]
    log_level: String,

    /// Log format
    #[arg(long = "log.format", value_enum, default_value_t = LogFormat::Logfmt)]
    log_format: LogFormat,
}

impl Args {
    fn paths(&self) -> PuppetPaths {
        PuppetPaths {
            config: self.config_path.clone(),
            report: self.report_path.clone(),
            disabled_lock: self.disabled_lock_path.clone(),
        }
    }

    fn basic_auth(&self) -> Result<Option<BasicAuth>, ExporterError> {
        match (&self.auth_user, &self.auth_password) {
            (Some(user), Some(password)) => Ok(Some(BasicAuth {
                user: user.clone(),
                password: password.clone(),
            })),
            (None, None) => Ok(None),
            _ => Err(ExporterError::InvalidConfig(
                "--web.auth-user and --web.auth-password must both be set".to_string(),
            )),
        }
    }

    fn validate(&self) -> Result<(), ExporterError> {
        if !self.telemetry_path.starts_with('/') {
            return Err(ExporterError::InvalidConfig(format!(
                "telemetry path must start with '/': {}",
                self.telemetry_path
            )));
        }
        if matches!(self.telemetry_path.as_str(), "/" | "/health") {
            return Err(ExporterError::InvalidConfig(format!(
                "telemetry path {} is reserved",
                self.telemetry_path
            )));
        }
        Ok(())
    }
}

fn init_logging(log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    match format {
        LogFormat::Logfmt => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

/// Build the registry holding the Puppet collector and build info.
fn build_registry(collector: PuppetCollector) -> Result<Registry, ExporterError> {
    let registry = Registry::new();
    registry.register(Box::new(collector))?;
    metrics::register_build_info(&registry)?;
    Ok(registry)
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down Puppet Agent Exporter");
}

async fn run(args: Args) -> Result<(), ExporterError> {
    args.validate()?;
    let auth = args.basic_auth()?;
    let collector = PuppetCollector::new(args.paths(), args.max_file_size);

    let paths = collector.paths();
    info!(path = %paths.config.display(), "Puppet config file");
    info!(path = %paths.report.display(), "Puppet run report file");
    info!(path = %paths.disabled_lock.display(), "Puppet disabled lock file");

    let registry = build_registry(collector)?;

    let state = Arc::new(AppState {
        registry,
        metrics_path: args.telemetry_path.clone(),
    });
    if auth.is_some() {
        info!("Basic auth enabled");
    }
    let app = server::router(state, auth);

    let listener = TcpListener::bind(args.listen_address).await?;
    info!("Starting server on http://{}", args.listen_address);
    info!(
        "Metrics endpoint: http://{}{}",
        args.listen_address, args.telemetry_path
    );

    server::serve(listener, app, shutdown_signal()).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(&args.log_level, args.log_format);

    info!("Puppet Agent Exporter v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args).await {
        error!(error = %e, "Exporter failed");
        std::process::exit(1);
    }
}
