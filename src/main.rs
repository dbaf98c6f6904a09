//! Node audit service entry point.
//!
//! Compares the chain tip of every audited Ronin node against a reference node and
//! reports lagging or unreachable nodes to Telegram.
//!
//! # Flow
//! 1. Loads `.env` and applies CLI overrides
//! 2. Reads and validates the configuration from the environment
//! 3. Builds one JSON-RPC client per node and the Telegram notifier
//! 4. Audits on every tick until Ctrl+C, optionally serving metrics

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;

use crate::{
	bootstrap::{initialize_audit_service, Result},
	models::AppConfig,
	utils::{
		logging::{setup_logging, LogSettings},
		metrics::server::create_metrics_server,
		parse_string_to_bytes_size,
	},
};

use clap::Parser;
use dotenvy::dotenv_override;
use std::env::{set_var, var};
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Parser)]
#[command(
	name = "node-audit",
	about = "Watches Ronin nodes for lagging or unreachable RPC endpoints and alerts a Telegram group.",
	version
)]
struct Cli {
	/// Write logs to file instead of stdout
	#[arg(long)]
	log_file: bool,

	/// Set log level (trace, debug, info, warn, error)
	#[arg(long, value_name = "LEVEL")]
	log_level: Option<String>,

	/// Path to store log files (default: logs/)
	#[arg(long, value_name = "PATH")]
	log_path: Option<String>,

	/// Maximum log file size before rolling (e.g., "1GB", "500MB", "1024KB")
	#[arg(long, value_name = "SIZE", value_parser = parse_string_to_bytes_size)]
	log_max_size: Option<u64>,

	/// Address to start the metrics server on (default: 127.0.0.1:8081)
	#[arg(long, value_name = "HOST:PORT")]
	metrics_address: Option<String>,

	/// Enable metrics server
	#[arg(long)]
	metrics: bool,

	/// Validate configuration without starting the service
	#[arg(long)]
	check: bool,

	/// Run a single audit round and exit
	#[arg(long)]
	once: bool,
}

impl Cli {
	/// Apply CLI options to environment variables, overriding any existing values
	fn apply_to_env(&self) {
		// Reload environment variables from .env file
		dotenv_override().ok();

		if self.log_file {
			set_var("LOG_MODE", "file");
		}

		if let Ok(level) = var("RUST_LOG") {
			set_var("LOG_LEVEL", level);
		}

		if let Some(level) = &self.log_level {
			set_var("LOG_LEVEL", level);
			set_var("RUST_LOG", level);
		}

		if let Some(path) = &self.log_path {
			set_var("LOG_DATA_DIR", path);
		}

		if let Some(max_size) = &self.log_max_size {
			set_var("LOG_MAX_SIZE", max_size.to_string());
		}

		if self.metrics {
			set_var("METRICS_ENABLED", "true");
		}

		if let Some(address) = &self.metrics_address {
			if let Some(port) = address.split(':').nth(1) {
				set_var("METRICS_PORT", port);
			}
		}
	}

	fn metrics_address(&self) -> String {
		if var("IN_DOCKER").unwrap_or_default() == "true" {
			var("METRICS_PORT")
				.map(|port| format!("0.0.0.0:{}", port))
				.unwrap_or_else(|_| "0.0.0.0:8081".to_string())
		} else {
			self.metrics_address
				.clone()
				.unwrap_or_else(|| "127.0.0.1:8081".to_string())
		}
	}
}

/// Main entry point for the node audit service.
///
/// # Errors
/// Returns an error if configuration is invalid or a client cannot be created.
#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	cli.apply_to_env();

	let log_settings = LogSettings::from_env().unwrap_or_else(|e| {
		eprintln!("{}, falling back to default log settings", e);
		LogSettings::default()
	});
	if let Err(e) = setup_logging(&log_settings) {
		eprintln!("Failed to setup logging: {}", e);
	}

	let config = match AppConfig::from_env() {
		Ok(config) => config,
		Err(e) => {
			error!("Invalid configuration: {}", e);
			return Err(e.into());
		}
	};

	if cli.check {
		info!(
			reference = %config.reference.name,
			audited = config.audited.len(),
			"Configuration validation completed successfully!"
		);
		return Ok(());
	}

	let mut audit_service = initialize_audit_service(&config)?;

	if cli.once {
		let report = audit_service.run_once().await?;
		info!(reference_height = report.reference_height, nodes = ?report.nodes, "Audit round completed");
		return Ok(());
	}

	let metrics_enabled =
		cli.metrics || var("METRICS_ENABLED").map(|v| v == "true").unwrap_or(false);

	let metrics_server = if metrics_enabled {
		let metrics_address = cli.metrics_address();
		info!("Metrics server enabled, starting on {}", metrics_address);
		match create_metrics_server(metrics_address) {
			Ok(server) => Some(server),
			Err(e) => {
				error!("Failed to create metrics server: {}", e);
				None
			}
		}
	} else {
		info!("Metrics server disabled. Use --metrics flag or METRICS_ENABLED=true to enable");
		None
	};

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let audit_task = tokio::spawn(audit_service.run(shutdown_rx));

	info!("Service started. Press Ctrl+C to shutdown");

	let ctrl_c = tokio::signal::ctrl_c();

	if let Some(metrics_future) = metrics_server {
		tokio::select! {
			result = ctrl_c => {
				if let Err(e) = result {
					error!("Error waiting for Ctrl+C: {}", e);
				}
				info!("Shutdown signal received, stopping services...");
			}
			result = metrics_future => {
				if let Err(e) = result {
					error!("Metrics server error: {}", e);
				}
				info!("Metrics server stopped, shutting down services...");
			}
		}
	} else {
		let _ = ctrl_c.await;
		info!("Shutdown signal received, stopping services...");
	}

	let _ = shutdown_tx.send(true);
	if let Err(e) = audit_task.await {
		error!("Audit task failed: {}", e);
	}

	info!("Shutdown complete");
	Ok(())
}
