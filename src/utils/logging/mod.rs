//! ## Sets up logging from explicit settings, usually read from the environment.
//!
//! Environment variables used by [`LogSettings::from_env`]:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_DATA_DIR: directory for log files; default is "logs/"
//! - LOG_MAX_SIZE: maximum size of log files in bytes; default is 1GB
//! - IN_DOCKER: "true" if running in Docker; default is "false"

pub mod error;

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use std::{
	env,
	fs::{create_dir_all, metadata},
	path::Path,
};
use tracing::{info, Subscriber};
use tracing_subscriber::{
	filter::EnvFilter,
	fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
	prelude::*,
	registry::LookupSpan,
};

/// Base file name used for file logging
pub const LOG_FILE_NAME: &str = "node-audit.log";

const DEFAULT_LOG_MAX_SIZE: u64 = 1_073_741_824;

lazy_static! {
	static ref ANSI_ESCAPE: Regex = Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("ANSI escape pattern is valid");
}

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
	Stdout,
	File,
}

/// Logging settings resolved once at startup and handed to [`setup_logging`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
	pub mode: LogMode,
	pub level: String,
	pub log_dir: String,
	pub max_size: u64,
}

impl Default for LogSettings {
	fn default() -> Self {
		Self {
			mode: LogMode::Stdout,
			level: "info".to_string(),
			log_dir: "logs/".to_string(),
			max_size: DEFAULT_LOG_MAX_SIZE,
		}
	}
}

impl LogSettings {
	/// Reads the settings from the environment.
	///
	/// Fails only when `LOG_MAX_SIZE` is set to something that is not a `u64`.
	pub fn from_env() -> Result<Self, String> {
		let mode = match env::var("LOG_MODE") {
			Ok(mode) if mode.eq_ignore_ascii_case("file") => LogMode::File,
			_ => LogMode::Stdout,
		};
		let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

		// Containers always write under logs/ so the volume mount stays stable
		let in_docker = env::var("IN_DOCKER").map(|v| v == "true").unwrap_or(false);
		let log_dir = if in_docker {
			"logs/".to_string()
		} else {
			env::var("LOG_DATA_DIR").unwrap_or_else(|_| "logs/".to_string())
		};

		let max_size = match env::var("LOG_MAX_SIZE") {
			Ok(raw) => parse_log_max_size(&raw)?,
			Err(_) => DEFAULT_LOG_MAX_SIZE,
		};

		Ok(Self {
			mode,
			level,
			log_dir,
			max_size,
		})
	}

	fn level_filter(&self) -> tracing::Level {
		match self.level.to_lowercase().as_str() {
			"trace" => tracing::Level::TRACE,
			"debug" => tracing::Level::DEBUG,
			"warn" => tracing::Level::WARN,
			"error" => tracing::Level::ERROR,
			_ => tracing::Level::INFO,
		}
	}
}

fn parse_log_max_size(raw: &str) -> Result<u64, String> {
	raw.trim()
		.parse::<u64>()
		.map_err(|e| format!("LOG_MAX_SIZE must be a valid u64 if set: {}", e))
}

/// Formatter wrapper that strips ANSI escape codes, used for file output
struct StripAnsiFormatter<T> {
	inner: T,
}

impl<S, N, T> FormatEvent<S, N> for StripAnsiFormatter<T>
where
	S: Subscriber + for<'a> LookupSpan<'a>,
	N: for<'a> FormatFields<'a> + 'static,
	T: FormatEvent<S, N>,
{
	fn format_event(
		&self,
		ctx: &FmtContext<'_, S, N>,
		mut writer: Writer<'_>,
		event: &tracing::Event<'_>,
	) -> std::fmt::Result {
		let mut buf = String::new();
		self.inner.format_event(ctx, Writer::new(&mut buf), event)?;
		write!(writer, "{}", strip_ansi_escapes(&buf))
	}
}

fn strip_ansi_escapes(s: &str) -> String {
	ANSI_ESCAPE.replace_all(s, "").to_string()
}

/// Computes the path of the rolled log file given the base file path and the date string.
pub fn compute_rolled_file_path(base_file_path: &str, date_str: &str, index: u32) -> String {
	let trimmed = base_file_path
		.strip_suffix(".log")
		.unwrap_or(base_file_path);
	format!("{}-{}.{}.log", trimmed, date_str, index)
}

/// Returns the first rolled path at or after `file_path` whose file is not larger than
/// `max_size` bytes.
pub fn space_based_rolling(
	file_path: &str,
	base_file_path: &str,
	date_str: &str,
	max_size: u64,
) -> String {
	let mut final_path = file_path.to_string();
	let mut index = 1;
	while let Ok(metadata) = metadata(&final_path) {
		if metadata.len() <= max_size {
			break;
		}
		index += 1;
		final_path = compute_rolled_file_path(base_file_path, date_str, index);
	}
	final_path
}

fn create_log_format(with_ansi: bool) -> fmt::format::Format<fmt::format::Compact> {
	fmt::format()
		.with_level(true)
		.with_target(true)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_ansi(with_ansi)
		.compact()
}

/// Installs the global `tracing` subscriber described by `settings`.
pub fn setup_logging(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error>> {
	let format = create_log_format(settings.mode == LogMode::Stdout);
	let subscriber =
		tracing_subscriber::registry().with(EnvFilter::new(settings.level_filter().to_string()));

	match settings.mode {
		LogMode::File => {
			let log_dir = format!("{}/", settings.log_dir.trim_end_matches('/'));
			let date_str = Utc::now().format("%Y-%m-%d").to_string();
			let base_file_path = format!("{}{}", log_dir, LOG_FILE_NAME);

			let time_based_path = compute_rolled_file_path(&base_file_path, &date_str, 1);
			if let Some(parent) = Path::new(&time_based_path).parent() {
				create_dir_all(parent)?;
			}
			let final_path = space_based_rolling(
				&time_based_path,
				&base_file_path,
				&date_str,
				settings.max_size,
			);

			let final_path = Path::new(&final_path);
			let file_appender = tracing_appender::rolling::never(
				final_path.parent().unwrap_or(Path::new(".")),
				final_path.file_name().unwrap_or_default(),
			);

			subscriber
				.with(
					fmt::layer()
						.event_format(StripAnsiFormatter { inner: format })
						.with_writer(file_appender)
						.fmt_fields(fmt::format::PrettyFields::new()),
				)
				.try_init()?;
		}
		LogMode::Stdout => {
			subscriber
				.with(
					fmt::layer()
						.event_format(format)
						.fmt_fields(fmt::format::PrettyFields::new()),
				)
				.try_init()?;
		}
	}

	info!(
		"Logging is successfully configured (mode: {:?}, level: {})",
		settings.mode, settings.level
	);
	Ok(())
}
