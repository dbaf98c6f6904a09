//! Metrics module for the application.
//!
//! - This module contains the global Prometheus registry.
//! - Defines host metrics and per-node chain tip metrics.

pub mod server;
use lazy_static::lazy_static;
use prometheus::{Encoder, Gauge, GaugeVec, IntCounter, Opts, Registry, TextEncoder};
use sysinfo::{Disks, System};

lazy_static! {
	/// Global Prometheus registry.
	///
	/// This registry holds all metrics defined in this module and is used
	/// to gather metrics for exposure via the metrics endpoint.
	pub static ref REGISTRY: Registry = Registry::new();

	/// Gauge for CPU usage percentage.
	pub static ref CPU_USAGE: Gauge = {
		let gauge = Gauge::new("cpu_usage_percentage", "Current CPU usage percentage").unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Gauge for memory usage percentage.
	pub static ref MEMORY_USAGE_PERCENT: Gauge = {
		let gauge = Gauge::new("memory_usage_percentage", "Memory usage percentage").unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Gauge for memory usage in bytes.
	pub static ref MEMORY_USAGE: Gauge = {
		let gauge = Gauge::new("memory_usage_bytes", "Memory usage in bytes").unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Gauge for total memory in bytes.
	pub static ref TOTAL_MEMORY: Gauge = {
		let gauge = Gauge::new("total_memory_bytes", "Total memory in bytes").unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Gauge for used disk space in bytes.
	pub static ref DISK_USAGE: Gauge = {
		let gauge = Gauge::new("disk_usage_bytes", "Used disk space in bytes").unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Latest block height reported by each node, labelled by node name.
	pub static ref NODE_BLOCK_HEIGHT: GaugeVec = {
		let gauge = GaugeVec::new(
			Opts::new("node_block_height", "Latest block number reported by the node"),
			&["node"]
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Blocks each audited node trails the reference node by.
	pub static ref NODE_BLOCK_DELAY: GaugeVec = {
		let gauge = GaugeVec::new(
			Opts::new("node_block_delay", "Blocks the node is behind the reference node"),
			&["node"]
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Consecutive failed tip lookups per node.
	pub static ref NODE_RPC_FAILURES: GaugeVec = {
		let gauge = GaugeVec::new(
			Opts::new("node_rpc_consecutive_failures", "Consecutive failed RPC calls to the node"),
			&["node"]
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	/// Alerts the chat API accepted since start.
	pub static ref ALERTS_SENT: IntCounter = {
		let counter = IntCounter::new("alerts_sent_total", "Alerts delivered since start").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	/// Alerts whose delivery failed since start.
	pub static ref ALERTS_FAILED: IntCounter = {
		let counter = IntCounter::new("alerts_failed_total", "Alerts that could not be delivered").unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};
}

#[cfg(test)]
lazy_static! {
	/// Serializes tests that reset or read the global metrics
	pub(crate) static ref METRICS_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
}

/// Gather all metrics and encode into the provided format.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
	let encoder = TextEncoder::new();
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	encoder.encode(&metric_families, &mut buffer)?;
	Ok(buffer)
}

/// Updates the host metrics for CPU, memory and disk usage.
pub fn update_system_metrics() {
	let mut sys = System::new_all();
	sys.refresh_all();

	CPU_USAGE.set(sys.global_cpu_usage() as f64);

	let total_memory = sys.total_memory();
	TOTAL_MEMORY.set(total_memory as f64);

	let memory_usage = sys.used_memory();
	MEMORY_USAGE.set(memory_usage as f64);

	let memory_percentage = if total_memory > 0 {
		(memory_usage as f64 / total_memory as f64) * 100.0
	} else {
		0.0
	};
	MEMORY_USAGE_PERCENT.set(memory_percentage);

	let disks = Disks::new_with_refreshed_list();
	let used_disk_space: u64 = disks
		.list()
		.iter()
		.map(|disk| disk.total_space().saturating_sub(disk.available_space()))
		.sum();
	DISK_USAGE.set(used_disk_space as f64);
}

/// Records the latest block height seen on `node`.
pub fn record_block_height(node: &str, height: u64) {
	NODE_BLOCK_HEIGHT
		.with_label_values(&[node])
		.set(height as f64);
}

/// Records how far `node` trails the reference node.
pub fn record_block_delay(node: &str, delay: u64) {
	NODE_BLOCK_DELAY.with_label_values(&[node]).set(delay as f64);
}

/// Records the current run of failed lookups against `node`.
pub fn record_rpc_failures(node: &str, failures: u32) {
	NODE_RPC_FAILURES
		.with_label_values(&[node])
		.set(failures as f64);
}
