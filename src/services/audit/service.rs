//! Chain tip audit loop.
//!
//! Every tick the reference node's latest block is compared against each audited node.
//! Lagging nodes are reported to the delay group; nodes that keep failing are reported
//! to the node group.

use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::{sync::watch, time::MissedTickBehavior};
use tracing::{info, instrument, warn};

use crate::{
	models::AppConfig,
	services::{audit::AuditError, notification::AlertSender, rpc::BlockSource},
	utils::metrics::{
		record_block_delay, record_block_height, record_rpc_failures, ALERTS_FAILED, ALERTS_SENT,
	},
};

/// Sent to the node group when the audit loop starts
pub const STARTUP_MESSAGE: &str = "Ronin node monitor bot started";

/// Thresholds and chat routing for the audit loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditSettings {
	pub delay_group_id: u64,
	pub node_group_id: u64,
	pub max_block_delay: u64,
	pub max_rpc_failures: u32,
	pub poll_interval: Duration,
}

impl From<&AppConfig> for AuditSettings {
	fn from(config: &AppConfig) -> Self {
		Self {
			delay_group_id: config.delay_group_id,
			node_group_id: config.node_group_id,
			max_block_delay: config.max_block_delay,
			max_rpc_failures: config.max_rpc_failures.max(1),
			poll_interval: config.poll_interval,
		}
	}
}

/// A named block source
pub struct AuditedNode<S> {
	pub name: String,
	pub source: S,
}

impl<S> AuditedNode<S> {
	pub fn new(name: impl Into<String>, source: S) -> Self {
		Self {
			name: name.into(),
			source,
		}
	}
}

/// What a round found out about one audited node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeStatus {
	/// Within the tolerated lag
	InSync { height: u64, delay: u64 },
	/// Behind the reference by more than the tolerated lag; an alert was sent
	Delayed { height: u64, delay: u64 },
	/// The tip lookup failed; `alerted` is set when this failure crossed the threshold
	Unreachable { failures: u32, alerted: bool },
}

/// Outcome of a single audit round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
	pub reference_height: u64,
	/// Audited nodes in configuration order
	pub nodes: Vec<(String, NodeStatus)>,
}

impl RoundReport {
	pub fn status(&self, node: &str) -> Option<&NodeStatus> {
		self.nodes
			.iter()
			.find(|(name, _)| name == node)
			.map(|(_, status)| status)
	}
}

/// Formats the delay alert text
pub fn delay_message(
	node: &str,
	height: u64,
	reference: &str,
	reference_height: u64,
	delay: u64,
) -> String {
	format!(
		"{} node block {}, {} block {}, is delayed: {} blocks",
		node, height, reference, reference_height, delay
	)
}

/// Formats the reachability alert text
pub fn unreachable_message(node: &str) -> String {
	format!("Failed to reach {} node rpc many times.", node)
}

/// Compares audited nodes against a reference node and raises alerts
pub struct AuditService<S, A> {
	reference: AuditedNode<S>,
	audited: Vec<AuditedNode<S>>,
	alerts: Arc<A>,
	settings: AuditSettings,
	/// Consecutive failed lookups per audited node
	failures: HashMap<String, u32>,
}

impl<S, A> AuditService<S, A>
where
	S: BlockSource,
	A: AlertSender,
{
	pub fn new(
		reference: AuditedNode<S>,
		audited: Vec<AuditedNode<S>>,
		alerts: Arc<A>,
		settings: AuditSettings,
	) -> Self {
		Self {
			reference,
			audited,
			alerts,
			settings,
			failures: HashMap::new(),
		}
	}

	pub fn settings(&self) -> &AuditSettings {
		&self.settings
	}

	/// Consecutive failed lookups recorded for `node`
	pub fn failures(&self, node: &str) -> u32 {
		self.failures.get(node).copied().unwrap_or(0)
	}

	/// Announces the audit to the node group
	pub async fn announce(&self) {
		info!(
			delay_group_id = self.settings.delay_group_id,
			node_group_id = self.settings.node_group_id,
			"Starting node audit"
		);
		self.alert(self.settings.node_group_id, STARTUP_MESSAGE)
			.await;
	}

	/// Runs one comparison round.
	///
	/// Fails only when the reference tip is unavailable; audited nodes are reported
	/// through the returned [`RoundReport`].
	#[instrument(skip(self), fields(reference = %self.reference.name))]
	pub async fn run_once(&mut self) -> Result<RoundReport, AuditError> {
		let reference_height = self
			.reference
			.source
			.latest_block_number()
			.await
			.map_err(|e| {
				AuditError::reference_unavailable(
					"Failed to fetch latest reference block",
					Some(e.into()),
					Some(HashMap::from([(
						"node".to_string(),
						self.reference.name.clone(),
					)])),
				)
			})?;
		record_block_height(&self.reference.name, reference_height);

		let mut nodes = Vec::with_capacity(self.audited.len());
		for index in 0..self.audited.len() {
			let status = self.audit_node(index, reference_height).await;
			nodes.push((self.audited[index].name.clone(), status));
		}

		Ok(RoundReport {
			reference_height,
			nodes,
		})
	}

	async fn audit_node(&mut self, index: usize, reference_height: u64) -> NodeStatus {
		let node = &self.audited[index];
		let name = node.name.clone();

		match node.source.latest_block_number().await {
			Ok(height) => {
				self.failures.insert(name.clone(), 0);
				record_rpc_failures(&name, 0);
				record_block_height(&name, height);

				let delay = reference_height.saturating_sub(height);
				record_block_delay(&name, delay);

				if height < reference_height.saturating_sub(self.settings.max_block_delay) {
					let message = delay_message(
						&name,
						height,
						&self.reference.name,
						reference_height,
						delay,
					);
					self.alert(self.settings.delay_group_id, &message).await;
					NodeStatus::Delayed { height, delay }
				} else {
					NodeStatus::InSync { height, delay }
				}
			}
			Err(e) => {
				let counter = self.failures.entry(name.clone()).or_insert(0);
				*counter = counter.saturating_add(1);
				let failures = *counter;
				record_rpc_failures(&name, failures);
				warn!(node = %name, failures, error = %e, "Failed to fetch latest block");

				let alerted = failures >= self.settings.max_rpc_failures;
				if alerted {
					self.failures.insert(name.clone(), 0);
					self.alert(self.settings.node_group_id, &unreachable_message(&name))
						.await;
				}
				NodeStatus::Unreachable { failures, alerted }
			}
		}
	}

	/// Sends one alert and reports whether it was delivered
	async fn alert(&self, group_id: u64, message: &str) -> bool {
		match self.alerts.send_alert(group_id, message).await {
			Ok(()) => {
				ALERTS_SENT.inc();
				true
			}
			Err(e) => {
				ALERTS_FAILED.inc();
				warn!(group_id, error = %e, "Failed to deliver alert");
				false
			}
		}
	}

	/// Announces itself, then audits on every tick until `shutdown` flips to `true`
	pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
		self.announce().await;

		let mut interval = tokio::time::interval(self.settings.poll_interval);
		interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			tokio::select! {
				changed = shutdown.changed() => {
					if changed.is_err() || *shutdown.borrow() {
						info!("Shutting down node audit");
						break;
					}
				}
				_ = interval.tick() => {
					// Reference failures are logged where they are built; skip the tick.
					let _ = self.run_once().await;
				}
			}
		}
	}
}
