//! Node audit service.
//!
//! - `service`: the polling loop comparing audited nodes against the reference node
//! - `error`: audit error type

mod error;
mod service;

pub use error::AuditError;
pub use service::{
	delay_message, unreachable_message, AuditService, AuditSettings, AuditedNode, NodeStatus,
	RoundReport, STARTUP_MESSAGE,
};
