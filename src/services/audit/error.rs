//! Audit error types and handling.

use crate::utils::logging::error::{BoxedSource, ErrorContext, TraceableError};
use std::collections::HashMap;
use thiserror::Error as ThisError;

/// Represents errors that can abort an audit round or prevent the audit from starting
#[derive(ThisError, Debug)]
pub enum AuditError {
	/// The reference node could not report its tip, so nothing can be compared
	#[error("Reference node unavailable: {0}")]
	ReferenceUnavailable(Box<ErrorContext>),

	/// A node client could not be built from the configuration
	#[error("Client setup error: {0}")]
	ClientSetup(Box<ErrorContext>),

	/// Other errors that don't fit into the categories above
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl AuditError {
	// Reference unavailable
	pub fn reference_unavailable(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ReferenceUnavailable(Box::new(ErrorContext::new_with_log(
			msg, source, metadata,
		)))
	}

	// Client setup error
	pub fn client_setup(
		msg: impl Into<String>,
		source: Option<BoxedSource>,
		metadata: Option<HashMap<String, String>>,
	) -> Self {
		Self::ClientSetup(Box::new(ErrorContext::new_with_log(msg, source, metadata)))
	}
}

impl TraceableError for AuditError {
	fn trace_id(&self) -> String {
		match self {
			Self::ReferenceUnavailable(ctx) => ctx.trace_id.clone(),
			Self::ClientSetup(ctx) => ctx.trace_id.clone(),
			Self::Other(_) => uuid::Uuid::new_v4().to_string(),
		}
	}
}
