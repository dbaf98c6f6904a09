//! Deadline-bound execution of background work.
//!
//! The work is spawned onto the runtime and the caller waits on a one-shot channel raced
//! against a deadline. Whichever side finishes first decides the outcome. The spawned task
//! is never aborted: when the deadline wins it keeps running, its send into the dropped
//! channel fails silently and it releases its own resources when it ends. Work handed to
//! these functions must therefore be bounded on its own (the RPC client relies on the HTTP
//! client's transport timeout for that).

use std::{future::Future, time::Duration};
use tokio::sync::oneshot;

use super::{deadline::RequestDeadline, error::ErrorObject};

/// Runs `work` in the background and waits at most `timeout` for its outcome.
///
/// Returns `work`'s own result when it completes first, otherwise the `-32608` timeout
/// object. A panic inside `work` surfaces as the internal error object.
pub async fn with_timeout<T, F>(timeout: Duration, work: F) -> Result<T, ErrorObject>
where
	F: Future<Output = Result<T, ErrorObject>> + Send + 'static,
	T: Send + 'static,
{
	race(work, tokio::time::sleep(timeout)).await
}

/// Same as [`with_timeout`] but bounded by a request-scoped deadline.
///
/// Nothing is spawned when the deadline is already done.
pub async fn with_deadline<T, F>(deadline: &RequestDeadline, work: F) -> Result<T, ErrorObject>
where
	F: Future<Output = Result<T, ErrorObject>> + Send + 'static,
	T: Send + 'static,
{
	if deadline.is_done() {
		return Err(ErrorObject::timeout());
	}
	race(work, deadline.cancelled()).await
}

async fn race<T, F, D>(work: F, deadline: D) -> Result<T, ErrorObject>
where
	F: Future<Output = Result<T, ErrorObject>> + Send + 'static,
	T: Send + 'static,
	D: Future<Output = ()>,
{
	let (tx, rx) = oneshot::channel();
	tokio::spawn(async move {
		let outcome = work.await;
		// The receiver is gone once the deadline has won
		let _ = tx.send(outcome);
	});

	tokio::select! {
		biased;
		outcome = rx => outcome.unwrap_or_else(|_| {
			tracing::error!("Background work ended without reporting an outcome");
			Err(ErrorObject::internal())
		}),
		_ = deadline => {
			tracing::debug!("Deadline reached before background work completed");
			Err(ErrorObject::timeout())
		}
	}
}
