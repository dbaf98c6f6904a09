//! Request-scoped deadlines for the HTTP status server.
//!
//! [`HandlingTimeout`] wraps every inbound request with a [`RequestDeadline`] stored in the
//! request extensions. Handlers pick it up as an extractor and hand it to
//! [`with_deadline`](super::timeout::with_deadline) or poll [`RequestDeadline::is_done`].
//! A handler that ignores the deadline is never interrupted.

use actix_web::{
	dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
	FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation handle that fires at a fixed instant or when released, whichever is first
#[derive(Debug, Clone)]
pub struct RequestDeadline {
	token: CancellationToken,
	expires_at: Instant,
}

impl RequestDeadline {
	pub fn start(timeout: Duration) -> Self {
		Self {
			token: CancellationToken::new(),
			expires_at: Instant::now() + timeout,
		}
	}

	/// True once the deadline has expired or the handle was released
	pub fn is_done(&self) -> bool {
		self.token.is_cancelled() || self.is_expired()
	}

	pub fn is_expired(&self) -> bool {
		Instant::now() >= self.expires_at
	}

	pub fn remaining(&self) -> Duration {
		self.expires_at.saturating_duration_since(Instant::now())
	}

	/// Resolves when the handle becomes done
	pub async fn cancelled(&self) {
		tokio::select! {
			_ = self.token.cancelled() => {}
			_ = tokio::time::sleep_until(self.expires_at) => {}
		}
	}

	/// Marks the handle done for every clone
	pub fn release(&self) {
		self.token.cancel();
	}
}

impl FromRequest for RequestDeadline {
	type Error = actix_web::Error;
	type Future = Ready<Result<Self, Self::Error>>;

	fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
		ready(
			req.extensions()
				.get::<RequestDeadline>()
				.cloned()
				.ok_or_else(|| {
					actix_web::error::ErrorInternalServerError("request deadline is not installed")
				}),
		)
	}
}

/// Middleware giving each request a [`RequestDeadline`] of a fixed duration
#[derive(Debug, Clone, Copy)]
pub struct HandlingTimeout {
	duration: Duration,
}

impl HandlingTimeout {
	pub fn new(duration: Duration) -> Self {
		Self { duration }
	}
}

impl<S, B> Transform<S, ServiceRequest> for HandlingTimeout
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<B>;
	type Error = actix_web::Error;
	type InitError = ();
	type Transform = HandlingTimeoutMiddleware<S>;
	type Future = Ready<Result<Self::Transform, Self::InitError>>;

	fn new_transform(&self, service: S) -> Self::Future {
		ready(Ok(HandlingTimeoutMiddleware {
			service,
			duration: self.duration,
		}))
	}
}

pub struct HandlingTimeoutMiddleware<S> {
	service: S,
	duration: Duration,
}

impl<S, B> Service<ServiceRequest> for HandlingTimeoutMiddleware<S>
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<B>;
	type Error = actix_web::Error;
	type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

	forward_ready!(service);

	fn call(&self, req: ServiceRequest) -> Self::Future {
		let deadline = RequestDeadline::start(self.duration);
		req.extensions_mut().insert(deadline.clone());

		let fut = self.service.call(req);
		Box::pin(async move {
			let response = fut.await;
			deadline.release();
			response
		})
	}
}
