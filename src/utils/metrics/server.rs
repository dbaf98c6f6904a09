//! Metrics server module
//!
//! This module provides an HTTP server to expose Prometheus metrics for scraping
//! and a liveness probe. Every request runs under a [`RequestDeadline`].

use actix_web::middleware::{Compress, DefaultHeaders, NormalizePath};
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

use crate::{
	services::rpc::{with_deadline, ErrorObject, HandlingTimeout, RequestDeadline},
	utils::metrics::{gather_metrics, update_system_metrics},
};

/// Time budget for a single scrape or probe
pub const METRICS_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Metrics endpoint handler
async fn metrics_handler(deadline: RequestDeadline) -> impl Responder {
	// Host sampling blocks for a while; keep it off the worker and under the deadline.
	let gathered = with_deadline(&deadline, async {
		tokio::task::spawn_blocking(|| {
			update_system_metrics();
			gather_metrics().map_err(|e| e.to_string())
		})
		.await
		.map_err(|_| ErrorObject::internal())?
		.map_err(|e| {
			error!("Error gathering metrics: {}", e);
			ErrorObject::internal()
		})
	})
	.await;

	match gathered {
		Ok(buffer) => HttpResponse::Ok()
			.content_type(PROMETHEUS_CONTENT_TYPE)
			.body(buffer),
		Err(e) if e.is_timeout() => HttpResponse::ServiceUnavailable().json(e),
		Err(_) => HttpResponse::InternalServerError().finish(),
	}
}

/// Liveness probe
async fn health_handler(deadline: RequestDeadline) -> impl Responder {
	if deadline.is_done() {
		return HttpResponse::ServiceUnavailable().json(ErrorObject::timeout());
	}
	HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// Rebinds to all interfaces when running in a container.
fn resolve_bind_address(bind_address: &str, in_docker: bool) -> String {
	if !in_docker {
		return bind_address.to_string();
	}
	match bind_address.split(':').nth(1) {
		Some(port) => format!("0.0.0.0:{}", port),
		None => "0.0.0.0:8081".to_string(),
	}
}

// Create metrics server
pub fn create_metrics_server(bind_address: String) -> std::io::Result<actix_web::dev::Server> {
	let in_docker = std::env::var("IN_DOCKER").unwrap_or_default() == "true";
	let actual_bind_address = resolve_bind_address(&bind_address, in_docker);

	info!(
		"Starting metrics server on {} (actual bind: {})",
		bind_address, actual_bind_address
	);

	Ok(HttpServer::new(move || {
		App::new()
			.wrap(HandlingTimeout::new(METRICS_REQUEST_TIMEOUT))
			.wrap(Compress::default())
			.wrap(NormalizePath::trim())
			.wrap(DefaultHeaders::new())
			.route("/metrics", web::get().to(metrics_handler))
			.route("/health", web::get().to(health_handler))
	})
	.workers(2)
	.bind(actual_bind_address)?
	.shutdown_timeout(5)
	.run())
}
