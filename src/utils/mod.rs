//! Utility modules for common functionality.
//!
//! - http: HTTP client utilities (i.e. creation retryable HTTP clients)
//! - logging: Logging utilities and the shared error context
//! - metrics: Prometheus metrics and the metrics server
//! - parsing: Parsing utilities
//! - tests: Test utilities

pub mod http;
pub mod logging;
pub mod metrics;
pub mod parsing;
pub mod tests;

pub use http::*;
pub use parsing::*;
