//! Ronin node audit service.
//!
//! A JSON-RPC 2.0 client and message layer for EVM-style nodes, and the audit loop built
//! on it that compares the chain tip of audited nodes against a reference node and raises
//! Telegram alerts.
//!
//! # Module Structure
//!
//! - `bootstrap`: Wires the audit service from configuration
//! - `models`: Chain data records, configuration and secrets
//! - `services`: JSON-RPC client, alert delivery and the audit loop
//! - `utils`: Logging, HTTP, metrics and parsing helpers

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
