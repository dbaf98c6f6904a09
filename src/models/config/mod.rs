//! Configuration loading and validation.

#![allow(clippy::result_large_err)]

mod app_config;
mod error;

pub use app_config::{AppConfig, NodeEndpoint};
pub use error::ConfigError;
