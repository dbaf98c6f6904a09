//! Core services implementing the business logic.
//!
//! This module contains the main service implementations:
//! - `rpc`: JSON-RPC 2.0 client and message layer
//! - `notification`: Alert delivery
//! - `audit`: Chain tip comparison between nodes

pub mod audit;
pub mod notification;
pub mod rpc;
