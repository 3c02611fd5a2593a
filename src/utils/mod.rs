//! Utilities Module
//!
//! Common utilities used across the crate.

pub mod http;
pub mod logging;
pub mod network_config;
