//! HTTP Client Factory
//!
//! Blocking `reqwest` clients configured for talking to a Volt node.

use reqwest::blocking::Client;
use std::time::Duration;

use crate::error::{VoltError, VoltResult};

pub const USER_AGENT: &str = "Volt/1.0";

/// Connect timeout applied regardless of the request timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a client with the given overall request timeout
pub fn build_client(timeout: Duration) -> VoltResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(2)
        .tcp_nodelay(true)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| VoltError::network_error(format!("Failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        let client = build_client(Duration::from_secs(5)).unwrap();
        assert!(client.post("http://127.0.0.1:6001").build().is_ok());
    }
}
