//! Node Endpoint Configuration
//!
//! Where the RPC client sends its commands and how it authenticates.
//! Values come from defaults, then `VOLT_*` environment variables, then
//! explicit overrides from the caller (CLI flags).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{VoltError, VoltResult};

/// Node RPC port used by a default local node
pub const DEFAULT_NODE_URL: &str = "http://127.0.0.1:6001";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const ENV_NODE_URL: &str = "VOLT_NODE_URL";
pub const ENV_RPC_PASSWORD: &str = "VOLT_RPC_PASSWORD";
pub const ENV_NODE_OVERRIDE: &str = "VOLT_NODE_OVERRIDE";
pub const ENV_RPC_TIMEOUT: &str = "VOLT_RPC_TIMEOUT_SECS";

/// Connection settings for one node
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// RPC endpoint the envelope is POSTed to
    pub url: String,
    /// Sent as the envelope's `password` field when set
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Upstream node a proxy should forward to (`X-Node-Url` / `node`)
    #[serde(default)]
    pub node_override: Option<String>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NODE_URL.to_string(),
            password: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            node_override: None,
        }
    }
}

impl std::fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConfig")
            .field("url", &self.url)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("node_override", &self.node_override)
            .finish()
    }
}

impl NodeConfig {
    /// Defaults overlaid with the `VOLT_*` environment
    pub fn from_env() -> VoltResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`NodeConfig::from_env`] over an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> VoltResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let present = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = present(ENV_NODE_URL) {
            config.url = normalize_node_url(&url)?;
        }
        config.password = present(ENV_RPC_PASSWORD);
        if let Some(node) = present(ENV_NODE_OVERRIDE) {
            config.node_override = Some(normalize_node_url(&node)?);
        }
        if let Some(raw) = present(ENV_RPC_TIMEOUT) {
            config.timeout_secs = raw
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| VoltError::invalid_input(format!("{} must be a positive integer, got {}", ENV_RPC_TIMEOUT, raw)))?;
        }
        Ok(config)
    }

    pub fn with_url(mut self, url: &str) -> VoltResult<Self> {
        self.url = normalize_node_url(url)?;
        Ok(self)
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_node_override(mut self, node: &str) -> VoltResult<Self> {
        self.node_override = Some(normalize_node_url(node)?);
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Trim, default the scheme to `http://`, and parse
///
/// Only `http` and `https` are accepted. A bare `host:port` gets the same
/// treatment the web client applies to a user-typed node address.
pub fn normalize_node_url(raw: &str) -> VoltResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(VoltError::invalid_input("Node URL is empty"));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let parsed = Url::parse(&with_scheme)
        .map_err(|e| VoltError::invalid_input(format!("Invalid node URL {}: {}", trimmed, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(VoltError::invalid_input(format!("Unsupported URL scheme: {}", other)));
        }
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(VoltError::invalid_input(format!("Node URL has no host: {}", trimmed)));
    }

    Ok(parsed.to_string())
}

/// Outcome of [`validate_endpoint`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointValidation {
    pub is_valid: bool,
    pub url: Option<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Check an endpoint and collect warnings the caller may want to surface
pub fn validate_endpoint(url: &str) -> EndpointValidation {
    let mut result = EndpointValidation::default();

    let normalized = match normalize_node_url(url) {
        Ok(u) => u,
        Err(e) => {
            result.errors.push(e.message);
            return result;
        }
    };
    // normalize_node_url already parsed this successfully
    let Ok(parsed) = Url::parse(&normalized) else {
        result.errors.push("Invalid URL".to_string());
        return result;
    };

    if parsed.scheme() == "http" && !is_local_host(parsed.host_str().unwrap_or("")) {
        result
            .warnings
            .push("Plain HTTP to a remote node exposes the RPC password and transactions in transit".to_string());
    }
    if !parsed.username().is_empty() || parsed.password().is_some() {
        result
            .warnings
            .push("Credentials in URL - prefer the RPC password setting".to_string());
    }

    result.is_valid = true;
    result.url = Some(normalized);
    result
}

fn is_local_host(host: &str) -> bool {
    host == "localhost"
        || host == "127.0.0.1"
        || host == "[::1]"
        || host.starts_with("192.168.")
        || host.starts_with("10.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = NodeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, NodeConfig::default());
        assert_eq!(config.url, "http://127.0.0.1:6001");
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_environment_overrides() {
        let config = NodeConfig::from_lookup(lookup(&[
            (ENV_NODE_URL, "node.example.org:6001"),
            (ENV_RPC_PASSWORD, "hunter2"),
            (ENV_NODE_OVERRIDE, "https://upstream.example.org"),
            (ENV_RPC_TIMEOUT, "30"),
        ]))
        .unwrap();
        assert_eq!(config.url, "http://node.example.org:6001/");
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.node_override.as_deref(), Some("https://upstream.example.org/"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_bad_timeout_rejected() {
        assert!(NodeConfig::from_lookup(lookup(&[(ENV_RPC_TIMEOUT, "soon")])).is_err());
        assert!(NodeConfig::from_lookup(lookup(&[(ENV_RPC_TIMEOUT, "0")])).is_err());
    }

    #[test]
    fn test_normalize_node_url() {
        assert_eq!(normalize_node_url(" 10.0.0.5:6001 ").unwrap(), "http://10.0.0.5:6001/");
        assert_eq!(normalize_node_url("https://node.volt.io").unwrap(), "https://node.volt.io/");
        assert!(normalize_node_url("").is_err());
        assert!(normalize_node_url("ftp://node.volt.io").is_err());
    }

    #[test]
    fn test_validate_endpoint_warnings() {
        let local = validate_endpoint("http://127.0.0.1:6001");
        assert!(local.is_valid);
        assert!(local.warnings.is_empty());

        let remote = validate_endpoint("http://user:pw@node.example.org:6001");
        assert!(remote.is_valid);
        assert_eq!(remote.warnings.len(), 2);

        let bad = validate_endpoint("ws://node.example.org");
        assert!(!bad.is_valid);
        assert_eq!(bad.errors.len(), 1);
    }

    #[test]
    fn test_debug_hides_password() {
        let config = NodeConfig::default().with_password("hunter2");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
