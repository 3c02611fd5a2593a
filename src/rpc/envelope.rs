//! RPC Envelope
//!
//! Every node call is one JSON object POSTed to the endpoint:
//! `{"command": "...", "password"?: "...", ...fields}`. Replies are
//! `{"status": "success", "message", "data"}` or
//! `{"status": "error", "message"}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{VoltError, VoltResult};

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Outgoing command envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl RpcRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            password: None,
            params: Map::new(),
        }
    }

    /// Add a top-level field next to `command`
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_password(mut self, password: Option<&str>) -> Self {
        self.password = password.map(str::to_string);
        self
    }
}

/// Incoming reply envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcResponse {
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            message: message.into(),
            data,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Success message, or the node's error as `NodeRejected`
    pub fn into_message(self) -> VoltResult<String> {
        if self.is_success() {
            Ok(self.message)
        } else {
            Err(VoltError::node_rejected(self.message))
        }
    }

    /// Decode `data`, or the node's error as `NodeRejected`
    pub fn into_data<T: DeserializeOwned>(self) -> VoltResult<T> {
        if !self.is_success() {
            return Err(VoltError::node_rejected(self.message));
        }
        let data = self
            .data
            .ok_or_else(|| VoltError::parse_error(format!("Node reply has no data: {}", self.message)))?;
        Ok(serde_json::from_value(data)?)
    }

    /// Decode one named member of `data`, e.g. `pools` in `{"pools": [...]}`
    pub fn into_field<T: DeserializeOwned>(self, field: &str) -> VoltResult<T> {
        let mut object: Map<String, Value> = self.into_data()?;
        let value = object
            .remove(field)
            .ok_or_else(|| VoltError::parse_error(format!("Node reply is missing `{}`", field)))?;
        Ok(serde_json::from_value(value)?)
    }
}
