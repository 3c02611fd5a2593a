//! Node Client
//!
//! [`NodeApi`] is the seam between wallet logic and the transport: one
//! required method, [`NodeApi::call`], plus typed helpers for every command
//! the wallet uses. [`NodeClient`] implements it over blocking HTTP.

use reqwest::blocking::Client;

use super::{RpcRequest, RpcResponse};
use crate::error::{VoltError, VoltResult};
use crate::tx::Transaction;
use crate::types::{AssetBalances, BalanceInfo, Nft, Order, Pool};
use crate::utils::http::build_client;
use crate::utils::network_config::NodeConfig;
use crate::{log_debug, log_warn};

/// Header a proxy reads to pick the upstream node
pub const NODE_URL_HEADER: &str = "X-Node-Url";
/// Query parameter equivalent of [`NODE_URL_HEADER`]
pub const NODE_QUERY_PARAM: &str = "node";

pub trait NodeApi {
    /// Send one envelope and return the decoded reply, whatever its status
    fn call(&self, request: RpcRequest) -> VoltResult<RpcResponse>;

    /// Native balance, stake and last used nonce of an account
    fn get_balance(&self, address: &str) -> VoltResult<BalanceInfo> {
        self.call(RpcRequest::new("get_balance").param("address", address))?
            .into_data()
    }

    /// Positive balances of every token the account has touched
    fn get_assets(&self, address: &str) -> VoltResult<AssetBalances> {
        self.call(RpcRequest::new("get_assets").param("address", address))?
            .into_field("assets")
    }

    fn get_pools(&self) -> VoltResult<Vec<Pool>> {
        self.call(RpcRequest::new("get_pools"))?.into_field("pools")
    }

    fn get_orders(&self) -> VoltResult<Vec<Order>> {
        self.call(RpcRequest::new("get_orders"))?.into_field("orders")
    }

    /// All NFTs, or only those held by `owner`
    fn get_nfts(&self, owner: Option<&str>) -> VoltResult<Vec<Nft>> {
        let mut request = RpcRequest::new("get_nfts");
        if let Some(owner) = owner {
            request = request.param("address", owner);
        }
        self.call(request)?.into_field("nfts")
    }

    /// Submit a signed record; returns the node's acknowledgement message
    fn broadcast_transaction(&self, tx: &Transaction) -> VoltResult<String> {
        let data = serde_json::to_value(tx)?;
        self.call(RpcRequest::new("broadcast_transaction").param("data", data))?
            .into_message()
    }
}

/// Blocking HTTP client for one node endpoint
pub struct NodeClient {
    config: NodeConfig,
    http: Client,
}

impl NodeClient {
    pub fn new(config: NodeConfig) -> VoltResult<Self> {
        let http = build_client(config.timeout())?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}

impl NodeApi for NodeClient {
    fn call(&self, request: RpcRequest) -> VoltResult<RpcResponse> {
        let command = request.command.clone();
        let request = request.with_password(self.config.password.as_deref());

        log_debug!("rpc", "sending command", command = command, url = self.config.url);

        let mut builder = self.http.post(&self.config.url).json(&request);
        if let Some(node) = &self.config.node_override {
            builder = builder
                .header(NODE_URL_HEADER, node.as_str())
                .query(&[(NODE_QUERY_PARAM, node.as_str())]);
        }

        let response = builder.send()?;
        let status = response.status();
        let body = response.text()?;

        match serde_json::from_str::<RpcResponse>(&body) {
            Ok(reply) => {
                if !reply.is_success() {
                    log_warn!("rpc", "node returned error", command = command, message = reply.message);
                }
                Ok(reply)
            }
            Err(_) if !status.is_success() => Err(VoltError::network_error(format!(
                "Node answered {} to {}",
                status, command
            ))),
            Err(e) => Err(VoltError::parse_error(format!("Malformed reply to {}: {}", command, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    /// Records requests and answers from a fixed script
    struct Scripted {
        seen: RefCell<Vec<RpcRequest>>,
        reply: RpcResponse,
    }

    impl NodeApi for Scripted {
        fn call(&self, request: RpcRequest) -> VoltResult<RpcResponse> {
            self.seen.borrow_mut().push(request);
            Ok(self.reply.clone())
        }
    }

    fn scripted(reply: RpcResponse) -> Scripted {
        Scripted {
            seen: RefCell::new(Vec::new()),
            reply,
        }
    }

    #[test]
    fn test_get_assets_unwraps_field() {
        let node = scripted(RpcResponse::success("Assets retrieved", Some(json!({"assets": {"VLT": 5, "GOLD": 2}}))));
        let assets = node.get_assets("02ab").unwrap();
        assert_eq!(assets["GOLD"], 2);
        assert_eq!(node.seen.borrow()[0].params["address"], "02ab");
    }

    #[test]
    fn test_get_nfts_filter_is_optional() {
        let node = scripted(RpcResponse::success("NFTs retrieved", Some(json!({"nfts": []}))));
        node.get_nfts(None).unwrap();
        node.get_nfts(Some("02ab")).unwrap();
        let seen = node.seen.borrow();
        assert!(!seen[0].params.contains_key("address"));
        assert_eq!(seen[1].params["address"], "02ab");
    }

    #[test]
    fn test_broadcast_sends_record_as_data() {
        let node = scripted(RpcResponse::success("Transaction Broadcasted", None));
        let tx = Transaction::new("A", "B", 1, 2);
        assert_eq!(node.broadcast_transaction(&tx).unwrap(), "Transaction Broadcasted");
        let seen = node.seen.borrow();
        assert_eq!(seen[0].command, "broadcast_transaction");
        assert_eq!(seen[0].params["data"]["script_sig"]["type"], "P2PKH");
    }

    #[test]
    fn test_unreachable_node_is_network_error() {
        let config = NodeConfig {
            url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..NodeConfig::default()
        };
        let client = NodeClient::new(config).unwrap();
        let err = client.get_pools().unwrap_err();
        assert!(err.is_retryable());
    }
}
