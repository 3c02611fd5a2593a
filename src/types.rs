//! Shared types for the Volt wallet core
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization and FFI compatibility.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symbol of the native asset
pub const NATIVE_TOKEN: &str = "VLT";

/// Atomic units per display unit (8 decimal places)
pub const ATOMIC_PER_VLT: u64 = 100_000_000;

// =============================================================================
// Wallet Types
// =============================================================================

/// Key material derived from a mnemonic
///
/// `address` is the compressed secp256k1 public key in lowercase hex and
/// `private_key` is the 32-byte scalar in lowercase hex.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct WalletKeys {
    pub address: String,
    #[serde(rename = "privateKey", alias = "private_key")]
    pub private_key: String,
    pub mnemonic: String,
}

impl fmt::Debug for WalletKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletKeys")
            .field("address", &self.address)
            .field("private_key", &"[REDACTED]")
            .field("mnemonic", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Node Snapshot Types
// =============================================================================

/// Account snapshot returned by `get_balance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceInfo {
    #[serde(default)]
    pub balance: u64,
    #[serde(default)]
    pub staked: u64,
    /// Last nonce the node has recorded for this account
    #[serde(default)]
    pub nonce: u64,
}

/// Per-token balances returned by `get_assets`
pub type AssetBalances = HashMap<String, u64>;

/// Constant-product pool snapshot, owned by the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub token_a: String,
    pub token_b: String,
    pub reserve_a: u64,
    pub reserve_b: u64,
    pub total_shares: u64,
}

impl Pool {
    /// Lookup key the node files this pool under
    pub fn id(&self) -> String {
        crate::amm::pool_id(&self.token_a, &self.token_b)
    }

    /// Name of the LP token minted for this pool
    pub fn lp_token(&self) -> String {
        format!("LP-{}", self.id())
    }
}

/// Resting limit order in the node's book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub creator: String,
    pub token: String,
    pub side: String,
    pub price: u64,
    pub amount: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nft {
    pub id: String,
    pub owner: String,
    pub uri: String,
    pub created_at: u64,
}

// =============================================================================
// Response Types
// =============================================================================

/// Result of a successful broadcast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub hash: String,
    pub nonce: u64,
    pub message: Option<String>,
}

/// Envelope returned across the FFI boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<crate::error::VoltError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: crate::error::VoltError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed"}}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_keys_debug_redacts_secrets() {
        let keys = WalletKeys {
            address: "02abc".to_string(),
            private_key: "deadbeef".to_string(),
            mnemonic: "abandon about".to_string(),
        };
        let printed = format!("{:?}", keys);
        assert!(printed.contains("02abc"));
        assert!(!printed.contains("deadbeef"));
        assert!(!printed.contains("abandon"));
    }

    #[test]
    fn test_wallet_keys_wire_names() {
        let keys = WalletKeys {
            address: "02abc".to_string(),
            private_key: "00ff".to_string(),
            mnemonic: "m".to_string(),
        };
        let json = serde_json::to_value(&keys).unwrap();
        assert_eq!(json["privateKey"], "00ff");

        let back: WalletKeys =
            serde_json::from_str(r#"{"address":"02abc","private_key":"00ff","mnemonic":"m"}"#).unwrap();
        assert_eq!(back, keys);
    }

    #[test]
    fn test_balance_defaults_missing_fields() {
        let info: BalanceInfo = serde_json::from_str(r#"{"balance": 5}"#).unwrap();
        assert_eq!(info.nonce, 0);
        assert_eq!(info.staked, 0);
    }

    #[test]
    fn test_pool_identity() {
        let pool = Pool {
            token_a: "VLT".to_string(),
            token_b: "GOLD".to_string(),
            reserve_a: 1,
            reserve_b: 1,
            total_shares: 1,
        };
        assert_eq!(pool.id(), "VLT/GOLD");
        assert_eq!(pool.lp_token(), "LP-VLT/GOLD");
    }

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::ok("test_data".to_string());
        let json = response.to_json();
        assert!(json.contains("success"));
        assert!(json.contains("test_data"));
    }
}
