//! Wire Transaction Record
//!
//! The flat record the node accepts on `broadcast_transaction`. Every
//! transaction kind shares this shape; see [`super::TxKind`] for the
//! typed view of what each field means per kind.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::VoltError;
use crate::types::NATIVE_TOKEN;

/// Transaction kind tag, serialized by variant name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    #[default]
    Transfer,
    IssueToken,
    Stake,
    Unstake,
    Burn,
    PlaceOrder,
    CancelOrder,
    AddLiquidity,
    RemoveLiquidity,
    Swap,
    #[serde(rename = "IssueNFT")]
    IssueNft,
    #[serde(rename = "TransferNFT")]
    TransferNft,
    #[serde(rename = "BurnNFT")]
    BurnNft,
}

impl TxType {
    pub const ALL: [TxType; 13] = [
        TxType::Transfer,
        TxType::IssueToken,
        TxType::Stake,
        TxType::Unstake,
        TxType::Burn,
        TxType::PlaceOrder,
        TxType::CancelOrder,
        TxType::AddLiquidity,
        TxType::RemoveLiquidity,
        TxType::Swap,
        TxType::IssueNft,
        TxType::TransferNft,
        TxType::BurnNft,
    ];

    /// Tag text exactly as the node renders it in the hash payload
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Transfer => "Transfer",
            TxType::IssueToken => "IssueToken",
            TxType::Stake => "Stake",
            TxType::Unstake => "Unstake",
            TxType::Burn => "Burn",
            TxType::PlaceOrder => "PlaceOrder",
            TxType::CancelOrder => "CancelOrder",
            TxType::AddLiquidity => "AddLiquidity",
            TxType::RemoveLiquidity => "RemoveLiquidity",
            TxType::Swap => "Swap",
            TxType::IssueNft => "IssueNFT",
            TxType::TransferNft => "TransferNFT",
            TxType::BurnNft => "BurnNFT",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = VoltError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TxType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| VoltError::invalid_transaction(format!("Unknown tx_type: {}", s)))
    }
}

/// Script placeholder carried for wire compatibility only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub code: Vec<serde_json::Value>,
    #[serde(rename = "type", default = "p2pkh")]
    pub kind: String,
}

fn p2pkh() -> String {
    "P2PKH".to_string()
}

impl Default for Script {
    fn default() -> Self {
        Self {
            code: Vec::new(),
            kind: p2pkh(),
        }
    }
}

fn default_token() -> String {
    NATIVE_TOKEN.to_string()
}

/// Flat transaction record as exchanged with the node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: u64,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default = "default_token")]
    pub token: String,
    pub timestamp: u64,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub tx_type: TxType,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub script_pub_key: Script,
    #[serde(default)]
    pub script_sig: Script,
}

impl Transaction {
    /// Unsigned transfer of the native asset with every other field defaulted
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: u64, timestamp: u64) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            nonce: 0,
            token: default_token(),
            timestamp,
            price: 0,
            tx_type: TxType::Transfer,
            fee: 0,
            signature: String::new(),
            script_pub_key: Script::default(),
            script_sig: Script::default(),
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Canonical hash of this record, see [`super::compute_tx_hash`]
    pub fn hash(&self) -> String {
        super::compute_tx_hash(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_type_names_roundtrip() {
        for t in TxType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<TxType>().unwrap(), t);
        }
        assert!("IssueNft".parse::<TxType>().is_err());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let tx: Transaction = serde_json::from_str(
            r#"{"sender":"A","receiver":"B","amount":100,"timestamp":1700000000}"#,
        )
        .unwrap();
        assert_eq!(tx.nonce, 0);
        assert_eq!(tx.token, "VLT");
        assert_eq!(tx.price, 0);
        assert_eq!(tx.tx_type, TxType::Transfer);
        assert!(!tx.is_signed());
    }

    #[test]
    fn test_script_placeholder_shape() {
        let tx = Transaction::new("A", "B", 1, 2);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["script_pub_key"], serde_json::json!({"code": [], "type": "P2PKH"}));
        assert_eq!(json["script_sig"], serde_json::json!({"code": [], "type": "P2PKH"}));
        assert_eq!(json["tx_type"], "Transfer");
    }
}
