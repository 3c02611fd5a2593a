//! Typed Transaction Kinds
//!
//! The node overloads the generic record's `receiver`, `amount`, `token`
//! and `price` fields per kind. `TxKind` names those fields explicitly and
//! converts to and from the flat wire record at the boundary.

use serde::{Deserialize, Serialize};

use super::{Transaction, TxType};
use crate::amm::{parse_pool_id, pool_id, SwapDirection};
use crate::error::{VoltError, VoltResult};
use crate::types::NATIVE_TOKEN;

/// Routing tags and sink accounts understood by the node
pub mod routing {
    pub const BURN_ADDRESS: &str = "0000000000000000000000000000000000000000";
    pub const NFT_BURN: &str = "BURN";
    pub const DEX_BUY: &str = "DEX_BUY";
    pub const DEX_SELL: &str = "DEX_SELL";
    pub const DEX_CANCEL: &str = "DEX_CANCEL";
    pub const AMM_SYSTEM: &str = "AMM_SYSTEM";
    pub const SWAP_A_TO_B: &str = "SWAP_A_TO_B";
    pub const SWAP_B_TO_A: &str = "SWAP_B_TO_A";
    pub const STAKE_SYSTEM: &str = "STAKE_SYSTEM";
}

/// Side of a limit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn routing_tag(&self) -> &'static str {
        match self {
            OrderSide::Buy => routing::DEX_BUY,
            OrderSide::Sell => routing::DEX_SELL,
        }
    }

    pub fn from_routing_tag(tag: &str) -> Option<Self> {
        match tag {
            routing::DEX_BUY => Some(OrderSide::Buy),
            routing::DEX_SELL => Some(OrderSide::Sell),
            _ => None,
        }
    }
}

/// One variant per node transaction kind, each with its own named fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TxKind {
    Transfer {
        receiver: String,
        amount: u64,
        token: String,
    },
    IssueToken {
        symbol: String,
        supply: u64,
    },
    Burn {
        token: String,
        amount: u64,
    },
    PlaceOrder {
        side: OrderSide,
        token: String,
        amount: u64,
        limit_price: u64,
    },
    CancelOrder {
        order_id: String,
    },
    AddLiquidity {
        token_a: String,
        token_b: String,
        amount_a: u64,
        amount_b: u64,
    },
    RemoveLiquidity {
        token_a: String,
        token_b: String,
        shares: u64,
    },
    Swap {
        token_a: String,
        token_b: String,
        direction: SwapDirection,
        amount_in: u64,
        min_output: u64,
    },
    IssueNft {
        nft_id: String,
        uri: String,
    },
    TransferNft {
        nft_id: String,
        new_owner: String,
    },
    BurnNft {
        nft_id: String,
    },
    Stake {
        amount: u64,
    },
    Unstake {
        amount: u64,
    },
}

impl TxKind {
    /// Native-asset transfer
    pub fn transfer(receiver: impl Into<String>, amount: u64) -> Self {
        TxKind::Transfer {
            receiver: receiver.into(),
            amount,
            token: NATIVE_TOKEN.to_string(),
        }
    }

    pub fn tx_type(&self) -> TxType {
        match self {
            TxKind::Transfer { .. } => TxType::Transfer,
            TxKind::IssueToken { .. } => TxType::IssueToken,
            TxKind::Burn { .. } => TxType::Burn,
            TxKind::PlaceOrder { .. } => TxType::PlaceOrder,
            TxKind::CancelOrder { .. } => TxType::CancelOrder,
            TxKind::AddLiquidity { .. } => TxType::AddLiquidity,
            TxKind::RemoveLiquidity { .. } => TxType::RemoveLiquidity,
            TxKind::Swap { .. } => TxType::Swap,
            TxKind::IssueNft { .. } => TxType::IssueNft,
            TxKind::TransferNft { .. } => TxType::TransferNft,
            TxKind::BurnNft { .. } => TxType::BurnNft,
            TxKind::Stake { .. } => TxType::Stake,
            TxKind::Unstake { .. } => TxType::Unstake,
        }
    }

    /// Flatten into the wire record, unsigned
    pub fn to_wire(&self, sender: &str, nonce: u64, timestamp: u64, fee: u64) -> Transaction {
        let mut tx = Transaction::new(sender, String::new(), 0, timestamp);
        tx.nonce = nonce;
        tx.fee = fee;
        tx.tx_type = self.tx_type();

        let (receiver, amount, token, price) = match self {
            TxKind::Transfer { receiver, amount, token } => (receiver.clone(), *amount, token.clone(), 0),
            TxKind::IssueToken { symbol, supply } => (sender.to_string(), *supply, symbol.clone(), 0),
            TxKind::Burn { token, amount } => (routing::BURN_ADDRESS.to_string(), *amount, token.clone(), 0),
            TxKind::PlaceOrder { side, token, amount, limit_price } => {
                (side.routing_tag().to_string(), *amount, token.clone(), *limit_price)
            }
            TxKind::CancelOrder { order_id } => (routing::DEX_CANCEL.to_string(), 0, order_id.clone(), 0),
            TxKind::AddLiquidity { token_a, token_b, amount_a, amount_b } => {
                (routing::AMM_SYSTEM.to_string(), *amount_a, pool_id(token_a, token_b), *amount_b)
            }
            TxKind::RemoveLiquidity { token_a, token_b, shares } => {
                (routing::AMM_SYSTEM.to_string(), *shares, pool_id(token_a, token_b), 0)
            }
            TxKind::Swap { token_a, token_b, direction, amount_in, min_output } => {
                (direction.routing_tag().to_string(), *amount_in, pool_id(token_a, token_b), *min_output)
            }
            TxKind::IssueNft { nft_id, uri } => (uri.clone(), 0, nft_id.clone(), 0),
            TxKind::TransferNft { nft_id, new_owner } => (new_owner.clone(), 0, nft_id.clone(), 0),
            TxKind::BurnNft { nft_id } => (routing::NFT_BURN.to_string(), 0, nft_id.clone(), 0),
            TxKind::Stake { amount } => (routing::STAKE_SYSTEM.to_string(), *amount, NATIVE_TOKEN.to_string(), 0),
            TxKind::Unstake { amount } => (sender.to_string(), *amount, NATIVE_TOKEN.to_string(), 0),
        };

        tx.receiver = receiver;
        tx.amount = amount;
        tx.token = token;
        tx.price = price;
        tx
    }

    /// Recover the typed view of a wire record
    ///
    /// Routing tags must be the exact ones the node writes; pool ids must
    /// be a single `A/B` pair.
    pub fn from_wire(tx: &Transaction) -> VoltResult<Self> {
        let kind = match tx.tx_type {
            TxType::Transfer => TxKind::Transfer {
                receiver: tx.receiver.clone(),
                amount: tx.amount,
                token: tx.token.clone(),
            },
            TxType::IssueToken => TxKind::IssueToken {
                symbol: tx.token.clone(),
                supply: tx.amount,
            },
            TxType::Burn => TxKind::Burn {
                token: tx.token.clone(),
                amount: tx.amount,
            },
            TxType::PlaceOrder => {
                let side = OrderSide::from_routing_tag(&tx.receiver).ok_or_else(|| {
                    VoltError::invalid_transaction(format!("Unknown order side tag: {}", tx.receiver))
                })?;
                TxKind::PlaceOrder {
                    side,
                    token: tx.token.clone(),
                    amount: tx.amount,
                    limit_price: tx.price,
                }
            }
            TxType::CancelOrder => {
                expect_tag(tx, routing::DEX_CANCEL)?;
                TxKind::CancelOrder { order_id: tx.token.clone() }
            }
            TxType::AddLiquidity => {
                let (token_a, token_b) = parse_pool_id(&tx.token)?;
                TxKind::AddLiquidity {
                    token_a,
                    token_b,
                    amount_a: tx.amount,
                    amount_b: tx.price,
                }
            }
            TxType::RemoveLiquidity => {
                let (token_a, token_b) = parse_pool_id(&tx.token)?;
                TxKind::RemoveLiquidity {
                    token_a,
                    token_b,
                    shares: tx.amount,
                }
            }
            TxType::Swap => {
                let direction = SwapDirection::from_routing_tag(&tx.receiver).ok_or_else(|| {
                    VoltError::invalid_transaction(format!("Unknown swap direction tag: {}", tx.receiver))
                })?;
                let (token_a, token_b) = parse_pool_id(&tx.token)?;
                TxKind::Swap {
                    token_a,
                    token_b,
                    direction,
                    amount_in: tx.amount,
                    min_output: tx.price,
                }
            }
            TxType::IssueNft => TxKind::IssueNft {
                nft_id: tx.token.clone(),
                uri: tx.receiver.clone(),
            },
            TxType::TransferNft => TxKind::TransferNft {
                nft_id: tx.token.clone(),
                new_owner: tx.receiver.clone(),
            },
            TxType::BurnNft => TxKind::BurnNft { nft_id: tx.token.clone() },
            TxType::Stake => {
                expect_tag(tx, routing::STAKE_SYSTEM)?;
                TxKind::Stake { amount: tx.amount }
            }
            TxType::Unstake => TxKind::Unstake { amount: tx.amount },
        };
        Ok(kind)
    }
}

fn expect_tag(tx: &Transaction, tag: &str) -> VoltResult<()> {
    if tx.receiver != tag {
        return Err(VoltError::invalid_transaction(format!(
            "{} expects receiver {}, got {}",
            tx.tx_type, tag, tx.receiver
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENDER: &str = "03121d88562183c3d55d93d60f83933128cf9ba1ac67ffaa2a21663c8c47c4b252";

    fn all_kinds() -> Vec<TxKind> {
        vec![
            TxKind::transfer("02aa", 5),
            TxKind::IssueToken { symbol: "GOLD".into(), supply: 1_000 },
            TxKind::Burn { token: "GOLD".into(), amount: 7 },
            TxKind::PlaceOrder { side: OrderSide::Buy, token: "GOLD".into(), amount: 3, limit_price: 9 },
            TxKind::CancelOrder { order_id: "ord-1".into() },
            TxKind::AddLiquidity { token_a: "VLT".into(), token_b: "GOLD".into(), amount_a: 10, amount_b: 20 },
            TxKind::RemoveLiquidity { token_a: "VLT".into(), token_b: "GOLD".into(), shares: 4 },
            TxKind::Swap {
                token_a: "VLT".into(),
                token_b: "GOLD".into(),
                direction: SwapDirection::BToA,
                amount_in: 50,
                min_output: 40,
            },
            TxKind::IssueNft { nft_id: "nft-1".into(), uri: "ipfs://x".into() },
            TxKind::TransferNft { nft_id: "nft-1".into(), new_owner: "02bb".into() },
            TxKind::BurnNft { nft_id: "nft-1".into() },
            TxKind::Stake { amount: 11 },
            TxKind::Unstake { amount: 12 },
        ]
    }

    #[test]
    fn test_field_overloading_table() {
        let tx = TxKind::IssueToken { symbol: "GOLD".into(), supply: 1_000 }.to_wire(SENDER, 1, 2, 0);
        assert_eq!(tx.receiver, SENDER);
        assert_eq!(tx.amount, 1_000);
        assert_eq!(tx.token, "GOLD");

        let tx = TxKind::Burn { token: "GOLD".into(), amount: 7 }.to_wire(SENDER, 1, 2, 0);
        assert_eq!(tx.receiver, routing::BURN_ADDRESS);

        let tx = TxKind::PlaceOrder { side: OrderSide::Sell, token: "GOLD".into(), amount: 3, limit_price: 9 }
            .to_wire(SENDER, 1, 2, 0);
        assert_eq!(tx.receiver, "DEX_SELL");
        assert_eq!(tx.price, 9);

        let tx = TxKind::CancelOrder { order_id: "ord-1".into() }.to_wire(SENDER, 1, 2, 0);
        assert_eq!((tx.receiver.as_str(), tx.amount, tx.token.as_str()), ("DEX_CANCEL", 0, "ord-1"));

        let tx = TxKind::AddLiquidity { token_a: "VLT".into(), token_b: "GOLD".into(), amount_a: 10, amount_b: 20 }
            .to_wire(SENDER, 1, 2, 0);
        assert_eq!(tx.receiver, "AMM_SYSTEM");
        assert_eq!(tx.token, "VLT/GOLD");
        assert_eq!((tx.amount, tx.price), (10, 20));

        let tx = TxKind::IssueNft { nft_id: "nft-1".into(), uri: "ipfs://x".into() }.to_wire(SENDER, 1, 2, 0);
        assert_eq!((tx.receiver.as_str(), tx.token.as_str(), tx.amount), ("ipfs://x", "nft-1", 0));
    }

    #[test]
    fn test_swap_wire_fields() {
        let tx = TxKind::Swap {
            token_a: "VLT".into(),
            token_b: "GOLD".into(),
            direction: SwapDirection::AToB,
            amount_in: 100,
            min_output: 85,
        }
        .to_wire(SENDER, 4, 1_700_000_000, 100_000);

        assert_eq!(tx.tx_type, TxType::Swap);
        assert_eq!(tx.receiver, "SWAP_A_TO_B");
        assert_eq!(tx.token, "VLT/GOLD");
        assert_eq!(tx.amount, 100);
        assert_eq!(tx.price, 85);
        assert_eq!(tx.nonce, 4);
        assert_eq!(tx.fee, 100_000);
    }

    #[test]
    fn test_wire_conversion_preserves_kind() {
        for kind in all_kinds() {
            let tx = kind.to_wire(SENDER, 3, 1_700_000_000, 0);
            assert_eq!(tx.tx_type, kind.tx_type());
            assert_eq!(TxKind::from_wire(&tx).unwrap(), kind);
        }
    }

    #[test]
    fn test_from_wire_rejects_unknown_tags() {
        let mut tx = TxKind::Swap {
            token_a: "VLT".into(),
            token_b: "GOLD".into(),
            direction: SwapDirection::AToB,
            amount_in: 1,
            min_output: 0,
        }
        .to_wire(SENDER, 1, 1, 0);
        tx.receiver = "SWAP_SIDEWAYS".into();
        assert!(TxKind::from_wire(&tx).is_err());

        let mut tx = TxKind::CancelOrder { order_id: "x".into() }.to_wire(SENDER, 1, 1, 0);
        tx.receiver = "DEX_BUY".into();
        assert!(TxKind::from_wire(&tx).is_err());
    }

    #[test]
    fn test_from_wire_rejects_bad_pool_id() {
        let mut tx = TxKind::AddLiquidity { token_a: "A".into(), token_b: "B".into(), amount_a: 1, amount_b: 1 }
            .to_wire(SENDER, 1, 1, 0);
        tx.token = "A/B/C".into();
        assert!(TxKind::from_wire(&tx).is_err());
    }
}
