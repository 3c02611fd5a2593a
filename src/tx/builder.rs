//! Transaction Builder
//!
//! Turns a typed [`TxKind`] plus account context into a wire record,
//! optionally signed.

use serde::{Deserialize, Serialize};

use super::{compute_tx_hash, sign_in_place, Transaction, TxKind};
use crate::error::{ErrorCode, VoltError, VoltResult};
use crate::fees::{default_fee, minimum_transfer_fee};
use crate::types::WalletKeys;
use crate::wallet::validate_address;

/// Everything needed to build one transaction besides the sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRequest {
    pub kind: TxKind,
    pub nonce: u64,
    /// Falls back to the minimum fee the node accepts for the kind
    #[serde(default)]
    pub fee: Option<u64>,
    /// Unix seconds; falls back to the current time
    #[serde(default)]
    pub timestamp: Option<u64>,
}

impl TxRequest {
    pub fn new(kind: TxKind, nonce: u64) -> Self {
        Self {
            kind,
            nonce,
            fee: None,
            timestamp: None,
        }
    }
}

/// A signed record together with its canonical hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub hash: String,
    pub transaction: Transaction,
}

/// Current Unix time in seconds
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Build the unsigned wire record for `sender`
pub fn build_transaction(sender: &str, request: &TxRequest) -> VoltResult<Transaction> {
    validate_kind(&request.kind)?;
    let fee = request.fee.unwrap_or_else(|| fee_for(&request.kind));
    let timestamp = request.timestamp.unwrap_or_else(unix_now);
    Ok(request.kind.to_wire(sender, request.nonce, timestamp, fee))
}

// Transfers pay the node's proportional minimum with no pending surcharge
fn fee_for(kind: &TxKind) -> u64 {
    match kind {
        TxKind::Transfer { amount, .. } => default_fee(kind.tx_type()).max(minimum_transfer_fee(*amount, 0)),
        other => default_fee(other.tx_type()),
    }
}

/// Build and sign with the wallet's key
pub fn build_signed_transaction(keys: &WalletKeys, request: &TxRequest) -> VoltResult<SignedTransaction> {
    let mut transaction = build_transaction(&keys.address, request)?;
    sign_in_place(&mut transaction, &keys.private_key)?;
    Ok(SignedTransaction {
        hash: compute_tx_hash(&transaction),
        transaction,
    })
}

/// Local sanity checks the node would otherwise reject after broadcast
pub fn validate_kind(kind: &TxKind) -> VoltResult<()> {
    match kind {
        TxKind::Transfer { receiver, amount, token } => {
            validate_address(receiver)?;
            require_positive(*amount, "amount")?;
            require_symbol(token)
        }
        TxKind::IssueToken { symbol, supply } => {
            require_symbol(symbol)?;
            require_positive(*supply, "supply")
        }
        TxKind::Burn { token, amount } => {
            require_symbol(token)?;
            require_positive(*amount, "amount")
        }
        TxKind::PlaceOrder { token, amount, limit_price, .. } => {
            require_symbol(token)?;
            require_positive(*amount, "amount")?;
            require_positive(*limit_price, "limit_price")
        }
        TxKind::CancelOrder { order_id } => require_non_empty(order_id, "order_id"),
        TxKind::AddLiquidity { token_a, token_b, amount_a, amount_b } => {
            require_pair(token_a, token_b)?;
            require_positive(*amount_a, "amount_a")?;
            require_positive(*amount_b, "amount_b")
        }
        TxKind::RemoveLiquidity { token_a, token_b, shares } => {
            require_pair(token_a, token_b)?;
            require_positive(*shares, "shares")
        }
        TxKind::Swap { token_a, token_b, amount_in, .. } => {
            require_pair(token_a, token_b)?;
            require_positive(*amount_in, "amount_in")
        }
        TxKind::IssueNft { nft_id, uri } => {
            require_non_empty(nft_id, "nft_id")?;
            require_non_empty(uri, "uri")
        }
        TxKind::TransferNft { nft_id, new_owner } => {
            require_non_empty(nft_id, "nft_id")?;
            validate_address(new_owner).map(|_| ())
        }
        TxKind::BurnNft { nft_id } => require_non_empty(nft_id, "nft_id"),
        TxKind::Stake { amount } | TxKind::Unstake { amount } => require_positive(*amount, "amount"),
    }
}

fn require_positive(value: u64, field: &str) -> VoltResult<()> {
    if value == 0 {
        return Err(VoltError::new(ErrorCode::InvalidAmount, format!("{} must be greater than zero", field)));
    }
    Ok(())
}

fn require_non_empty(value: &str, field: &str) -> VoltResult<()> {
    if value.trim().is_empty() {
        return Err(VoltError::invalid_transaction(format!("{} must not be empty", field)));
    }
    Ok(())
}

// Colons would corrupt the hash payload and slashes the pool id
fn require_symbol(symbol: &str) -> VoltResult<()> {
    require_non_empty(symbol, "token")?;
    if symbol.contains(':') || symbol.contains('/') {
        return Err(VoltError::invalid_transaction(format!("Invalid token symbol: {}", symbol)));
    }
    Ok(())
}

fn require_pair(token_a: &str, token_b: &str) -> VoltResult<()> {
    require_symbol(token_a)?;
    require_symbol(token_b)?;
    if token_a == token_b {
        return Err(VoltError::invalid_transaction("Pool tokens must differ"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amm::SwapDirection;
    use crate::tx::{verify_transaction, TxType};
    use crate::wallet::restore_wallet;

    const ABANDON: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn keys() -> WalletKeys {
        restore_wallet(ABANDON).unwrap()
    }

    #[test]
    fn test_default_fee_and_timestamp() {
        let k = keys();
        let request = TxRequest::new(TxKind::transfer(k.address.clone(), 5), 3);
        let tx = build_transaction(&k.address, &request).unwrap();
        assert_eq!(tx.fee, 100_000);
        assert_eq!(tx.nonce, 3);
        assert!(tx.timestamp > 1_600_000_000);
    }

    #[test]
    fn test_large_transfer_pays_proportional_fee() {
        let k = keys();
        let thousand_vlt = 1000 * 100_000_000;
        let request = TxRequest::new(TxKind::transfer(k.address.clone(), thousand_vlt), 1);
        let tx = build_transaction(&k.address, &request).unwrap();
        assert_eq!(tx.fee, 100_000_000);

        let stake_fee = build_transaction(&k.address, &TxRequest::new(TxKind::Stake { amount: thousand_vlt }, 1))
            .unwrap()
            .fee;
        assert_eq!(stake_fee, 100_000);
    }

    #[test]
    fn test_explicit_fee_and_timestamp_win() {
        let k = keys();
        let mut request = TxRequest::new(TxKind::IssueToken { symbol: "GOLD".into(), supply: 10 }, 1);
        request.fee = Some(7);
        request.timestamp = Some(42);
        let tx = build_transaction(&k.address, &request).unwrap();
        assert_eq!((tx.fee, tx.timestamp), (7, 42));
        assert_eq!(tx.tx_type, TxType::IssueToken);
    }

    #[test]
    fn test_build_signed_verifies() {
        let k = keys();
        let request = TxRequest::new(
            TxKind::Swap {
                token_a: "VLT".into(),
                token_b: "GOLD".into(),
                direction: SwapDirection::AToB,
                amount_in: 100,
                min_output: 85,
            },
            9,
        );
        let signed = build_signed_transaction(&k, &request).unwrap();
        assert_eq!(signed.hash, compute_tx_hash(&signed.transaction));
        assert!(verify_transaction(&signed.transaction).unwrap());
    }

    #[test]
    fn test_rejects_bad_requests() {
        let k = keys();
        let bad = [
            TxKind::transfer("not-an-address", 5),
            TxKind::transfer(k.address.clone(), 0),
            TxKind::IssueToken { symbol: "A:B".into(), supply: 1 },
            TxKind::AddLiquidity { token_a: "VLT".into(), token_b: "VLT".into(), amount_a: 1, amount_b: 1 },
            TxKind::CancelOrder { order_id: " ".into() },
        ];
        for kind in bad {
            assert!(build_transaction(&k.address, &TxRequest::new(kind, 1)).is_err());
        }
    }
}
