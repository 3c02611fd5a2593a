//! Fee Schedule
//!
//! Mirrors the fees the node charges so callers can fill the `fee` field
//! and pre-check balances before broadcasting.

use crate::tx::TxType;
use crate::types::ATOMIC_PER_VLT;

/// Flat fee for most kinds (0.001 VLT)
pub const BASE_FEE: u64 = 100_000;
/// Issuing a token costs more (0.005 VLT)
pub const ISSUE_TOKEN_FEE: u64 = 500_000;
/// Cancelling an order is cheap (0.0001 VLT)
pub const CANCEL_ORDER_FEE: u64 = 10_000;

/// Fee the node charges for a kind unless the caller overrides it
pub fn default_fee(tx_type: TxType) -> u64 {
    match tx_type {
        TxType::IssueToken => ISSUE_TOKEN_FEE,
        TxType::CancelOrder => CANCEL_ORDER_FEE,
        _ => BASE_FEE,
    }
}

/// Minimum fee the node accepts for a transfer
///
/// 0.1% of the amount plus one VLT per transaction the sender already has
/// pending, floored at [`BASE_FEE`].
pub fn minimum_transfer_fee(amount: u64, pending_count: u64) -> u64 {
    let proportional = amount / 1000;
    let congestion = pending_count.saturating_mul(ATOMIC_PER_VLT);
    proportional.saturating_add(congestion).max(BASE_FEE)
}

/// Total debit from the sender's native balance for a transfer of VLT
pub fn total_debit(amount: u64, fee: u64) -> Option<u64> {
    amount.checked_add(fee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fees() {
        assert_eq!(default_fee(TxType::Transfer), 100_000);
        assert_eq!(default_fee(TxType::Swap), 100_000);
        assert_eq!(default_fee(TxType::IssueToken), 500_000);
        assert_eq!(default_fee(TxType::CancelOrder), 10_000);
    }

    #[test]
    fn test_minimum_transfer_fee() {
        assert_eq!(minimum_transfer_fee(0, 0), BASE_FEE);
        assert_eq!(minimum_transfer_fee(1_000 * ATOMIC_PER_VLT, 0), 100_000_000);
        assert_eq!(minimum_transfer_fee(1_000, 2), 200_000_001);
        assert_eq!(minimum_transfer_fee(u64::MAX, u64::MAX), u64::MAX);
    }

    #[test]
    fn test_total_debit() {
        assert_eq!(total_debit(5, 1), Some(6));
        assert_eq!(total_debit(u64::MAX, 1), None);
    }
}
