//! Canonical Transaction Hash
//!
//! The node identifies and signs transactions by a SHA-256 digest over a
//! colon-joined text payload:
//!
//! ```text
//! sender:receiver:amount:nonce:token:timestamp:price:tx_type
//! ```
//!
//! Numbers are plain base-10 and the kind tag is its variant name. The
//! signature, fee and script placeholders are not part of the payload.

use sha2::{Digest, Sha256};

use super::Transaction;

/// Build the exact text the node hashes for `tx`
pub fn canonical_payload(tx: &Transaction) -> String {
    format!(
        "{}:{}:{}:{}:{}:{}:{}:{}",
        tx.sender,
        tx.receiver,
        tx.amount,
        tx.nonce,
        tx.token,
        tx.timestamp,
        tx.price,
        tx.tx_type.as_str()
    )
}

/// Compute the canonical transaction hash as lowercase hex
pub fn compute_tx_hash(tx: &Transaction) -> String {
    hex::encode(tx_digest(tx))
}

/// Raw 32-byte digest behind [`compute_tx_hash`]
pub fn tx_digest(tx: &Transaction) -> [u8; 32] {
    Sha256::digest(canonical_payload(tx).as_bytes()).into()
}
