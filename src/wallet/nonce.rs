//! Nonce Tracker
//!
//! The node stores the last nonce it accepted per account and admits a
//! transaction only when `tx.nonce > stored`; gaps are allowed. The tracker
//! layers locally reserved and broadcast-but-unconfirmed nonces on top of
//! that so back-to-back submissions never reuse a value.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// =============================================================================
// Types
// =============================================================================

/// Nonce state for one account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceState {
    /// Last nonce the node reported as used
    pub confirmed_nonce: u64,
    /// Broadcast and accepted into the node's pool, not yet reflected in `confirmed_nonce`
    pub pending_nonces: BTreeSet<u64>,
    /// Handed out locally, not yet broadcast
    pub reserved_nonces: BTreeSet<u64>,
}

impl NonceState {
    fn highest_in_flight(&self) -> Option<u64> {
        let pending = self.pending_nonces.iter().next_back().copied();
        let reserved = self.reserved_nonces.iter().next_back().copied();
        pending.max(reserved)
    }
}

/// Result of a nonce allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceResult {
    pub address: String,
    pub nonce: u64,
    pub source: NonceSource,
}

/// Where the allocated value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonceSource {
    /// Node nonce + 1
    Network,
    /// Bumped past locally tracked in-flight nonces
    Local,
}

/// Per-account nonce bookkeeping owned by a wallet session
#[derive(Debug, Default)]
pub struct NonceTracker {
    accounts: HashMap<String, NonceState>,
}

// =============================================================================
// Public API
// =============================================================================

impl NonceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in the node's view and reserve the next usable nonce
    pub fn reserve_next(&mut self, address: &str, node_nonce: u64) -> NonceResult {
        self.sync(address, node_nonce);
        let state = self.accounts.entry(key(address)).or_default();

        let network_next = state.confirmed_nonce.saturating_add(1);
        let next = match state.highest_in_flight() {
            Some(highest) if highest >= network_next => highest.saturating_add(1),
            _ => network_next,
        };
        state.reserved_nonces.insert(next);

        NonceResult {
            address: address.to_string(),
            nonce: next,
            source: if next == network_next { NonceSource::Network } else { NonceSource::Local },
        }
    }

    /// Next nonce without reserving it
    pub fn peek_next(&self, address: &str) -> u64 {
        match self.accounts.get(&key(address)) {
            Some(state) => state
                .highest_in_flight()
                .unwrap_or(0)
                .max(state.confirmed_nonce)
                .saturating_add(1),
            None => 1,
        }
    }

    /// Move a reserved nonce to pending after a successful broadcast
    pub fn mark_pending(&mut self, address: &str, nonce: u64) {
        let state = self.accounts.entry(key(address)).or_default();
        state.reserved_nonces.remove(&nonce);
        state.pending_nonces.insert(nonce);
    }

    /// Forget a nonce whose transaction was never accepted
    pub fn release(&mut self, address: &str, nonce: u64) {
        if let Some(state) = self.accounts.get_mut(&key(address)) {
            state.reserved_nonces.remove(&nonce);
            state.pending_nonces.remove(&nonce);
        }
    }

    /// Record the node's last used nonce; never moves backwards
    pub fn sync(&mut self, address: &str, node_nonce: u64) {
        let state = self.accounts.entry(key(address)).or_default();
        if node_nonce > state.confirmed_nonce {
            state.confirmed_nonce = node_nonce;
        }
        let confirmed = state.confirmed_nonce;
        state.pending_nonces.retain(|&n| n > confirmed);
        state.reserved_nonces.retain(|&n| n > confirmed);
    }

    pub fn state(&self, address: &str) -> Option<&NonceState> {
        self.accounts.get(&key(address))
    }

    pub fn clear(&mut self, address: &str) {
        self.accounts.remove(&key(address));
    }
}

fn key(address: &str) -> String {
    address.trim().to_lowercase()
}
