//! Wallet Session
//!
//! One unlocked wallet plus everything needed to submit transactions from
//! it safely:
//! - submissions are serialized, so nonce selection, signing and broadcast
//!   happen as one unit and two callers never sign with the same nonce
//! - an idle timeout and an absolute lifetime, after which the keys are
//!   wiped
//! - explicit logout, which wipes the keys immediately

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::nonce::NonceTracker;
use crate::amm::{find_pool, quote_swap, SwapQuote, DEFAULT_SLIPPAGE_BPS};
use crate::error::{ErrorCode, VoltError, VoltResult};
use crate::rpc::NodeApi;
use crate::tx::{build_signed_transaction, TxKind, TxRequest};
use crate::types::{BroadcastResult, WalletKeys};
use crate::{log_info, log_warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Inactivity allowed before the session expires
    pub idle_timeout: Duration,
    /// Absolute lifetime regardless of activity
    pub max_duration: Duration,
    /// Slippage tolerance used when building swaps
    pub slippage_bps: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(15 * 60),
            max_duration: Duration::from_secs(24 * 60 * 60),
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// Logged out by the user
    Locked,
    /// Timed out
    Expired,
}

struct SessionInner {
    keys: Option<WalletKeys>,
    nonces: NonceTracker,
    state: SessionState,
    created_at: Instant,
    last_activity: Instant,
}

impl SessionInner {
    fn wipe(&mut self, state: SessionState) {
        // WalletKeys zeroizes on drop
        self.keys = None;
        self.state = state;
    }

    /// Apply timeouts, then return the keys if still usable
    fn active_keys(&mut self, config: &SessionConfig) -> VoltResult<&WalletKeys> {
        if self.state == SessionState::Active {
            let now = Instant::now();
            if now.duration_since(self.last_activity) > config.idle_timeout
                || now.duration_since(self.created_at) > config.max_duration
            {
                self.wipe(SessionState::Expired);
                log_info!("session", "session expired, keys wiped");
            } else {
                self.last_activity = now;
            }
        }
        match (self.state, self.keys.as_ref()) {
            (SessionState::Active, Some(keys)) => Ok(keys),
            (SessionState::Locked, _) => Err(VoltError::session_locked("Wallet is logged out")),
            _ => Err(VoltError::session_expired("Session expired; unlock the wallet again")),
        }
    }
}

/// A single active wallet
pub struct WalletSession {
    config: SessionConfig,
    inner: Mutex<SessionInner>,
}

impl WalletSession {
    pub fn new(keys: WalletKeys) -> Self {
        Self::with_config(keys, SessionConfig::default())
    }

    pub fn with_config(keys: WalletKeys, config: SessionConfig) -> Self {
        let now = Instant::now();
        Self {
            config,
            inner: Mutex::new(SessionInner {
                keys: Some(keys),
                nonces: NonceTracker::new(),
                state: SessionState::Active,
                created_at: now,
                last_activity: now,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn lock_inner(&self) -> VoltResult<MutexGuard<'_, SessionInner>> {
        self.inner
            .lock()
            .map_err(|_| VoltError::internal("Session lock poisoned"))
    }

    /// Current state after applying timeouts
    pub fn state(&self) -> VoltResult<SessionState> {
        let mut inner = self.lock_inner()?;
        let _ = inner.active_keys(&self.config);
        Ok(inner.state)
    }

    /// Address of the unlocked wallet
    pub fn address(&self) -> VoltResult<String> {
        let mut inner = self.lock_inner()?;
        Ok(inner.active_keys(&self.config)?.address.clone())
    }

    /// Wipe the keys; later calls fail with `SessionLocked`
    pub fn logout(&self) -> VoltResult<()> {
        let mut inner = self.lock_inner()?;
        inner.wipe(SessionState::Locked);
        log_info!("session", "logged out, keys wiped");
        Ok(())
    }

    /// Nonce, sign and broadcast `kind` as one serialized step
    pub fn submit<N: NodeApi + ?Sized>(&self, node: &N, kind: TxKind) -> VoltResult<BroadcastResult> {
        self.submit_with_fee(node, kind, None)
    }

    pub fn submit_with_fee<N: NodeApi + ?Sized>(
        &self,
        node: &N,
        kind: TxKind,
        fee: Option<u64>,
    ) -> VoltResult<BroadcastResult> {
        // Held across the whole round trip; this is the submission queue
        let mut guard = self.lock_inner()?;
        let inner = &mut *guard;
        let address = inner.active_keys(&self.config)?.address.clone();

        let account = node.get_balance(&address)?;
        let reserved = inner.nonces.reserve_next(&address, account.nonce);
        let nonce = reserved.nonce;

        let mut request = TxRequest::new(kind, nonce);
        request.fee = fee;

        let built = inner
            .active_keys(&self.config)
            .and_then(|keys| build_signed_transaction(keys, &request));
        let signed = match built {
            Ok(signed) => signed,
            Err(e) => {
                inner.nonces.release(&address, nonce);
                return Err(e);
            }
        };

        match node.broadcast_transaction(&signed.transaction) {
            Ok(message) => {
                inner.nonces.mark_pending(&address, nonce);
                log_info!(
                    "session",
                    "transaction accepted",
                    tx_type = signed.transaction.tx_type,
                    nonce = nonce,
                    tx_hash = signed.hash
                );
                Ok(BroadcastResult {
                    hash: signed.hash,
                    nonce,
                    message: Some(message),
                })
            }
            Err(e) => {
                inner.nonces.release(&address, nonce);
                log_warn!("session", "transaction rejected", nonce = nonce, reason = e.message);
                Err(classify_rejection(node, &address, nonce, e))
            }
        }
    }

    /// Quote against the node's current pools and submit a protected swap
    pub fn swap<N: NodeApi + ?Sized>(
        &self,
        node: &N,
        token_in: &str,
        token_out: &str,
        amount_in: u64,
    ) -> VoltResult<(SwapQuote, BroadcastResult)> {
        let pools = node.get_pools()?;
        let pool = find_pool(&pools, token_in, token_out).ok_or_else(|| {
            VoltError::invalid_input(format!("No pool trades {} against {}", token_in, token_out))
        })?;
        let quote = quote_swap(pool, token_in, amount_in, self.config.slippage_bps)?;
        if quote.expected_output == 0 {
            return Err(VoltError::invalid_input(format!("Pool {} has no liquidity for this trade", quote.pool_id)));
        }

        let kind = TxKind::Swap {
            token_a: pool.token_a.clone(),
            token_b: pool.token_b.clone(),
            direction: quote.direction,
            amount_in,
            min_output: quote.min_output,
        };
        let result = self.submit(node, kind)?;
        Ok((quote, result))
    }
}

/// Node rejections are retryable as `StaleNonce` only once the node shows the nonce as used
///
/// The node answers every failed broadcast with the same text, so the
/// message says nothing about the cause. A fresh account read decides.
fn classify_rejection<N: NodeApi + ?Sized>(node: &N, address: &str, nonce: u64, e: VoltError) -> VoltError {
    if e.code != ErrorCode::NodeRejected {
        return e;
    }
    match node.get_balance(address) {
        Ok(account) if account.nonce >= nonce => VoltError::stale_nonce(e.message),
        _ => e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{RpcRequest, RpcResponse};
    use crate::tx::{verify_transaction, Transaction};
    use crate::wallet::restore_wallet;
    use crate::fees::minimum_transfer_fee;
    use crate::tx::TxType;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    const ABANDON: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    const REJECTED: &str = "Transaction Rejected (Balance/Nonce?)";

    /// Node that never advances its stored nonce on its own and records
    /// broadcasts; transfers must cover the node's fee and balance rules
    struct LaggingNode {
        node_nonce: Cell<u64>,
        balance: u64,
        reject_with: Option<&'static str>,
        // Another device's spend of the same nonce lands just before ours
        used_elsewhere: bool,
        broadcasts: RefCell<Vec<Transaction>>,
    }

    impl LaggingNode {
        fn new(node_nonce: u64) -> Self {
            Self {
                node_nonce: Cell::new(node_nonce),
                balance: 1_000_000_000_000,
                reject_with: None,
                used_elsewhere: false,
                broadcasts: RefCell::new(Vec::new()),
            }
        }

        fn accepts(&self, tx: &Transaction) -> bool {
            if tx.tx_type != TxType::Transfer {
                return true;
            }
            let affordable = tx.amount.checked_add(tx.fee).is_some_and(|debit| debit <= self.balance);
            affordable && tx.fee >= minimum_transfer_fee(tx.amount, 0)
        }
    }

    impl NodeApi for LaggingNode {
        fn call(&self, request: RpcRequest) -> VoltResult<RpcResponse> {
            match request.command.as_str() {
                "get_balance" => Ok(RpcResponse::success(
                    "Balance retrieved",
                    Some(json!({"balance": self.balance, "staked": 0, "nonce": self.node_nonce.get()})),
                )),
                "get_pools" => Ok(RpcResponse::success(
                    "Pools retrieved",
                    Some(json!({"pools": [{"token_a": "VLT", "token_b": "GOLD", "reserve_a": 1000, "reserve_b": 1000, "total_shares": 1000}]})),
                )),
                "broadcast_transaction" => {
                    if let Some(reason) = self.reject_with {
                        return Ok(RpcResponse::error(reason));
                    }
                    let tx: Transaction = serde_json::from_value(request.params["data"].clone())?;
                    if self.used_elsewhere {
                        self.node_nonce.set(tx.nonce);
                        return Ok(RpcResponse::error(REJECTED));
                    }
                    if !self.accepts(&tx) {
                        return Ok(RpcResponse::error(REJECTED));
                    }
                    self.broadcasts.borrow_mut().push(tx);
                    Ok(RpcResponse::success("Transaction Broadcasted", None))
                }
                other => Ok(RpcResponse::error(format!("Unknown Command {}", other))),
            }
        }
    }

    fn session() -> WalletSession {
        WalletSession::new(restore_wallet(ABANDON).unwrap())
    }

    #[test]
    fn test_sequential_submissions_get_distinct_nonces() {
        let node = LaggingNode::new(7);
        let s = session();
        let to = s.address().unwrap();
        let a = s.submit(&node, TxKind::transfer(to.clone(), 1)).unwrap();
        let b = s.submit(&node, TxKind::transfer(to, 1)).unwrap();
        assert_eq!((a.nonce, b.nonce), (8, 9));

        let sent = node.broadcasts.borrow();
        assert!(sent.iter().all(|tx| verify_transaction(tx).unwrap()));
        assert_eq!(sent[0].hash(), a.hash);
    }

    #[test]
    fn test_rejection_releases_nonce_and_classifies() {
        let mut node = LaggingNode::new(0);
        node.reject_with = Some(REJECTED);
        let s = session();
        let to = s.address().unwrap();
        let err = s.submit(&node, TxKind::transfer(to.clone(), 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NodeRejected);
        assert!(!err.is_retryable());

        node.reject_with = None;
        assert_eq!(s.submit(&node, TxKind::transfer(to, 1)).unwrap().nonce, 1);
    }

    #[test]
    fn test_nonce_taken_elsewhere_is_stale() {
        let mut node = LaggingNode::new(4);
        node.used_elsewhere = true;
        let s = session();
        let to = s.address().unwrap();
        let err = s.submit(&node, TxKind::transfer(to.clone(), 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::StaleNonce);
        assert!(err.is_retryable());

        node.used_elsewhere = false;
        assert_eq!(s.submit(&node, TxKind::transfer(to, 1)).unwrap().nonce, 6);
    }

    #[test]
    fn test_insufficient_balance_is_not_retryable() {
        let mut node = LaggingNode::new(0);
        node.balance = 10;
        let s = session();
        let to = s.address().unwrap();
        let err = s.submit(&node, TxKind::transfer(to, 100_000_000)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NodeRejected);
        assert!(!err.is_retryable());
        assert!(node.broadcasts.borrow().is_empty());
    }

    #[test]
    fn test_large_transfer_meets_node_fee_minimum() {
        let node = LaggingNode::new(0);
        let s = session();
        let to = s.address().unwrap();
        let thousand_vlt = 1000 * 100_000_000;
        s.submit(&node, TxKind::transfer(to, thousand_vlt)).unwrap();

        let sent = node.broadcasts.borrow();
        assert_eq!(sent[0].fee, 100_000_000);
        assert_eq!(sent[0].fee, minimum_transfer_fee(thousand_vlt, 0));
    }

    #[test]
    fn test_other_rejections_pass_through() {
        let mut node = LaggingNode::new(0);
        node.reject_with = Some("Invalid Signature");
        let s = session();
        let err = s.submit(&node, TxKind::Stake { amount: 5 }).unwrap_err();
        assert_eq!(err.code, ErrorCode::NodeRejected);
    }

    #[test]
    fn test_logout_locks() {
        let s = session();
        s.logout().unwrap();
        assert_eq!(s.state().unwrap(), SessionState::Locked);
        let err = s.submit(&LaggingNode::new(0), TxKind::Stake { amount: 1 }).unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionLocked);
    }

    #[test]
    fn test_idle_timeout_expires() {
        let config = SessionConfig {
            idle_timeout: Duration::from_millis(1),
            ..SessionConfig::default()
        };
        let s = WalletSession::with_config(restore_wallet(ABANDON).unwrap(), config);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(s.address().unwrap_err().code, ErrorCode::SessionExpired);
        assert_eq!(s.state().unwrap(), SessionState::Expired);
    }

    #[test]
    fn test_swap_uses_slippage_floor() {
        let node = LaggingNode::new(0);
        let s = session();
        let (quote, result) = s.swap(&node, "GOLD", "VLT", 100).unwrap();
        assert_eq!(quote.expected_output, 90);
        assert_eq!(quote.min_output, 85);

        let sent = node.broadcasts.borrow();
        assert_eq!(sent[0].receiver, "SWAP_B_TO_A");
        assert_eq!(sent[0].token, "VLT/GOLD");
        assert_eq!(sent[0].price, 85);
        assert_eq!(sent[0].nonce, result.nonce);
    }

    #[test]
    fn test_swap_without_pool() {
        let s = session();
        assert!(s.swap(&LaggingNode::new(0), "VLT", "SILVER", 100).is_err());
    }
}
