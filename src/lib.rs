//! Volt Wallet Core
//!
//! Client-side core for the Volt chain: everything a wallet needs to turn
//! a mnemonic into signed transactions the node accepts.
//!
//! # Architecture
//!
//! This crate provides:
//! - **tx**: Wire record, typed kinds, canonical hash, signing, building
//! - **wallet**: Key derivation, validation, amounts, nonces, sessions, keystore
//! - **amm**: Constant-product swap quotes and liquidity estimates
//! - **fees**: The node's fee schedule
//! - **rpc**: JSON command envelope and the blocking node client
//! - **ffi**: C-ABI exports for embedding hosts
//!
//! # FFI Usage
//!
//! All public FFI functions are in the `ffi` module and follow this pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `volt_free_string`)
//!
//! # Security
//!
//! Private keys, seeds, and entropy are held in `zeroize` wrappers and
//! cleared when dropped. Log fields named after secrets are redacted.
//!
//! # Example
//!
//! ```rust,ignore
//! use volt_wallet_core::{restore_wallet, TxKind, TxRequest, build_signed_transaction};
//!
//! let keys = restore_wallet("abandon abandon ... about")?;
//! let request = TxRequest::new(TxKind::transfer(receiver, 150_000_000), 1);
//! let signed = build_signed_transaction(&keys, &request)?;
//! println!("{}", signed.hash);
//! ```

pub mod amm;
pub mod error;
pub mod ffi;
pub mod fees;
pub mod rpc;
pub mod tx;
pub mod types;
pub mod utils;
pub mod wallet;

// Re-export key types for convenience
pub use error::{ErrorCode, VoltError, VoltResult};
pub use types::*;

pub use amm::{find_pool, quote_output, quote_swap, SwapDirection, SwapQuote};
pub use rpc::{NodeApi, NodeClient, RpcRequest, RpcResponse};
pub use tx::{
    build_signed_transaction, build_transaction, compute_tx_hash, sign_transaction, verify_signature,
    verify_transaction, SignedTransaction, Transaction, TxKind, TxRequest, TxType,
};
pub use utils::network_config::NodeConfig;
pub use wallet::{
    create_wallet, format_amount, is_valid_mnemonic, parse_amount, restore_wallet, validate_address,
    SessionConfig, WalletSession,
};

pub use ffi::{
    volt_compute_tx_hash, volt_create_wallet, volt_free_string, volt_quote_output, volt_restore_wallet,
    volt_sign_transaction, volt_validate_mnemonic,
};
