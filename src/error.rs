//! Unified error types for the Volt wallet core
//!
//! All errors flow through this module for consistent handling
//! and FFI-safe error reporting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main error type for all Volt operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoltError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl VoltError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_mnemonic(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMnemonic, msg)
    }

    pub fn invalid_private_key(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidPrivateKey, msg)
    }

    pub fn invalid_transaction(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidTransaction, msg)
    }

    pub fn derivation_failure(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DerivationFailure, msg)
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, msg)
    }

    pub fn node_rejected(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NodeRejected, msg)
    }

    pub fn stale_nonce(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::StaleNonce, msg)
    }

    pub fn session_expired(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SessionExpired, msg)
    }

    pub fn session_locked(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SessionLocked, msg)
    }

    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, msg)
    }

    pub fn crypto_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::CryptoError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// True when the caller may fetch a fresh nonce and try again
    pub fn is_retryable(&self) -> bool {
        matches!(self.code, ErrorCode::StaleNonce | ErrorCode::Timeout | ErrorCode::NetworkError)
    }
}

impl fmt::Display for VoltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for VoltError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    InvalidInput,
    InvalidAddress,
    InvalidMnemonic,
    InvalidPrivateKey,
    InvalidTransaction,
    InvalidAmount,

    // Crypto errors
    DerivationFailure,
    CryptoError,
    SigningFailed,
    VerificationFailed,

    // Session errors
    SessionExpired,
    SessionLocked,
    StaleNonce,

    // Network errors
    NetworkError,
    Timeout,
    NodeRejected,

    // Parse errors
    ParseError,
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for Volt operations
pub type VoltResult<T> = Result<T, VoltError>;

// Conversions from common error types

impl From<serde_json::Error> for VoltError {
    fn from(e: serde_json::Error) -> Self {
        VoltError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for VoltError {
    fn from(e: hex::FromHexError) -> Self {
        VoltError::new(ErrorCode::HexError, e.to_string())
    }
}

impl From<std::io::Error> for VoltError {
    fn from(e: std::io::Error) -> Self {
        VoltError::new(ErrorCode::Internal, e.to_string())
    }
}

impl From<reqwest::Error> for VoltError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            VoltError::new(ErrorCode::Timeout, "Request timed out")
        } else if e.is_connect() {
            VoltError::new(ErrorCode::NetworkError, "Connection failed")
        } else {
            VoltError::new(ErrorCode::NetworkError, e.to_string())
        }
    }
}

impl From<secp256k1::Error> for VoltError {
    fn from(e: secp256k1::Error) -> Self {
        VoltError::new(ErrorCode::DerivationFailure, format!("Secp256k1 error: {}", e))
    }
}

impl From<bip39::Error> for VoltError {
    fn from(e: bip39::Error) -> Self {
        VoltError::new(ErrorCode::InvalidMnemonic, format!("BIP39 error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = VoltError::invalid_mnemonic("Checksum mismatch")
            .with_details("word 12");

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("invalid_mnemonic"));
        assert!(json.contains("Checksum mismatch"));
    }

    #[test]
    fn test_display_includes_details() {
        let err = VoltError::node_rejected("Invalid Signature").with_details("broadcast_transaction");
        assert_eq!(err.to_string(), "[NodeRejected] Invalid Signature (broadcast_transaction)");
    }

    #[test]
    fn test_bip39_error_maps_to_invalid_mnemonic() {
        let err: VoltError = bip39::Mnemonic::parse("not a real phrase").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InvalidMnemonic);
    }

    #[test]
    fn test_retryable() {
        assert!(VoltError::stale_nonce("nonce 4 already used").is_retryable());
        assert!(!VoltError::invalid_mnemonic("bad").is_retryable());
    }
}
