//! Address and Mnemonic Validation
//!
//! A Volt address is the 33-byte compressed secp256k1 public key in hex.

use bip39::Mnemonic;
use secp256k1::PublicKey;

use crate::error::{ErrorCode, VoltError, VoltResult};

/// Length in hex characters of a compressed public key
pub const ADDRESS_HEX_LEN: usize = 66;

/// Check if a mnemonic phrase is valid (known words, correct checksum)
pub fn is_valid_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse(phrase.split_whitespace().collect::<Vec<_>>().join(" ")).is_ok()
}

/// Validate an account address and return its lowercase form
pub fn validate_address(address: &str) -> VoltResult<String> {
    let trimmed = address.trim();
    if trimmed.len() != ADDRESS_HEX_LEN {
        return Err(invalid_address(format!(
            "Address must be {} hex characters, got {}",
            ADDRESS_HEX_LEN,
            trimmed.len()
        )));
    }

    let normalized = trimmed.to_ascii_lowercase();
    if !normalized.starts_with("02") && !normalized.starts_with("03") {
        return Err(invalid_address("Address must be a compressed public key (02/03 prefix)"));
    }

    let bytes = hex::decode(&normalized).map_err(|e| invalid_address(format!("Address is not hex: {}", e)))?;
    PublicKey::from_slice(&bytes).map_err(|_| invalid_address("Address is not a point on secp256k1"))?;

    Ok(normalized)
}

/// True when [`validate_address`] accepts `address`
pub fn is_valid_address(address: &str) -> bool {
    validate_address(address).is_ok()
}

fn invalid_address(msg: impl Into<String>) -> VoltError {
    VoltError::new(ErrorCode::InvalidAddress, msg)
}
