//! Key Generation
//!
//! Creates wallets from entropy or mnemonic phrases.
//!
//! The node derives accounts with a fixed shortcut rather than a BIP-32
//! path: `private_key = SHA-256(bip39_seed(phrase, ""))` and the address is
//! the compressed secp256k1 public key in hex. Keys derived any other way
//! are unknown to the node.
//!
//! SECURITY: All sensitive data (entropy, seeds, scalars) is zeroized on drop.

use bip39::Mnemonic;
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{VoltError, VoltResult};
use crate::types::WalletKeys;

/// Create a new wallet from 128 bits of OS randomness (12 words)
pub fn create_wallet() -> VoltResult<WalletKeys> {
    let mut entropy = Zeroizing::new([0u8; 16]);
    OsRng.fill_bytes(entropy.as_mut());

    let mnemonic = Mnemonic::from_entropy(entropy.as_ref())
        .map_err(|e| VoltError::crypto_error(format!("Failed to create mnemonic: {}", e)))?;

    let phrase = Zeroizing::new(mnemonic.to_string());
    restore_wallet(&phrase)
}

/// Restore the wallet a mnemonic phrase stands for
///
/// Fails with `InvalidMnemonic` on unknown words or a bad checksum; no
/// partial key material is produced in that case.
pub fn restore_wallet(phrase: &str) -> VoltResult<WalletKeys> {
    let normalized = Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "));
    let mnemonic = Mnemonic::parse(normalized.as_str())
        .map_err(|e| VoltError::invalid_mnemonic(format!("Invalid mnemonic: {}", e)))?;

    let seed = Zeroizing::new(mnemonic.to_seed(""));
    let private_key = derive_private_key(seed.as_ref());
    let secret = SecretKey::from_slice(private_key.as_ref())
        .map_err(|e| VoltError::derivation_failure(format!("Derived scalar rejected: {}", e)))?;

    Ok(WalletKeys {
        address: address_from_secret(&secret),
        private_key: hex::encode(private_key.as_ref()),
        mnemonic: normalized.to_string(),
    })
}

/// SHA-256 over the raw 64-byte BIP-39 seed
pub fn derive_private_key(seed: &[u8]) -> Zeroizing<[u8; 32]> {
    Zeroizing::new(Sha256::digest(seed).into())
}

/// Decode a 32-byte hex private key into a secp256k1 scalar
pub fn parse_private_key(private_key_hex: &str) -> VoltResult<SecretKey> {
    let bytes = Zeroizing::new(
        hex::decode(private_key_hex.trim())
            .map_err(|e| VoltError::invalid_private_key(format!("Private key is not hex: {}", e)))?,
    );
    if bytes.len() != 32 {
        return Err(VoltError::invalid_private_key(format!(
            "Private key must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    SecretKey::from_slice(&bytes).map_err(|e| VoltError::invalid_private_key(e.to_string()))
}

/// Address (compressed public key hex) for a hex private key
pub fn address_from_private_key(private_key_hex: &str) -> VoltResult<String> {
    let secret = parse_private_key(private_key_hex)?;
    Ok(address_from_secret(&secret))
}

fn address_from_secret(secret: &SecretKey) -> String {
    let secp = Secp256k1::new();
    hex::encode(PublicKey::from_secret_key(&secp, secret).serialize())
}
