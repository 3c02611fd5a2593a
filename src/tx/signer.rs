//! Transaction Signer
//!
//! The node verifies signatures against the *text* of the canonical hash:
//! the ECDSA message is `SHA-256(hash_hex.as_bytes())`, where `hash_hex` is
//! the lowercase hex returned by [`compute_tx_hash`]. Signatures are
//! RFC 6979 deterministic, low-S, DER encoded, rendered as hex.

use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1};
use sha2::{Digest, Sha256};

use super::{compute_tx_hash, Transaction};
use crate::error::{ErrorCode, VoltError, VoltResult};
use crate::wallet::parse_private_key;

/// 32-byte ECDSA message for a canonical hash string
pub fn signing_message(hash_hex: &str) -> Message {
    Message::from_digest(Sha256::digest(hash_hex.as_bytes()).into())
}

/// Sign `tx` with a hex private key and return the DER signature as hex
///
/// The record is not modified; see [`sign_in_place`] to attach the result.
pub fn sign_transaction(tx: &Transaction, private_key_hex: &str) -> VoltResult<String> {
    let secret = parse_private_key(private_key_hex)?;
    let secp = Secp256k1::signing_only();
    let msg = signing_message(&compute_tx_hash(tx));
    let sig = secp.sign_ecdsa(&msg, &secret);
    Ok(hex::encode(sig.serialize_der()))
}

/// Sign and attach the signature, refusing keys that do not own `sender`
pub fn sign_in_place(tx: &mut Transaction, private_key_hex: &str) -> VoltResult<()> {
    let secret = parse_private_key(private_key_hex)?;
    let secp = Secp256k1::new();
    let address = hex::encode(PublicKey::from_secret_key(&secp, &secret).serialize());
    if !address.eq_ignore_ascii_case(&tx.sender) {
        return Err(VoltError::signing_failed("Private key does not match transaction sender"));
    }
    tx.signature = sign_transaction(tx, private_key_hex)?;
    Ok(())
}

/// Check a DER hex signature against a compressed public key and hash text
///
/// Malformed keys or signatures are errors; a well-formed signature that
/// does not match returns `Ok(false)`.
pub fn verify_signature(public_key_hex: &str, hash_hex: &str, signature_hex: &str) -> VoltResult<bool> {
    let pk_bytes = hex::decode(public_key_hex)
        .map_err(|e| VoltError::new(ErrorCode::InvalidAddress, format!("Sender is not hex: {}", e)))?;
    let public_key = PublicKey::from_slice(&pk_bytes)
        .map_err(|e| VoltError::new(ErrorCode::InvalidAddress, format!("Sender is not a public key: {}", e)))?;

    let sig_bytes = hex::decode(signature_hex)?;
    let mut sig = Signature::from_der(&sig_bytes)
        .map_err(|e| VoltError::new(ErrorCode::VerificationFailed, format!("Malformed DER signature: {}", e)))?;
    sig.normalize_s();

    let secp = Secp256k1::verification_only();
    Ok(secp.verify_ecdsa(&signing_message(hash_hex), &sig, &public_key).is_ok())
}

/// Verify the attached signature of a signed record against its sender
pub fn verify_transaction(tx: &Transaction) -> VoltResult<bool> {
    if !tx.is_signed() {
        return Err(VoltError::new(ErrorCode::VerificationFailed, "Transaction is not signed"));
    }
    verify_signature(&tx.sender, &compute_tx_hash(tx), &tx.signature)
}
