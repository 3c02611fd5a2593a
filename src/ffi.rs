//! FFI Layer for Volt Wallet Core
//!
//! All C-ABI exports are defined here. This is the ONLY file that should
//! contain `extern "C"` functions. All functions follow a consistent pattern:
//! - Input: JSON string (null-terminated C string)
//! - Output: JSON string (must be freed with `volt_free_string`)
//!
//! Error handling: All functions return JSON with `success` field.
//! On error, `success: false` and `error` object is populated.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::amm::quote_output;
use crate::error::VoltError;
use crate::tx::{compute_tx_hash, sign_in_place, SignedTransaction, Transaction};
use crate::types::ApiResponse;
use crate::wallet;

// =============================================================================
// Memory Management
// =============================================================================

/// Free a string returned by any volt_* function
///
/// # Safety
/// The pointer must have been returned by a volt_* function
#[unsafe(no_mangle)]
pub extern "C" fn volt_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Copy a C string into an owned Rust string
fn read_input(input: *const c_char) -> Result<String, VoltError> {
    if input.is_null() {
        return Err(VoltError::invalid_input("Null input pointer"));
    }
    let c_str = unsafe { CStr::from_ptr(input) };
    c_str
        .to_str()
        .map(str::to_owned)
        .map_err(|_| VoltError::invalid_input("Invalid UTF-8 string"))
}

/// Read and decode a JSON request
fn parse_request<T: DeserializeOwned>(input: *const c_char) -> Result<T, VoltError> {
    let json_str = read_input(input)?;
    serde_json::from_str(&json_str).map_err(|e| VoltError::parse_error(format!("Invalid JSON: {}", e)))
}

fn respond<T: Serialize>(result: Result<T, VoltError>) -> *mut c_char {
    match result {
        Ok(data) => string_to_ptr(ApiResponse::ok(data).to_json()),
        Err(e) => string_to_ptr(ApiResponse::<()>::err(e).to_json()),
    }
}

/// Convert Rust string to C string pointer
fn string_to_ptr(s: String) -> *mut c_char {
    CString::new(s)
        .or_else(|_| CString::new(r#"{"success":false,"error":{"code":"internal","message":"String conversion failed"}}"#))
        .unwrap_or_default()
        .into_raw()
}

// =============================================================================
// Wallet Operations
// =============================================================================

/// Generate a new wallet
///
/// # Output
/// ```json
/// {
///   "success": true,
///   "data": { "address": "02...", "privateKey": "...", "mnemonic": "word1 ..." }
/// }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn volt_create_wallet() -> *mut c_char {
    respond(wallet::create_wallet())
}

#[derive(Deserialize)]
struct MnemonicRequest {
    mnemonic: String,
}

/// Restore wallet from mnemonic phrase
///
/// # Input
/// ```json
/// { "mnemonic": "word1 word2 ..." }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn volt_restore_wallet(input: *const c_char) -> *mut c_char {
    respond(parse_request::<MnemonicRequest>(input).and_then(|r| wallet::restore_wallet(&r.mnemonic)))
}

/// Validate a mnemonic phrase
///
/// # Output
/// ```json
/// { "success": true, "data": { "valid": true } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn volt_validate_mnemonic(input: *const c_char) -> *mut c_char {
    #[derive(Serialize)]
    struct ValidateResponse {
        valid: bool,
    }

    respond(parse_request::<MnemonicRequest>(input).map(|r| ValidateResponse {
        valid: wallet::is_valid_mnemonic(&r.mnemonic),
    }))
}

// =============================================================================
// Transaction Operations
// =============================================================================

/// Canonical hash of a wire record
///
/// # Input
/// The transaction record as the node serializes it.
///
/// # Output
/// ```json
/// { "success": true, "data": { "hash": "f572..." } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn volt_compute_tx_hash(input: *const c_char) -> *mut c_char {
    #[derive(Serialize)]
    struct HashResponse {
        hash: String,
    }

    respond(parse_request::<Transaction>(input).map(|tx| HashResponse {
        hash: compute_tx_hash(&tx),
    }))
}

/// Sign a wire record with a hex private key
///
/// # Input
/// ```json
/// { "transaction": { ... }, "private_key": "62a7..." }
/// ```
///
/// # Output
/// `{ "hash", "transaction" }` with `signature` filled in.
#[unsafe(no_mangle)]
pub extern "C" fn volt_sign_transaction(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct SignRequest {
        transaction: Transaction,
        #[serde(alias = "privateKey")]
        private_key: String,
    }

    respond(parse_request::<SignRequest>(input).and_then(|request| {
        let SignRequest { mut transaction, private_key } = request;
        let private_key = Zeroizing::new(private_key);
        sign_in_place(&mut transaction, &private_key)?;
        Ok(SignedTransaction {
            hash: compute_tx_hash(&transaction),
            transaction,
        })
    }))
}

// =============================================================================
// AMM
// =============================================================================

/// Constant-product quote
///
/// # Input
/// ```json
/// { "reserve_in": 1000, "reserve_out": 1000, "amount_in": 100 }
/// ```
///
/// # Output
/// ```json
/// { "success": true, "data": { "amount_out": 90 } }
/// ```
#[unsafe(no_mangle)]
pub extern "C" fn volt_quote_output(input: *const c_char) -> *mut c_char {
    #[derive(Deserialize)]
    struct QuoteRequest {
        reserve_in: u64,
        reserve_out: u64,
        amount_in: u64,
    }

    #[derive(Serialize)]
    struct QuoteResponse {
        amount_out: u64,
    }

    respond(parse_request::<QuoteRequest>(input).map(|q| QuoteResponse {
        amount_out: quote_output(q.reserve_in, q.reserve_out, q.amount_in),
    }))
}
