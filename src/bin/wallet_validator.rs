use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use volt_wallet_core::tx::sign_in_place;
use volt_wallet_core::{restore_wallet, validate_address, verify_transaction, Transaction, WalletKeys};

struct ValidationResult {
    name: &'static str,
    success: bool,
    message: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let payload = if let Some(path) = args.get(1) {
        fs::read_to_string(path)?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let keys: WalletKeys = serde_json::from_str(&payload)?;

    let results = vec![
        run_validation("Address", || validate_address_format(&keys)),
        run_validation("Key pair", || validate_key_pair(&keys)),
        run_validation("Mnemonic", || validate_mnemonic(&keys)),
        run_validation("Signing", || validate_signing(&keys)),
    ];

    println!("================ Wallet Validation ================");
    for result in &results {
        let status = if result.success { "✅ PASS" } else { "❌ FAIL" };
        println!("{:<10} {}", result.name, status);
        if !result.success {
            println!("    {}", result.message);
        }
    }

    let overall_success = results.iter().all(|r| r.success);
    println!("===================================================");
    if overall_success {
        println!("Overall status: ✅ Wallet verified");
        Ok(())
    } else {
        println!("Overall status: ❌ Validation failed");
        Err("wallet validation failed".into())
    }
}

fn run_validation<F>(name: &'static str, f: F) -> ValidationResult
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(_) => ValidationResult {
            name,
            success: true,
            message: String::new(),
        },
        Err(err) => ValidationResult {
            name,
            success: false,
            message: err,
        },
    }
}

fn validate_address_format(keys: &WalletKeys) -> Result<(), String> {
    let normalized = validate_address(&keys.address).map_err(|e| e.to_string())?;
    if normalized != keys.address {
        return Err("address is not lowercase hex".to_string());
    }
    Ok(())
}

fn validate_key_pair(keys: &WalletKeys) -> Result<(), String> {
    let secret_bytes = hex::decode(&keys.private_key).map_err(|e| e.to_string())?;
    let secret = SecretKey::from_slice(&secret_bytes).map_err(|e| e.to_string())?;
    let public = PublicKey::from_secret_key(&Secp256k1::new(), &secret);
    if hex::encode(public.serialize()) != keys.address {
        return Err("private key does not produce the stored address".to_string());
    }
    Ok(())
}

/// The private key must be SHA-256 of the mnemonic's BIP-39 seed
fn validate_mnemonic(keys: &WalletKeys) -> Result<(), String> {
    if keys.mnemonic.is_empty() {
        return Err("no mnemonic exported".to_string());
    }
    let mnemonic = bip39::Mnemonic::parse(&keys.mnemonic).map_err(|e| e.to_string())?;
    let expected = hex::encode(Sha256::digest(mnemonic.to_seed("")));
    if expected != keys.private_key {
        return Err("mnemonic derives a different private key".to_string());
    }

    let restored = restore_wallet(&keys.mnemonic).map_err(|e| e.to_string())?;
    if restored.address != keys.address {
        return Err("mnemonic derives a different address".to_string());
    }
    Ok(())
}

fn validate_signing(keys: &WalletKeys) -> Result<(), String> {
    let mut sample = Transaction::new(keys.address.as_str(), keys.address.as_str(), 1, 0);
    sign_in_place(&mut sample, &keys.private_key).map_err(|e| e.to_string())?;
    match verify_transaction(&sample) {
        Ok(true) => Ok(()),
        Ok(false) => Err("signature does not verify against the address".to_string()),
        Err(e) => Err(e.to_string()),
    }
}
