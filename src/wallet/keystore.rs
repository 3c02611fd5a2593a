//! Key Persistence
//!
//! The web client keeps the active wallet under two fixed storage keys,
//! `volt_priv_key` and `volt_address`. [`KeyStore`] models that slot so a
//! host can plug in its own storage; [`FileKeyStore`] and
//! [`MemoryKeyStore`] cover the CLI and tests.
//!
//! A file store may be password protected: the key record is then sealed
//! with AES-256-GCM under an Argon2id-derived key.
//!
//! Whatever the backend, loading re-derives the address from the private
//! key (and the key from the mnemonic, when stored) and refuses records
//! that disagree.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{address_from_private_key, restore_wallet};
use crate::error::{ErrorCode, VoltError, VoltResult};
use crate::log_info;
use crate::types::WalletKeys;

pub const PRIV_KEY_SLOT: &str = "volt_priv_key";
pub const ADDRESS_SLOT: &str = "volt_address";
pub const MNEMONIC_SLOT: &str = "volt_mnemonic";

pub const MIN_PASSWORD_LEN: usize = 8;
const ENVELOPE_VERSION: u8 = 1;

/// Storage slot for the active wallet
pub trait KeyStore {
    /// `Ok(None)` when nothing is stored
    fn load(&self) -> VoltResult<Option<WalletKeys>>;
    fn save(&self, keys: &WalletKeys) -> VoltResult<()>;
    fn clear(&self) -> VoltResult<()>;
}

/// The stored record, field names as the web client persists them
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct StoredKeys {
    volt_priv_key: String,
    volt_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    volt_mnemonic: String,
}

impl From<&WalletKeys> for StoredKeys {
    fn from(keys: &WalletKeys) -> Self {
        Self {
            volt_priv_key: keys.private_key.clone(),
            volt_address: keys.address.clone(),
            volt_mnemonic: keys.mnemonic.clone(),
        }
    }
}

impl StoredKeys {
    /// Re-derive and cross-check before handing keys out
    fn into_checked(self) -> VoltResult<WalletKeys> {
        let derived = address_from_private_key(&self.volt_priv_key)?;
        if !derived.eq_ignore_ascii_case(&self.volt_address) {
            return Err(VoltError::new(
                ErrorCode::InvalidPrivateKey,
                "Stored address does not belong to the stored private key",
            ));
        }
        if !self.volt_mnemonic.is_empty() {
            let restored = restore_wallet(&self.volt_mnemonic)?;
            if restored.private_key != self.volt_priv_key.to_lowercase() {
                return Err(VoltError::new(
                    ErrorCode::InvalidMnemonic,
                    "Stored mnemonic does not derive the stored private key",
                ));
            }
        }
        Ok(WalletKeys {
            address: derived,
            private_key: self.volt_priv_key.to_lowercase(),
            mnemonic: self.volt_mnemonic.clone(),
        })
    }
}

// =============================================================================
// Encryption
// =============================================================================

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // 64 MiB, 3 passes, 4 lanes
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Password-sealed key record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedKeys {
    pub version: u8,
    /// Stored in the clear so the slot can be listed without the password
    pub address: String,
    pub salt: String,
    pub nonce: String,
    pub ciphertext: String,
    pub kdf_params: KdfParams,
}

/// Seal `keys` under `password` with the default KDF cost
pub fn encrypt_keys(keys: &WalletKeys, password: &str) -> VoltResult<EncryptedKeys> {
    encrypt_keys_with_params(keys, password, KdfParams::default())
}

pub fn encrypt_keys_with_params(keys: &WalletKeys, password: &str, kdf_params: KdfParams) -> VoltResult<EncryptedKeys> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(VoltError::invalid_input(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let mut salt = [0u8; 32];
    OsRng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(password, &salt, &kdf_params)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| VoltError::crypto_error(format!("Failed to create cipher: {}", e)))?;

    let plaintext = Zeroizing::new(serde_json::to_vec(&StoredKeys::from(keys))?);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
        .map_err(|e| VoltError::crypto_error(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedKeys {
        version: ENVELOPE_VERSION,
        address: keys.address.clone(),
        salt: b64().encode(salt),
        nonce: b64().encode(nonce_bytes),
        ciphertext: b64().encode(ciphertext),
        kdf_params,
    })
}

/// Open a sealed record and verify the keys inside
pub fn decrypt_keys(sealed: &EncryptedKeys, password: &str) -> VoltResult<WalletKeys> {
    if sealed.version != ENVELOPE_VERSION {
        return Err(VoltError::invalid_input(format!(
            "Unsupported keystore version: {}",
            sealed.version
        )));
    }

    let salt = decode_b64(&sealed.salt)?;
    let nonce_bytes = decode_b64(&sealed.nonce)?;
    let ciphertext = decode_b64(&sealed.ciphertext)?;
    if salt.len() != 32 {
        return Err(VoltError::invalid_input("Invalid salt length"));
    }
    if nonce_bytes.len() != 12 {
        return Err(VoltError::invalid_input("Invalid nonce length"));
    }

    let key = derive_key(password, &salt, &sealed.kdf_params)?;
    let cipher = Aes256Gcm::new_from_slice(key.as_ref())
        .map_err(|e| VoltError::crypto_error(format!("Failed to create cipher: {}", e)))?;
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())
            .map_err(|_| VoltError::crypto_error("Decryption failed - incorrect password or corrupted data"))?,
    );

    let stored: StoredKeys = serde_json::from_slice(&plaintext)?;
    let keys = stored.into_checked()?;
    if !keys.address.eq_ignore_ascii_case(&sealed.address) {
        return Err(VoltError::crypto_error("Envelope address does not match sealed keys"));
    }
    Ok(keys)
}

fn derive_key(password: &str, salt: &[u8], params: &KdfParams) -> VoltResult<Zeroizing<[u8; 32]>> {
    use argon2::{Algorithm, Argon2, Params, Version};

    let argon2_params = Params::new(params.memory_cost, params.time_cost, params.parallelism, Some(32))
        .map_err(|e| VoltError::crypto_error(format!("Invalid KDF params: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(password.as_bytes(), salt, key.as_mut())
        .map_err(|e| VoltError::crypto_error(format!("Key derivation failed: {}", e)))?;
    Ok(key)
}

fn b64() -> &'static base64::engine::GeneralPurpose {
    &base64::engine::general_purpose::STANDARD
}

fn decode_b64(s: &str) -> VoltResult<Vec<u8>> {
    b64()
        .decode(s)
        .map_err(|e| VoltError::parse_error(format!("Invalid base64: {}", e)))
}

// =============================================================================
// Backends
// =============================================================================

/// In-process slot
#[derive(Default)]
pub struct MemoryKeyStore {
    slot: Mutex<Option<StoredKeys>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn load(&self) -> VoltResult<Option<WalletKeys>> {
        let slot = self.slot.lock().map_err(|_| VoltError::internal("Keystore lock poisoned"))?;
        slot.clone().map(StoredKeys::into_checked).transpose()
    }

    fn save(&self, keys: &WalletKeys) -> VoltResult<()> {
        let mut slot = self.slot.lock().map_err(|_| VoltError::internal("Keystore lock poisoned"))?;
        *slot = Some(StoredKeys::from(keys));
        Ok(())
    }

    fn clear(&self) -> VoltResult<()> {
        let mut slot = self.slot.lock().map_err(|_| VoltError::internal("Keystore lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}

/// JSON file slot, optionally password sealed
pub struct FileKeyStore {
    path: PathBuf,
    password: Option<Zeroizing<String>>,
    kdf_params: KdfParams,
}

impl FileKeyStore {
    /// Plain record, the same shape the web client keeps in local storage
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            password: None,
            kdf_params: KdfParams::default(),
        }
    }

    /// Records are sealed with `password` on save and opened with it on load
    pub fn encrypted(path: impl Into<PathBuf>, password: &str) -> Self {
        Self {
            path: path.into(),
            password: Some(Zeroizing::new(password.to_string())),
            kdf_params: KdfParams::default(),
        }
    }

    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        self.kdf_params = params;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_private(&self, contents: &[u8]) -> VoltResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self) -> VoltResult<Option<WalletKeys>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = Zeroizing::new(fs::read_to_string(&self.path)?);

        if let Ok(sealed) = serde_json::from_str::<EncryptedKeys>(&contents) {
            let password = self
                .password
                .as_ref()
                .ok_or_else(|| VoltError::session_locked("Keystore is encrypted; a password is required"))?;
            return decrypt_keys(&sealed, password).map(Some);
        }

        let stored: StoredKeys = serde_json::from_str(&contents)?;
        stored.into_checked().map(Some)
    }

    fn save(&self, keys: &WalletKeys) -> VoltResult<()> {
        let contents = Zeroizing::new(match &self.password {
            Some(password) => serde_json::to_vec_pretty(&encrypt_keys_with_params(keys, password, self.kdf_params)?)?,
            None => serde_json::to_vec_pretty(&StoredKeys::from(keys))?,
        });
        self.write_private(&contents)?;
        log_info!(
            "keystore",
            "wallet saved",
            address = keys.address,
            encrypted = self.password.is_some()
        );
        Ok(())
    }

    fn clear(&self) -> VoltResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABANDON: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    // Cheap parameters so tests stay fast
    const FAST_KDF: KdfParams = KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    };

    fn keys() -> WalletKeys {
        restore_wallet(ABANDON).unwrap()
    }

    fn temp_path(name: &str) -> PathBuf {
        let mut suffix = [0u8; 8];
        OsRng.fill_bytes(&mut suffix);
        std::env::temp_dir().join(format!("volt-{}-{}.json", name, hex::encode(suffix)))
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryKeyStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&keys()).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), keys());
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_plain_file_uses_web_slot_names() {
        let path = temp_path("plain");
        let store = FileKeyStore::new(&path);
        store.save(&keys()).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[PRIV_KEY_SLOT], keys().private_key);
        assert_eq!(raw[ADDRESS_SLOT], keys().address);

        assert_eq!(store.load().unwrap().unwrap(), keys());
        store.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_mismatched_record_rejected() {
        let path = temp_path("mismatch");
        let record = serde_json::json!({
            "volt_priv_key": keys().private_key,
            "volt_address": format!("02{}", "ab".repeat(32)),
        });
        fs::write(&path, record.to_string()).unwrap();
        let err = FileKeyStore::new(&path).load().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPrivateKey);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_record_without_mnemonic_loads() {
        let path = temp_path("nomnemonic");
        let record = serde_json::json!({ "volt_priv_key": keys().private_key, "volt_address": keys().address });
        fs::write(&path, record.to_string()).unwrap();
        let loaded = FileKeyStore::new(&path).load().unwrap().unwrap();
        assert_eq!(loaded.address, keys().address);
        assert!(loaded.mnemonic.is_empty());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_encrypted_roundtrip() {
        let sealed = encrypt_keys_with_params(&keys(), "correct horse", FAST_KDF).unwrap();
        assert_eq!(sealed.address, keys().address);
        assert!(!sealed.ciphertext.contains("abandon"));
        assert_eq!(decrypt_keys(&sealed, "correct horse").unwrap(), keys());
        assert_eq!(decrypt_keys(&sealed, "wrong horse!").unwrap_err().code, ErrorCode::CryptoError);
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(encrypt_keys_with_params(&keys(), "short", FAST_KDF).is_err());
    }

    #[test]
    fn test_encrypted_file_needs_password() {
        let path = temp_path("sealed");
        FileKeyStore::encrypted(&path, "correct horse")
            .with_kdf_params(FAST_KDF)
            .save(&keys())
            .unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(!contents.contains(&keys().private_key));

        let err = FileKeyStore::new(&path).load().unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionLocked);

        let loaded = FileKeyStore::encrypted(&path, "correct horse").load().unwrap().unwrap();
        assert_eq!(loaded, keys());
        fs::remove_file(&path).unwrap();
    }
}
