//! Structured Logging with Sensitive Data Redaction
//!
//! Every field is filtered by key name before it reaches stderr:
//! - private keys, mnemonics, seeds and passwords are fully redacted
//! - account addresses are shortened to a prefix and suffix
//! - hashes and signatures are shortened
//!
//! Routing tags (`DEX_BUY`, `AMM_SYSTEM`, ...) travel in address-like fields
//! but are not hex, so they are shown verbatim.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable_debug() {
    DEBUG_ENABLED.store(true, Ordering::SeqCst);
}

pub fn disable_debug() {
    DEBUG_ENABLED.store(false, Ordering::SeqCst);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

const SECRET_KEYS: &[&str] = &[
    "private_key",
    "privatekey",
    "priv_key",
    "secret",
    "seed",
    "mnemonic",
    "phrase",
    "password",
    "passphrase",
];

const ACCOUNT_KEYS: &[&str] = &["address", "sender", "receiver", "owner", "creator", "account"];

const DIGEST_KEYS: &[&str] = &["hash", "signature", "sig"];

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field, redacted according to its key
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let redacted = redact_if_sensitive(key, &value.to_string());
        self.fields.push((key, redacted));
        self
    }

    /// Add a field that is always fully redacted
    pub fn redacted_field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let redacted = redact_value(&value.to_string());
        self.fields.push((key, redacted));
        self
    }

    /// Single-line rendering without the timestamp
    pub fn render(&self) -> String {
        let mut line = format!("{} [{}] {}", self.level, self.module, self.message);
        if !self.fields.is_empty() {
            let fields = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(" ");
            line.push_str(" | ");
            line.push_str(&fields);
        }
        line
    }

    pub fn log(self) {
        if self.level == LogLevel::Debug && !is_debug_enabled() {
            return;
        }
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        eprintln!("[{}] {}", timestamp, self.render());
    }
}

fn redact_if_sensitive(key: &str, value: &str) -> String {
    let key_lower = key.to_lowercase();

    if SECRET_KEYS.iter().any(|k| key_lower.contains(k)) {
        return redact_value(value);
    }
    if ACCOUNT_KEYS.iter().any(|k| key_lower.contains(k)) {
        return redact_address(value);
    }
    if DIGEST_KEYS.iter().any(|k| key_lower.contains(k)) {
        return redact_digest(value);
    }
    value.to_string()
}

/// Fully redact a sensitive value, keeping only its length
pub fn redact_value(value: &str) -> String {
    match value.len() {
        0 => "[EMPTY]".to_string(),
        1..=4 => "[REDACTED]".to_string(),
        len => format!("[REDACTED:{}chars]", len),
    }
}

/// Shorten a hex account address to `02abcd...wxyz`
pub fn redact_address(address: &str) -> String {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }
    if !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        return trimmed.to_string();
    }
    if trimmed.len() <= 16 {
        return redact_value(trimmed);
    }
    format!("{}...{}", &trimmed[..6], &trimmed[trimmed.len() - 4..])
}

/// Shorten a hash or DER signature to its first 10 and last 6 characters
pub fn redact_digest(digest: &str) -> String {
    let trimmed = digest.trim();
    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }
    if trimmed.len() <= 20 || !trimmed.is_ascii() {
        return trimmed.to_string();
    }
    format!("{}...{}", &trimmed[..10], &trimmed[trimmed.len() - 6..])
}

#[macro_export]
macro_rules! log_debug {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::LogLevel::Debug, $module, $msg).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::LogLevel::Debug, $module, $msg)
            $(.field(stringify!($key), &$value))*
            .log()
    };
}

#[macro_export]
macro_rules! log_info {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::LogLevel::Info, $module, $msg).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::LogLevel::Info, $module, $msg)
            $(.field(stringify!($key), &$value))*
            .log()
    };
}

#[macro_export]
macro_rules! log_warn {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::LogLevel::Warn, $module, $msg).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::LogLevel::Warn, $module, $msg)
            $(.field(stringify!($key), &$value))*
            .log()
    };
}

#[macro_export]
macro_rules! log_error {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::LogLevel::Error, $module, $msg).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::LogLevel::Error, $module, $msg)
            $(.field(stringify!($key), &$value))*
            .log()
    };
}
