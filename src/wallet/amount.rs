//! Amount Conversion
//!
//! Converts between display strings ("1.5") and atomic units. Parsing is
//! exact decimal arithmetic; floats never touch user amounts.

use thiserror::Error;

use crate::error::{ErrorCode, VoltError};
use crate::types::ATOMIC_PER_VLT;

/// Fractional digits of the native asset
pub const DECIMALS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount must not be negative")]
    Negative,
    #[error("invalid character in amount: {0:?}")]
    InvalidCharacter(char),
    #[error("more than one decimal point")]
    MultipleDecimalPoints,
    #[error("at most 8 fractional digits are allowed, got {0}")]
    TooPrecise(usize),
    #[error("amount exceeds the atomic range")]
    Overflow,
}

impl From<AmountError> for VoltError {
    fn from(e: AmountError) -> Self {
        VoltError::new(ErrorCode::InvalidAmount, e.to_string())
    }
}

/// Parse a display amount into atomic units
pub fn parse_amount(input: &str) -> Result<u64, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if s.starts_with('-') {
        return Err(AmountError::Negative);
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    let mut parts = s.splitn(3, '.');
    let whole = parts.next().unwrap_or("");
    let frac = parts.next().unwrap_or("");
    if parts.next().is_some() {
        return Err(AmountError::MultipleDecimalPoints);
    }
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Empty);
    }
    if let Some(c) = whole.chars().chain(frac.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(c));
    }
    if frac.len() > DECIMALS {
        return Err(AmountError::TooPrecise(frac.len()));
    }

    let whole_units: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };
    let frac_units: u64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = DECIMALS)
            .parse()
            .map_err(|_| AmountError::Overflow)?
    };

    whole_units
        .checked_mul(ATOMIC_PER_VLT)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or(AmountError::Overflow)
}

/// Render atomic units as a display amount without trailing zeros
pub fn format_amount(atomic: u64) -> String {
    let whole = atomic / ATOMIC_PER_VLT;
    let frac = atomic % ATOMIC_PER_VLT;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", frac, width = DECIMALS);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
