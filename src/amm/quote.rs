//! Constant-Product Quote Engine
//!
//! Mirrors the node's settlement math exactly, including truncation.
//! Products are taken in `u128`; the one product that can exceed 128 bits
//! (`amount_in * 997 * reserve_out` near the top of the `u64` range) falls
//! back to arbitrary precision. Outputs never exceed `reserve_out`.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::{VoltError, VoltResult};
use crate::tx::routing;
use crate::types::Pool;

/// Fee numerator over [`FEE_DENOMINATOR`] kept by the pool (0.3%)
pub const FEE_NUMERATOR: u128 = 997;
pub const FEE_DENOMINATOR: u128 = 1000;

/// Basis points in 100%
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Default slippage tolerance applied by the web client (5%)
pub const DEFAULT_SLIPPAGE_BPS: u64 = 500;

/// Which reserve receives the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapDirection {
    #[serde(rename = "a_to_b")]
    AToB,
    #[serde(rename = "b_to_a")]
    BToA,
}

impl SwapDirection {
    pub fn routing_tag(&self) -> &'static str {
        match self {
            SwapDirection::AToB => routing::SWAP_A_TO_B,
            SwapDirection::BToA => routing::SWAP_B_TO_A,
        }
    }

    pub fn from_routing_tag(tag: &str) -> Option<Self> {
        match tag {
            routing::SWAP_A_TO_B => Some(SwapDirection::AToB),
            routing::SWAP_B_TO_A => Some(SwapDirection::BToA),
            _ => None,
        }
    }
}

/// Expected output for `amount_in` against the given reserves
///
/// Returns 0 when either reserve is empty: the pool is not bootstrapped and
/// there is nothing to quote.
pub fn quote_output(reserve_in: u64, reserve_out: u64, amount_in: u64) -> u64 {
    if reserve_in == 0 || reserve_out == 0 {
        return 0;
    }
    let amount_in_with_fee = amount_in as u128 * FEE_NUMERATOR;
    let denominator = reserve_in as u128 * FEE_DENOMINATOR + amount_in_with_fee;
    match amount_in_with_fee.checked_mul(reserve_out as u128) {
        Some(numerator) => narrow(numerator / denominator),
        None => wide_mul_div(amount_in_with_fee, reserve_out, denominator),
    }
}

fn wide_mul_div(a: u128, b: u64, denominator: u128) -> u64 {
    let quotient = BigUint::from(a) * BigUint::from(b) / BigUint::from(denominator);
    match quotient.to_u64_digits().as_slice() {
        [] => 0,
        [low] => *low,
        _ => u64::MAX,
    }
}

/// A priced swap ready to become a `Swap` transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuote {
    pub pool_id: String,
    pub direction: SwapDirection,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: u64,
    pub expected_output: u64,
    /// Slippage floor carried in the transaction's `price` field
    pub min_output: u64,
    /// Price impact in basis points versus the pre-trade spot price
    pub price_impact_bps: u64,
}

/// Quote a swap of `token_in` through `pool`
pub fn quote_swap(pool: &Pool, token_in: &str, amount_in: u64, slippage_bps: u64) -> VoltResult<SwapQuote> {
    if slippage_bps > BPS_DENOMINATOR {
        return Err(VoltError::invalid_input(format!(
            "Slippage must be at most {} bps, got {}",
            BPS_DENOMINATOR, slippage_bps
        )));
    }

    let (direction, reserve_in, reserve_out, token_out) = if token_in == pool.token_a {
        (SwapDirection::AToB, pool.reserve_a, pool.reserve_b, &pool.token_b)
    } else if token_in == pool.token_b {
        (SwapDirection::BToA, pool.reserve_b, pool.reserve_a, &pool.token_a)
    } else {
        return Err(VoltError::invalid_input(format!(
            "Token {} is not part of pool {}",
            token_in,
            pool.id()
        )));
    };

    let expected_output = quote_output(reserve_in, reserve_out, amount_in);
    let min_output = apply_slippage(expected_output, slippage_bps);

    Ok(SwapQuote {
        pool_id: pool.id(),
        direction,
        token_in: token_in.to_string(),
        token_out: token_out.clone(),
        amount_in,
        expected_output,
        min_output,
        price_impact_bps: price_impact_bps(reserve_in, reserve_out, amount_in, expected_output),
    })
}

/// `amount * (10000 - bps) / 10000`, floored
pub fn apply_slippage(amount: u64, slippage_bps: u64) -> u64 {
    let keep = BPS_DENOMINATOR.saturating_sub(slippage_bps) as u128;
    narrow(amount as u128 * keep / BPS_DENOMINATOR as u128)
}

// Shortfall of the actual output against spot-price output, fee included
fn price_impact_bps(reserve_in: u64, reserve_out: u64, amount_in: u64, output: u64) -> u64 {
    if reserve_in == 0 || amount_in == 0 {
        return 0;
    }
    let spot_output = amount_in as u128 * reserve_out as u128 / reserve_in as u128;
    if spot_output == 0 {
        return 0;
    }
    let shortfall = spot_output.saturating_sub(output as u128);
    match shortfall.checked_mul(BPS_DENOMINATOR as u128) {
        Some(scaled) => narrow(scaled / spot_output),
        None => wide_mul_div(shortfall, BPS_DENOMINATOR, spot_output),
    }
}

/// LP shares minted for a deposit of `amount_a` / `amount_b`
///
/// The first deposit mints `floor(sqrt(a * b))`, taken through `f64` the way
/// the node computes it; later deposits mint the smaller proportional share.
pub fn estimate_liquidity_shares(pool: Option<&Pool>, amount_a: u64, amount_b: u64) -> u64 {
    match pool {
        Some(p) if p.total_shares > 0 && p.reserve_a > 0 && p.reserve_b > 0 => {
            let total = p.total_shares as u128;
            let share_a = amount_a as u128 * total / p.reserve_a as u128;
            let share_b = amount_b as u128 * total / p.reserve_b as u128;
            narrow(share_a.min(share_b))
        }
        _ => ((amount_a as f64) * (amount_b as f64)).sqrt().floor() as u64,
    }
}

/// Token amounts returned for burning `shares` LP shares
pub fn estimate_removal(pool: &Pool, shares: u64) -> (u64, u64) {
    if pool.total_shares == 0 {
        return (0, 0);
    }
    let shares = shares.min(pool.total_shares) as u128;
    let total = pool.total_shares as u128;
    (
        narrow(shares * pool.reserve_a as u128 / total),
        narrow(shares * pool.reserve_b as u128 / total),
    )
}

fn narrow(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
