//! AMM Module
//!
//! Local estimators for the node's constant-product pools. The node keys
//! pools by the literal `token_a + "/" + token_b` given when liquidity was
//! first added; there is no separate id in its listing.

mod quote;

pub use quote::*;

use crate::error::{VoltError, VoltResult};
use crate::types::Pool;

/// Pool lookup key exactly as the node builds it
pub fn pool_id(token_a: &str, token_b: &str) -> String {
    format!("{}/{}", token_a, token_b)
}

/// Split a pool id back into its two token symbols
pub fn parse_pool_id(id: &str) -> VoltResult<(String, String)> {
    let parts: Vec<&str> = id.split('/').collect();
    match parts.as_slice() {
        [a, b] if !a.is_empty() && !b.is_empty() => Ok((a.to_string(), b.to_string())),
        _ => Err(VoltError::invalid_transaction(format!("Invalid pool id: {}", id))),
    }
}

/// Find the pool trading `token_x` against `token_y` in either orientation
pub fn find_pool<'a>(pools: &'a [Pool], token_x: &str, token_y: &str) -> Option<&'a Pool> {
    pools.iter().find(|p| {
        (p.token_a == token_x && p.token_b == token_y) || (p.token_a == token_y && p.token_b == token_x)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(a: &str, b: &str) -> Pool {
        Pool {
            token_a: a.to_string(),
            token_b: b.to_string(),
            reserve_a: 10,
            reserve_b: 20,
            total_shares: 14,
        }
    }

    #[test]
    fn test_pool_id_is_literal() {
        assert_eq!(pool_id("VLT", "GOLD"), "VLT/GOLD");
        assert_eq!(pool_id("GOLD", "VLT"), "GOLD/VLT");
    }

    #[test]
    fn test_parse_pool_id() {
        assert_eq!(parse_pool_id("VLT/GOLD").unwrap(), ("VLT".to_string(), "GOLD".to_string()));
        assert!(parse_pool_id("VLT").is_err());
        assert!(parse_pool_id("VLT/").is_err());
        assert!(parse_pool_id("A/B/C").is_err());
    }

    #[test]
    fn test_find_pool_either_orientation() {
        let pools = vec![pool("VLT", "GOLD"), pool("VLT", "SILVER")];
        assert_eq!(find_pool(&pools, "GOLD", "VLT").unwrap().id(), "VLT/GOLD");
        assert_eq!(find_pool(&pools, "VLT", "SILVER").unwrap().id(), "VLT/SILVER");
        assert!(find_pool(&pools, "GOLD", "SILVER").is_none());
    }
}
