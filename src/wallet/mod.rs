//! Wallet Module
//!
//! Handles wallet creation, restoration, key derivation, address and amount
//! validation, nonce tracking, sessions, and key persistence.

mod amount;
mod keygen;
mod keystore;
mod nonce;
mod session;
mod validation;

pub use amount::*;
pub use keygen::*;
pub use keystore::*;
pub use nonce::*;
pub use session::*;
pub use validation::*;
