//! Transaction Module
//!
//! Wire record, typed kinds, canonical hashing, signing and building.

mod builder;
mod hash;
mod kind;
mod signer;
mod wire;

pub use builder::*;
pub use hash::*;
pub use kind::*;
pub use signer::*;
pub use wire::*;
