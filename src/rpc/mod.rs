//! RPC Module
//!
//! JSON command envelope and the client that carries it to a Volt node.

mod client;
mod envelope;

pub use client::*;
pub use envelope::*;
