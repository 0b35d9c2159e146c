//! Cryptographic primitives and operations
//!
//! This module provides functionality for entropy generation, the mnemonic
//! codec, seed derivation and hierarchical key derivation.

pub mod entropy;
pub mod hash;
pub mod mnemonic;
pub mod seed;
pub mod keys;

pub use entropy::*;
pub use mnemonic::*;
pub use seed::*;
pub use keys::*;
