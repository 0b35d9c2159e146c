//! Hierarchical key derivation
//!
//! This module provides derivation path parsing, BIP-32 extended keys and the
//! key pairs derived from them.

pub mod extended;
pub mod path;
mod derivation;

pub use derivation::*;
pub use extended::*;
pub use path::*;
