//! Accounts derived from a mnemonic
//!
//! An account couples a key pair with the address it produces under an
//! [`AddressScheme`] and the path it was derived along.

pub mod address;
mod wallet;

pub use address::*;
pub use wallet::*;
