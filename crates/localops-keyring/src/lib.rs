//! Key management for localops
//!
//! This crate turns seeds into key pairs and classic addresses:
//! seed encoding and generation, the per-algorithm derivation rules and
//! the wallet proposal built on top of them.

pub mod derive;
pub mod seed;
pub mod wallet;

pub use derive::{derive_key_pair, MAX_DERIVATION_ATTEMPTS};
pub use seed::Seed;
pub use wallet::{propose, SeedInput, WalletProposal};
