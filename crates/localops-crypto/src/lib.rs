//! Cryptographic primitives for localops
//!
//! This crate provides hashing, key pairs and signatures using
//! well-audited implementations from the RustCrypto and dalek projects.

pub mod hash;
pub mod keys;
pub mod signature;

pub use hash::{sha512_half, signing_digest, transaction_id};
pub use keys::{Algorithm, KeyPair, PublicKey};
pub use crate::signature::{sign, verify};
