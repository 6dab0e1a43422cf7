//! Hashing, signing, and verification.
//!
//! ## Modules
//!
//! - `hash`: content-address hashing (SHA-512/256, null short-circuit)
//! - `signer`: the [`Signer`] capability and its in-memory and
//!   external-tool realizations
//! - `verify`: detached-signature and content-address checks

pub mod hash;
pub mod signer;
pub mod verify;

pub use hash::hash_bytes;
pub use signer::{ExecSigner, MemorySigner, Signer, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
pub use verify::{validate_id, validate_signature};
