//! Error types for forest operations.

use thiserror::Error;

/// Result type alias for forest operations.
pub type Result<T> = std::result::Result<T, ForestError>;

/// Main error type for forest operations.
#[derive(Error, Debug)]
pub enum ForestError {
    /// Malformed or truncated bytes, unknown type tag, or version too new.
    #[error("decode error: {0}")]
    Decode(String),

    /// Field-level invariant violation (length mismatch, bad depth/parent
    /// relationship, metadata not JSON, oversized content, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Deep validation failed: a referenced node is absent from the store.
    /// Carries the text form of the missing id.
    #[error("missing referenced node: {0}")]
    MissingReferencedNode(String),

    /// A signature failed to parse or verify.
    #[error("signature invalid: {0}")]
    SignatureInvalid(String),

    /// A node with a null author is not an Identity.
    #[error("invalid authority: {0}")]
    InvalidAuthority(String),

    /// A node's author does not match the identity offered for verification.
    #[error("wrong signing identity: expected {expected}, got {actual}")]
    WrongSigningIdentity { expected: String, actual: String },

    /// Backend I/O failure (file permission, disk full, ...).
    #[error("store I/O error: {0}")]
    StoreIo(#[from] std::io::Error),

    /// Builder given a parent of the wrong node kind.
    #[error("invalid parent kind: {0}")]
    InvalidParentKind(String),

    /// A signer failed to produce a signature or public key.
    #[error("signer error: {0}")]
    Signer(String),
}

impl ForestError {
    /// Creates a new decode error.
    pub fn decode<T: ToString>(msg: T) -> Self {
        Self::Decode(msg.to_string())
    }

    /// Creates a new validation error.
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Creates a new signature error.
    pub fn signature<T: ToString>(msg: T) -> Self {
        Self::SignatureInvalid(msg.to_string())
    }

    /// Creates a new authority error.
    pub fn authority<T: ToString>(msg: T) -> Self {
        Self::InvalidAuthority(msg.to_string())
    }

    /// Creates a new invalid-parent-kind error.
    pub fn parent_kind<T: ToString>(msg: T) -> Self {
        Self::InvalidParentKind(msg.to_string())
    }

    /// Creates a new signer error.
    pub fn signer<T: ToString>(msg: T) -> Self {
        Self::Signer(msg.to_string())
    }
}
