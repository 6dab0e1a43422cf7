//! Signature and content-address verification.
//!
//! Verification never panics: every key parse, signature parse, or
//! cryptographic failure is surfaced as a typed error.

use crate::crypto::hash::hash_bytes;
use crate::error::{ForestError, Result};
use crate::node::{Identity, Node};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Checks `node`'s detached signature against the given identity.
///
/// A null author is only legal on an Identity (self-signed); any other kind
/// fails with `InvalidAuthority`. A non-null author must match
/// `identity.id()` or the check fails with `WrongSigningIdentity`. The
/// signature itself is verified over the node's signable bytes using the
/// identity's embedded public key.
pub fn validate_signature(node: &Node, identity: &Identity) -> Result<()> {
    if node.author().is_null() {
        let self_signed = match node {
            Node::Identity(id) => id,
            other => {
                return Err(ForestError::authority(format!(
                    "{} node has a null author; only identities are self-signed",
                    other.node_type()
                )))
            }
        };
        return verify_with_key(self_signed, node);
    }

    if *node.author() != identity.id() {
        return Err(ForestError::WrongSigningIdentity {
            expected: node.author().to_text(),
            actual: identity.id().to_text(),
        });
    }
    verify_with_key(identity, node)
}

/// Recomputes `node`'s content address from its full serialized bytes and
/// compares it to the declared id.
pub fn validate_id(node: &Node) -> Result<()> {
    let computed = hash_bytes(node.common().id_desc.tag, &node.marshal_binary());
    let declared = node.id();
    if computed != declared.blob {
        return Err(ForestError::validation(format!(
            "content address mismatch: declared {}, computed {}",
            declared,
            computed.to_base64()
        )));
    }
    Ok(())
}

fn verify_with_key(identity: &Identity, node: &Node) -> Result<()> {
    let key_bytes: [u8; 32] = identity
        .public_key
        .blob
        .as_slice()
        .try_into()
        .map_err(|_| ForestError::signature("identity public key is not 32 bytes"))?;
    let key = VerifyingKey::from_bytes(&key_bytes)
        .map_err(|e| ForestError::signature(format!("malformed public key: {}", e)))?;

    let signature = Signature::from_slice(node.signature().blob.as_slice())
        .map_err(|e| ForestError::signature(format!("malformed signature: {}", e)))?;

    key.verify(&node.marshal_signed_data(), &signature)
        .map_err(|_| ForestError::signature("signature does not verify"))
}
