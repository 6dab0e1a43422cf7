//! Identity nodes: the root trust anchors of the forest.
//!
//! An Identity carries a display name and the public key every node it signs
//! is verified against. Identities are self-signed: author and parent are
//! both the null hash and the depth is zero.

use crate::crypto::hash::hash_bytes;
use crate::crypto::signer::PUBLIC_KEY_LENGTH;
use crate::error::{ForestError, Result};
use crate::fields::{ContentType, QualifiedContent, QualifiedHash, QualifiedKey, QualifiedSignature};
use crate::node::common::CommonNode;
use crate::node::constants::MAX_NAME_SIZE;
use crate::node::NodeType;
use crate::store::Store;

/// A self-signed identity node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The shared envelope.
    pub common: CommonNode,
    /// Display name (UTF-8).
    pub name: QualifiedContent,
    /// The public key nodes authored by this identity are verified against.
    pub public_key: QualifiedKey,
}

impl Identity {
    /// Returns this node's content address.
    pub fn id(&self) -> QualifiedHash {
        self.common.id()
    }

    /// Serializes the signable subset: envelope prefix plus variant fields,
    /// without the signature.
    pub fn marshal_signed_data(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.common.marshal_signed_prefix(&mut out);
        self.name.encode_into(&mut out);
        self.public_key.encode_into(&mut out);
        out
    }

    /// Serializes the full node: signable subset plus signature.
    pub fn marshal_binary(&self) -> Vec<u8> {
        let mut out = self.marshal_signed_data();
        self.common.signature.encode_into(&mut out);
        out
    }

    /// Parses from the front of `buf`, recomputing the id over the consumed
    /// bytes. Returns the node and bytes consumed.
    pub(crate) fn parse(buf: &[u8]) -> Result<(Self, usize)> {
        let (mut common, mut at) = CommonNode::parse_prefix(buf, NodeType::Identity)?;
        let (name, n) = QualifiedContent::decode(&buf[at..])?;
        at += n;
        let (public_key, n) = QualifiedKey::decode(&buf[at..])?;
        at += n;
        let (signature, n) = QualifiedSignature::decode(&buf[at..])?;
        at += n;

        common.signature = signature;
        common.id = hash_bytes(common.id_desc.tag, &buf[..at]);

        Ok((
            Self {
                common,
                name,
                public_key,
            },
            at,
        ))
    }

    /// Parses a complete identity node, rejecting trailing bytes.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let (node, used) = Self::parse(buf)?;
        if used != buf.len() {
            return Err(ForestError::decode(format!(
                "{} trailing bytes after identity node",
                buf.len() - used
            )));
        }
        Ok(node)
    }

    /// Attaches the signature and computes the content address. Build-time
    /// only; a sealed node is never mutated again.
    pub(crate) fn finalize(&mut self, signature: QualifiedSignature) {
        self.common.signature = signature;
        let bytes = self.marshal_binary();
        self.common.id = hash_bytes(self.common.id_desc.tag, &bytes);
    }

    /// Checks every invariant contained in the node itself. Pure, no I/O.
    pub fn validate_shallow(&self) -> Result<()> {
        self.common.validate_common()?;

        if !self.common.author.is_null() {
            return Err(ForestError::validation(
                "identity author must be the null hash (identities are self-signed)",
            ));
        }
        if !self.common.parent.is_null() {
            return Err(ForestError::validation(
                "identity parent must be the null hash",
            ));
        }
        if self.common.depth.0 != 0 {
            return Err(ForestError::validation(format!(
                "identity depth must be 0, got {}",
                self.common.depth
            )));
        }

        self.name.validate()?;
        if self.name.descriptor.tag != ContentType::Utf8 {
            return Err(ForestError::validation("identity name must be UTF-8"));
        }
        if self.name.blob.len() > MAX_NAME_SIZE {
            return Err(ForestError::validation(format!(
                "identity name exceeds {} bytes",
                MAX_NAME_SIZE
            )));
        }

        self.public_key.validate()?;
        if self.public_key.blob.len() != PUBLIC_KEY_LENGTH {
            return Err(ForestError::validation(format!(
                "public key must be {} bytes, got {}",
                PUBLIC_KEY_LENGTH,
                self.public_key.blob.len()
            )));
        }

        Ok(())
    }

    /// Identities reference no other nodes; deep validation is trivially
    /// satisfied.
    pub fn validate_deep(&self, _store: &dyn Store) -> Result<()> {
        Ok(())
    }
}
