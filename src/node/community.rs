//! Community nodes: named roots that replies grow under.

use crate::crypto::hash::hash_bytes;
use crate::error::{ForestError, Result};
use crate::fields::{ContentType, QualifiedContent, QualifiedHash, QualifiedSignature};
use crate::node::common::CommonNode;
use crate::node::constants::MAX_NAME_SIZE;
use crate::node::{Node, NodeType};
use crate::store::Store;

/// A community node. Tree root (`parent` is null, `depth` 0) signed by some
/// Identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    /// The shared envelope.
    pub common: CommonNode,
    /// Display name (UTF-8).
    pub name: QualifiedContent,
}

impl Community {
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
        let (mut common, mut at) = CommonNode::parse_prefix(buf, NodeType::Community)?;
        let (name, n) = QualifiedContent::decode(&buf[at..])?;
        at += n;
        let (signature, n) = QualifiedSignature::decode(&buf[at..])?;
        at += n;

        common.signature = signature;
        common.id = hash_bytes(common.id_desc.tag, &buf[..at]);

        Ok((Self { common, name }, at))
    }

    /// Parses a complete community node, rejecting trailing bytes.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let (node, used) = Self::parse(buf)?;
        if used != buf.len() {
            return Err(ForestError::decode(format!(
                "{} trailing bytes after community node",
                buf.len() - used
            )));
        }
        Ok(node)
    }

    /// Attaches the signature and computes the content address.
    pub(crate) fn finalize(&mut self, signature: QualifiedSignature) {
        self.common.signature = signature;
        let bytes = self.marshal_binary();
        self.common.id = hash_bytes(self.common.id_desc.tag, &bytes);
    }

    /// Checks every invariant contained in the node itself. Pure, no I/O.
    pub fn validate_shallow(&self) -> Result<()> {
        self.common.validate_common()?;

        if !self.common.parent.is_null() {
            return Err(ForestError::validation(
                "community parent must be the null hash",
            ));
        }
        if self.common.depth.0 != 0 {
            return Err(ForestError::validation(format!(
                "community depth must be 0, got {}",
                self.common.depth
            )));
        }
        if self.common.author.is_null() {
            return Err(ForestError::validation(
                "community author must not be the null hash",
            ));
        }

        self.name.validate()?;
        if self.name.descriptor.tag != ContentType::Utf8 {
            return Err(ForestError::validation("community name must be UTF-8"));
        }
        if self.name.blob.len() > MAX_NAME_SIZE {
            return Err(ForestError::validation(format!(
                "community name exceeds {} bytes",
                MAX_NAME_SIZE
            )));
        }

        Ok(())
    }

    /// Checks that the author resolves to a present Identity in `store`.
    pub fn validate_deep(&self, store: &dyn Store) -> Result<()> {
        match store.get(&self.common.author)? {
            None => Err(ForestError::MissingReferencedNode(
                self.common.author.to_text(),
            )),
            Some(Node::Identity(_)) => Ok(()),
            Some(other) => Err(ForestError::validation(format!(
                "community author resolves to a {} node, expected an identity",
                other.node_type()
            ))),
        }
    }
}
