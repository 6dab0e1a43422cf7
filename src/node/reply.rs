//! Reply nodes: the messages of the forest.
//!
//! A reply at depth 1 hangs directly off a community and carries a null
//! conversation id. Deeper replies reference the depth-1 ancestor (the
//! thread root) as their conversation id, so any reply can be grouped into
//! its conversation without walking the whole ancestry.

use crate::crypto::hash::hash_bytes;
use crate::error::{ForestError, Result};
use crate::fields::{QualifiedContent, QualifiedHash, QualifiedSignature};
use crate::node::common::CommonNode;
use crate::node::constants::MAX_CONTENT_SIZE;
use crate::node::{Node, NodeType};
use crate::store::Store;

/// A reply node within a community's tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The shared envelope.
    pub common: CommonNode,
    /// Id of the community this reply belongs to.
    pub community_id: QualifiedHash,
    /// Id of the depth-1 ancestor (thread root); null on depth-1 replies.
    pub conversation_id: QualifiedHash,
    /// Message content.
    pub content: QualifiedContent,
}

impl Reply {
    /// Returns this node's content address.
    pub fn id(&self) -> QualifiedHash {
        self.common.id()
    }

    /// Returns the creation timestamp in milliseconds.
    pub fn created(&self) -> crate::fields::Timestamp {
        self.common.created
    }

    /// Serializes the signable subset: envelope prefix plus variant fields,
    /// without the signature.
    pub fn marshal_signed_data(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.common.marshal_signed_prefix(&mut out);
        self.community_id.encode_into(&mut out);
        self.conversation_id.encode_into(&mut out);
        self.content.encode_into(&mut out);
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
        let (mut common, mut at) = CommonNode::parse_prefix(buf, NodeType::Reply)?;
        let (community_id, n) = QualifiedHash::decode(&buf[at..])?;
        at += n;
        let (conversation_id, n) = QualifiedHash::decode(&buf[at..])?;
        at += n;
        let (content, n) = QualifiedContent::decode(&buf[at..])?;
        at += n;
        let (signature, n) = QualifiedSignature::decode(&buf[at..])?;
        at += n;

        common.signature = signature;
        common.id = hash_bytes(common.id_desc.tag, &buf[..at]);

        Ok((
            Self {
                common,
                community_id,
                conversation_id,
                content,
            },
            at,
        ))
    }

    /// Parses a complete reply node, rejecting trailing bytes.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let (node, used) = Self::parse(buf)?;
        if used != buf.len() {
            return Err(ForestError::decode(format!(
                "{} trailing bytes after reply node",
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

        if self.common.depth.0 < 1 {
            return Err(ForestError::validation("reply depth must be at least 1"));
        }
        if self.common.parent.is_null() {
            return Err(ForestError::validation(
                "reply parent must not be the null hash",
            ));
        }
        if self.common.author.is_null() {
            return Err(ForestError::validation(
                "reply author must not be the null hash",
            ));
        }

        self.community_id.validate_digest()?;
        if self.community_id.is_null() {
            return Err(ForestError::validation(
                "reply community id must not be the null hash",
            ));
        }

        self.conversation_id.validate_digest()?;
        if self.common.depth.0 == 1 {
            if !self.conversation_id.is_null() {
                return Err(ForestError::validation(
                    "depth-1 reply conversation id must be the null hash",
                ));
            }
        } else if self.conversation_id.is_null() {
            return Err(ForestError::validation(
                "reply deeper than 1 must reference its conversation root",
            ));
        }

        self.content.validate()?;
        if self.content.blob.len() > MAX_CONTENT_SIZE {
            return Err(ForestError::validation(format!(
                "reply content exceeds {} bytes",
                MAX_CONTENT_SIZE
            )));
        }

        Ok(())
    }

    /// Checks that parent, author, community, and conversation all resolve
    /// to present nodes of the right kind in `store`.
    pub fn validate_deep(&self, store: &dyn Store) -> Result<()> {
        match store.get(&self.common.parent)? {
            None => {
                return Err(ForestError::MissingReferencedNode(
                    self.common.parent.to_text(),
                ))
            }
            Some(Node::Identity(_)) => {
                return Err(ForestError::validation(
                    "reply parent resolves to an identity node",
                ))
            }
            Some(_) => {}
        }

        match store.get(&self.common.author)? {
            None => {
                return Err(ForestError::MissingReferencedNode(
                    self.common.author.to_text(),
                ))
            }
            Some(Node::Identity(_)) => {}
            Some(other) => {
                return Err(ForestError::validation(format!(
                    "reply author resolves to a {} node, expected an identity",
                    other.node_type()
                )))
            }
        }

        match store.get(&self.community_id)? {
            None => {
                return Err(ForestError::MissingReferencedNode(
                    self.community_id.to_text(),
                ))
            }
            Some(Node::Community(_)) => {}
            Some(other) => {
                return Err(ForestError::validation(format!(
                    "reply community id resolves to a {} node, expected a community",
                    other.node_type()
                )))
            }
        }

        if !self.conversation_id.is_null() {
            match store.get(&self.conversation_id)? {
                None => {
                    return Err(ForestError::MissingReferencedNode(
                        self.conversation_id.to_text(),
                    ))
                }
                Some(Node::Reply(root)) if root.common.depth.0 == 1 => {}
                Some(Node::Reply(_)) => {
                    return Err(ForestError::validation(
                        "reply conversation id must reference a depth-1 reply",
                    ))
                }
                Some(other) => {
                    return Err(ForestError::validation(format!(
                        "reply conversation id resolves to a {} node, expected a reply",
                        other.node_type()
                    )))
                }
            }
        }

        Ok(())
    }
}
