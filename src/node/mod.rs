//! The node data model: envelope, variants, and two-phase validation.
//!
//! This module provides:
//!
//! - [`CommonNode`]: the envelope every variant is composed around
//! - [`Identity`], [`Community`], [`Reply`]: the three node variants
//! - [`Node`]: the closed enum dispatched over with exhaustive matching
//! - [`version_and_type_of`]: the front-of-buffer peek decoders dispatch on
//!
//! Nodes are immutable once signed. Parsing always recomputes the content
//! address from the bytes actually consumed; an externally supplied id is
//! never trusted.

mod common;
mod community;
pub mod constants;
mod identity;
mod reply;

pub use common::CommonNode;
pub use community::Community;
pub use identity::Identity;
pub use reply::Reply;

use crate::error::{ForestError, Result};
use crate::fields::{
    take, QualifiedContent, QualifiedHash, QualifiedSignature, SchemaVersion, Timestamp, TreeDepth,
};
use crate::store::Store;
use std::fmt;

/// The newest wire format version this implementation understands.
pub const CURRENT_VERSION: SchemaVersion = SchemaVersion(1);

/// Variant discriminator, written to the wire right after the schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeType {
    /// A self-signed trust anchor.
    Identity = 1,
    /// A named tree root replies grow under.
    Community = 2,
    /// A message within a community's tree.
    Reply = 3,
}

impl NodeType {
    /// Returns the wire byte for this type.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Parses a wire byte, rejecting unknown tags.
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            1 => Ok(NodeType::Identity),
            2 => Ok(NodeType::Community),
            3 => Ok(NodeType::Reply),
            other => Err(ForestError::decode(format!("unknown node type {}", other))),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Identity => write!(f, "identity"),
            NodeType::Community => write!(f, "community"),
            NodeType::Reply => write!(f, "reply"),
        }
    }
}

/// Reads the schema version and node type from the front of a serialized
/// node without parsing the rest.
pub fn version_and_type_of(buf: &[u8]) -> Result<(SchemaVersion, NodeType)> {
    let (version, at) = SchemaVersion::decode(buf)?;
    let [type_byte] = take::<1>(&buf[at..], "node type")?;
    Ok((version, NodeType::from_byte(type_byte)?))
}

/// One immutable, signed, content-addressed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// See [`Identity`].
    Identity(Identity),
    /// See [`Community`].
    Community(Community),
    /// See [`Reply`].
    Reply(Reply),
}

impl Node {
    /// Parses a complete node, dispatching on the leading version and type
    /// tag. Rejects unknown types, versions newer than [`CURRENT_VERSION`],
    /// and trailing bytes; recomputes the id from the buffer.
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let (_, node_type) = version_and_type_of(buf)?;
        match node_type {
            NodeType::Identity => Identity::from_bytes(buf).map(Node::Identity),
            NodeType::Community => Community::from_bytes(buf).map(Node::Community),
            NodeType::Reply => Reply::from_bytes(buf).map(Node::Reply),
        }
    }

    /// Serializes the full node, signature included.
    pub fn marshal_binary(&self) -> Vec<u8> {
        match self {
            Node::Identity(n) => n.marshal_binary(),
            Node::Community(n) => n.marshal_binary(),
            Node::Reply(n) => n.marshal_binary(),
        }
    }

    /// Serializes the signable subset (everything except the signature).
    pub fn marshal_signed_data(&self) -> Vec<u8> {
        match self {
            Node::Identity(n) => n.marshal_signed_data(),
            Node::Community(n) => n.marshal_signed_data(),
            Node::Reply(n) => n.marshal_signed_data(),
        }
    }

    /// Returns the shared envelope.
    pub fn common(&self) -> &CommonNode {
        match self {
            Node::Identity(n) => &n.common,
            Node::Community(n) => &n.common,
            Node::Reply(n) => &n.common,
        }
    }

    /// Returns this node's content address.
    pub fn id(&self) -> QualifiedHash {
        self.common().id()
    }

    /// Returns the variant discriminator.
    pub fn node_type(&self) -> NodeType {
        self.common().node_type
    }

    /// Returns the parent id (the null hash at tree roots).
    pub fn parent(&self) -> &QualifiedHash {
        &self.common().parent
    }

    /// Returns the author id (the null hash on self-signed nodes).
    pub fn author(&self) -> &QualifiedHash {
        &self.common().author
    }

    /// Returns the distance from the tree root.
    pub fn depth(&self) -> TreeDepth {
        self.common().depth
    }

    /// Returns the creation timestamp in milliseconds.
    pub fn created(&self) -> Timestamp {
        self.common().created
    }

    /// Returns the JSON metadata.
    pub fn metadata(&self) -> &QualifiedContent {
        &self.common().metadata
    }

    /// Returns the detached signature.
    pub fn signature(&self) -> &QualifiedSignature {
        &self.common().signature
    }

    /// Checks every invariant contained in the node itself. Pure, no I/O.
    pub fn validate_shallow(&self) -> Result<()> {
        match self {
            Node::Identity(n) => n.validate_shallow(),
            Node::Community(n) => n.validate_shallow(),
            Node::Reply(n) => n.validate_shallow(),
        }
    }

    /// Checks that every node this one references resolves in `store`.
    /// Read-only against the store.
    pub fn validate_deep(&self, store: &dyn Store) -> Result<()> {
        match self {
            Node::Identity(n) => n.validate_deep(store),
            Node::Community(n) => n.validate_deep(store),
            Node::Reply(n) => n.validate_deep(store),
        }
    }

    /// Returns the inner identity, if this is one.
    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Node::Identity(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the inner community, if this is one.
    pub fn into_community(self) -> Option<Community> {
        match self {
            Node::Community(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the inner reply, if this is one.
    pub fn into_reply(self) -> Option<Reply> {
        match self {
            Node::Reply(n) => Some(n),
            _ => None,
        }
    }
}

impl From<Identity> for Node {
    fn from(n: Identity) -> Self {
        Node::Identity(n)
    }
}

impl From<Community> for Node {
    fn from(n: Community) -> Self {
        Node::Community(n)
    }
}

impl From<Reply> for Node {
    fn from(n: Reply) -> Self {
        Node::Reply(n)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node_type(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::crypto::signer::MemorySigner;

    fn test_metadata() -> serde_json::Value {
        serde_json::json!({"client": "forest-tests"})
    }

    fn build_forest() -> (Identity, Community, Reply, Reply) {
        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "tester", &test_metadata()).unwrap();
        let builder = Builder::new(identity.clone(), signer);
        let community = builder.new_community("general", &test_metadata()).unwrap();
        let r1 = builder
            .new_reply(&Node::Community(community.clone()), "hello", &test_metadata())
            .unwrap();
        let r2 = builder
            .new_reply(&Node::Reply(r1.clone()), "hello back", &test_metadata())
            .unwrap();
        (identity, community, r1, r2)
    }

    #[test]
    fn test_version_and_type_of() {
        let (identity, community, r1, _) = build_forest();

        let buf = identity.marshal_binary();
        let (version, node_type) = version_and_type_of(&buf).unwrap();
        assert_eq!(version, CURRENT_VERSION);
        assert_eq!(node_type, NodeType::Identity);

        let (_, t) = version_and_type_of(&community.marshal_binary()).unwrap();
        assert_eq!(t, NodeType::Community);
        let (_, t) = version_and_type_of(&r1.marshal_binary()).unwrap();
        assert_eq!(t, NodeType::Reply);
    }

    #[test]
    fn test_roundtrip_every_variant() {
        let (identity, community, r1, r2) = build_forest();

        for node in [
            Node::Identity(identity),
            Node::Community(community),
            Node::Reply(r1),
            Node::Reply(r2),
        ] {
            let bytes = node.marshal_binary();
            let decoded = Node::from_bytes(&bytes).unwrap();
            assert_eq!(decoded, node, "structural equality after roundtrip");
            assert_eq!(decoded.id(), node.id(), "id stable across roundtrip");
            decoded.validate_shallow().unwrap();
        }
    }

    #[test]
    fn test_roundtrip_large_fields() {
        let signer = MemorySigner::generate();
        let name = "n".repeat(constants::MAX_NAME_SIZE);
        let identity = Builder::new_identity(&signer, &name, &test_metadata()).unwrap();
        let builder = Builder::new(identity.clone(), signer);
        let community = builder.new_community("big", &test_metadata()).unwrap();
        let content = "x".repeat(constants::MAX_CONTENT_SIZE);
        let reply = builder
            .new_reply(&Node::Community(community), &content, &test_metadata())
            .unwrap();

        let decoded = Reply::from_bytes(&reply.marshal_binary()).unwrap();
        assert_eq!(decoded, reply);
        decoded.validate_shallow().unwrap();
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let (identity, ..) = build_forest();
        let mut bytes = identity.marshal_binary();
        bytes.push(0);
        assert!(Node::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_truncation_rejected() {
        let (identity, ..) = build_forest();
        let bytes = identity.marshal_binary();
        for cut in [1, bytes.len() / 2, bytes.len() - 1] {
            assert!(
                Node::from_bytes(&bytes[..cut]).is_err(),
                "truncation at {} must fail",
                cut
            );
        }
    }

    #[test]
    fn test_future_version_rejected() {
        let (identity, ..) = build_forest();
        let mut bytes = identity.marshal_binary();
        // Bump the big-endian schema version past the supported one.
        bytes[7] = CURRENT_VERSION.0 as u8 + 1;
        assert!(matches!(
            Node::from_bytes(&bytes),
            Err(ForestError::Decode(_))
        ));
    }

    #[test]
    fn test_unknown_node_type_rejected() {
        let (identity, ..) = build_forest();
        let mut bytes = identity.marshal_binary();
        bytes[8] = 9; // type byte follows the 8-byte version
        assert!(Node::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_mutation_changes_id() {
        let (_, _, r1, _) = build_forest();
        let original_id = r1.id();
        let bytes = r1.marshal_binary();

        // Flip one bit anywhere in the buffer; the recomputed id must move.
        let mut tampered = bytes.clone();
        let mid = tampered.len() / 2;
        tampered[mid] ^= 0x01;
        if let Ok(node) = Node::from_bytes(&tampered) {
            assert_ne!(node.id(), original_id);
        }
    }

    #[test]
    fn test_id_recomputed_not_trusted() {
        let (_, _, r1, _) = build_forest();
        let decoded = Reply::from_bytes(&r1.marshal_binary()).unwrap();
        assert_eq!(decoded.id(), r1.id());
        crate::crypto::validate_id(&Node::Reply(decoded)).unwrap();
    }

    #[test]
    fn test_depth_conversation_invariants() {
        let (_, community, r1, r2) = build_forest();

        assert_eq!(r1.common.depth.0, 1);
        assert!(r1.conversation_id.is_null());
        assert_eq!(r1.community_id, community.id());

        assert_eq!(r2.common.depth.0, 2);
        assert_eq!(r2.conversation_id, r1.id());

        // A third-level reply inherits the same conversation root.
        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "t", &test_metadata()).unwrap();
        let builder = Builder::new(identity, signer);
        let r3 = builder
            .new_reply(&Node::Reply(r2.clone()), "deeper", &test_metadata())
            .unwrap();
        assert_eq!(r3.common.depth.0, 3);
        assert_eq!(r3.conversation_id, r1.id());
    }

    #[test]
    fn test_shallow_validation_rejects_null_author() {
        let (_, community, _, _) = build_forest();
        let mut broken = community;
        broken.common.author = QualifiedHash::null();
        assert!(broken.validate_shallow().is_err());
    }

    #[test]
    fn test_shallow_validation_rejects_bad_conversation() {
        let (_, _, r1, r2) = build_forest();

        // Depth-1 reply must have a null conversation id.
        let mut broken = r1.clone();
        broken.conversation_id = r2.id();
        assert!(broken.validate_shallow().is_err());

        // Deeper reply must have a non-null conversation id.
        let mut broken = r2;
        broken.conversation_id = QualifiedHash::null();
        assert!(broken.validate_shallow().is_err());
    }

    #[test]
    fn test_deep_validation() {
        use crate::store::{MemoryStore, Store};

        let (identity, community, r1, r2) = build_forest();
        let store = MemoryStore::new();

        // Nothing stored yet: the reply's parent is missing.
        let err = r2.validate_deep(&store).unwrap_err();
        assert!(matches!(err, ForestError::MissingReferencedNode(_)));

        store.add(&Node::Identity(identity)).unwrap();
        store.add(&Node::Community(community)).unwrap();
        store.add(&Node::Reply(r1)).unwrap();
        r2.validate_deep(&store).unwrap();
    }
}
