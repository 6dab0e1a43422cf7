//! Node construction and signing orchestration.
//!
//! The [`Builder`] populates every envelope and variant field, derives the
//! tree position (depth, community, conversation) from the parent, hands the
//! signable bytes to a [`Signer`], and seals the node with its signature and
//! content address. No partially-constructed node is ever returned: every
//! operation validates the finished node before handing it back.

use crate::crypto::signer::Signer;
use crate::error::{ForestError, Result};
use crate::fields::{
    HashDescriptor, KeyType, QualifiedContent, QualifiedHash, QualifiedKey, QualifiedSignature,
    SignatureType, Timestamp, TreeDepth,
};
use crate::node::{CommonNode, Community, Identity, Node, NodeType, Reply, CURRENT_VERSION};
use tracing::debug;

/// Builds well-formed, signed nodes on behalf of a signing identity.
pub struct Builder<S: Signer> {
    /// The identity every built node is authored by.
    pub user: Identity,
    signer: S,
}

impl<S: Signer> Builder<S> {
    /// Creates a builder that signs as `user` with `signer`.
    ///
    /// The signer must hold the key matching `user`'s embedded public key;
    /// nodes signed with any other key will fail verification.
    pub fn new(user: Identity, signer: S) -> Self {
        Self { user, signer }
    }

    /// Creates and signs a new self-signed identity.
    ///
    /// Identities are the root trust anchors, so no owning builder is
    /// required: author and parent are the null hash and the depth is zero.
    pub fn new_identity(
        signer: &S,
        name: &str,
        metadata: &serde_json::Value,
    ) -> Result<Identity> {
        let public_key = QualifiedKey::new(KeyType::Ed25519, signer.public_key()?)?;
        let mut identity = Identity {
            common: envelope(
                NodeType::Identity,
                QualifiedHash::null(),
                TreeDepth(0),
                QualifiedHash::null(),
                metadata,
            )?,
            name: QualifiedContent::utf8(name)?,
            public_key,
        };

        let signature = sign_with(signer, &identity.marshal_signed_data())?;
        identity.finalize(signature);
        identity.validate_shallow()?;

        debug!(id = %identity.id(), name, "built identity");
        Ok(identity)
    }

    /// Creates and signs a new community authored by this builder's user.
    pub fn new_community(&self, name: &str, metadata: &serde_json::Value) -> Result<Community> {
        let mut community = Community {
            common: envelope(
                NodeType::Community,
                QualifiedHash::null(),
                TreeDepth(0),
                self.user.id(),
                metadata,
            )?,
            name: QualifiedContent::utf8(name)?,
        };

        let signature = sign_with(&self.signer, &community.marshal_signed_data())?;
        community.finalize(signature);
        community.validate_shallow()?;

        debug!(id = %community.id(), name, "built community");
        Ok(community)
    }

    /// Creates and signs a reply to `parent`, which must be a community or a
    /// reply.
    ///
    /// Tree position is derived from the parent: a reply to a community sits
    /// at depth 1 with a null conversation id; a reply to a depth-1 reply
    /// adopts that reply's id as its conversation root; deeper replies
    /// inherit the parent's conversation id.
    pub fn new_reply(
        &self,
        parent: &Node,
        content: &str,
        metadata: &serde_json::Value,
    ) -> Result<Reply> {
        let (depth, community_id, conversation_id) = match parent {
            Node::Community(c) => (TreeDepth(1), c.id(), QualifiedHash::null()),
            Node::Reply(r) => {
                let conversation = if r.common.depth.0 == 1 {
                    r.id()
                } else {
                    r.conversation_id.clone()
                };
                (
                    r.common.depth.child_depth()?,
                    r.community_id.clone(),
                    conversation,
                )
            }
            Node::Identity(_) => {
                return Err(ForestError::parent_kind(
                    "reply parent must be a community or reply, got an identity",
                ))
            }
        };

        let mut reply = Reply {
            common: envelope(
                NodeType::Reply,
                parent.id(),
                depth,
                self.user.id(),
                metadata,
            )?,
            community_id,
            conversation_id,
            content: QualifiedContent::utf8(content)?,
        };

        let signature = sign_with(&self.signer, &reply.marshal_signed_data())?;
        reply.finalize(signature);
        reply.validate_shallow()?;

        debug!(id = %reply.id(), parent = %parent.id(), depth = reply.common.depth.0, "built reply");
        Ok(reply)
    }
}

/// Populates the common envelope with everything except signature and id.
fn envelope(
    node_type: NodeType,
    parent: QualifiedHash,
    depth: TreeDepth,
    author: QualifiedHash,
    metadata: &serde_json::Value,
) -> Result<CommonNode> {
    Ok(CommonNode {
        schema_version: CURRENT_VERSION,
        node_type,
        parent,
        id_desc: HashDescriptor::sha512_256(),
        depth,
        created: Timestamp::now(),
        metadata: QualifiedContent::json(metadata)?,
        author,
        signature: QualifiedSignature::new(SignatureType::Ed25519, Vec::new())?,
        id: Default::default(),
    })
}

fn sign_with<S: Signer>(signer: &S, signable: &[u8]) -> Result<QualifiedSignature> {
    QualifiedSignature::new(SignatureType::Ed25519, signer.sign(signable)?)
}
