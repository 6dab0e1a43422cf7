//! The common node envelope shared by every node variant.
//!
//! Serialization order is a wire contract and matches declaration order:
//! schema version, node type, parent, id descriptor, depth, creation time,
//! metadata, author, then the fields of each variant, then the signature.
//! The "signable" subset is everything except the signature.

use crate::crypto::signer::SIGNATURE_LENGTH;
use crate::error::{ForestError, Result};
use crate::fields::{
    take, Blob, HashDescriptor, HashType, QualifiedContent, QualifiedHash, QualifiedSignature,
    SchemaVersion, Timestamp, TreeDepth,
};
use crate::node::constants::MAX_METADATA_SIZE;
use crate::node::{NodeType, CURRENT_VERSION};

/// Fields shared by every node variant, plus the derived content address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonNode {
    /// Wire format version this node was written with.
    pub schema_version: SchemaVersion,
    /// Variant discriminator.
    pub node_type: NodeType,
    /// Id of the parent node; the null hash at a tree root.
    pub parent: QualifiedHash,
    /// Declares the algorithm and length of this node's own id.
    pub id_desc: HashDescriptor,
    /// Distance from the tree root.
    pub depth: TreeDepth,
    /// Creation time in milliseconds since the Unix epoch.
    pub created: Timestamp,
    /// Arbitrary JSON metadata.
    pub metadata: QualifiedContent,
    /// Id of the signing Identity; the null hash on self-signed nodes.
    pub author: QualifiedHash,
    /// Detached signature over the signable subset.
    pub signature: QualifiedSignature,
    /// Derived content address. Never serialized, always recomputed from the
    /// full marshaled bytes.
    pub(crate) id: Blob,
}

impl CommonNode {
    /// Returns this node's content address as a qualified hash.
    pub fn id(&self) -> QualifiedHash {
        QualifiedHash {
            descriptor: self.id_desc,
            blob: self.id.clone(),
        }
    }

    /// Appends the signable envelope fields (everything through `author`).
    pub(crate) fn marshal_signed_prefix(&self, out: &mut Vec<u8>) {
        self.schema_version.encode_into(out);
        out.push(self.node_type.to_byte());
        self.parent.encode_into(out);
        self.id_desc.encode_into(out);
        self.depth.encode_into(out);
        self.created.encode_into(out);
        self.metadata.encode_into(out);
        self.author.encode_into(out);
    }

    /// Parses the envelope prefix, leaving signature and id unset.
    ///
    /// Rejects schema versions newer than [`CURRENT_VERSION`] and a type tag
    /// different from `expected` (the dispatcher has already committed to a
    /// variant by the time this runs).
    pub(crate) fn parse_prefix(buf: &[u8], expected: NodeType) -> Result<(Self, usize)> {
        let (schema_version, mut at) = SchemaVersion::decode(buf)?;
        if schema_version > CURRENT_VERSION {
            return Err(ForestError::decode(format!(
                "unsupported schema version {} (current is {})",
                schema_version, CURRENT_VERSION
            )));
        }

        let [type_byte] = take::<1>(&buf[at..], "node type")?;
        at += 1;
        let node_type = NodeType::from_byte(type_byte)?;
        if node_type != expected {
            return Err(ForestError::decode(format!(
                "expected {} node, found {}",
                expected, node_type
            )));
        }

        let (parent, n) = QualifiedHash::decode(&buf[at..])?;
        at += n;
        let (id_desc, n) = HashDescriptor::decode(&buf[at..])?;
        at += n;
        let (depth, n) = TreeDepth::decode(&buf[at..])?;
        at += n;
        let (created, n) = Timestamp::decode(&buf[at..])?;
        at += n;
        let (metadata, n) = QualifiedContent::decode(&buf[at..])?;
        at += n;
        let (author, n) = QualifiedHash::decode(&buf[at..])?;
        at += n;

        Ok((
            Self {
                schema_version,
                node_type,
                parent,
                id_desc,
                depth,
                created,
                metadata,
                author,
                signature: QualifiedSignature::new(
                    crate::fields::SignatureType::Ed25519,
                    Vec::new(),
                )?,
                id: Blob::default(),
            },
            at,
        ))
    }

    /// Shallow checks shared by every variant: version bound, qualified
    /// value agreement, JSON metadata, a real id algorithm, a well-formed
    /// signature.
    pub(crate) fn validate_common(&self) -> Result<()> {
        if self.schema_version > CURRENT_VERSION {
            return Err(ForestError::validation(format!(
                "unsupported schema version {}",
                self.schema_version
            )));
        }

        self.parent.validate_digest()?;
        self.author.validate_digest()?;

        if self.id_desc != HashDescriptor::sha512_256() {
            return Err(ForestError::validation(format!(
                "node id descriptor must be {}, got {}",
                HashDescriptor::sha512_256(),
                self.id_desc
            )));
        }
        if self.id.len() != HashType::Sha512_256.digest_length() {
            return Err(ForestError::validation(format!(
                "node id must be {} bytes, got {}",
                HashType::Sha512_256.digest_length(),
                self.id.len()
            )));
        }

        self.metadata.validate()?;
        self.metadata.validate_json()?;
        if self.metadata.blob.len() > MAX_METADATA_SIZE {
            return Err(ForestError::validation(format!(
                "metadata exceeds {} bytes",
                MAX_METADATA_SIZE
            )));
        }

        self.signature.validate()?;
        if self.signature.blob.len() != SIGNATURE_LENGTH {
            return Err(ForestError::validation(format!(
                "signature must be {} bytes, got {}",
                SIGNATURE_LENGTH,
                self.signature.blob.len()
            )));
        }

        Ok(())
    }
}
