//! The typed binary field codec underlying every serialized structure.
//!
//! This module provides the leaves of the wire format:
//!
//! - Fixed-width primitives with matching text encodings
//!   ([`SchemaVersion`], [`ContentLength`], [`TreeDepth`], [`Timestamp`],
//!   [`Blob`])
//! - 1-byte type tags with closed valid sets ([`HashType`], [`ContentType`],
//!   [`KeyType`], [`SignatureType`])
//! - 3-byte (type, length) descriptors ([`Descriptor`] and its aliases)
//! - Qualified values pairing a descriptor with its blob ([`Qualified`] and
//!   its aliases)
//!
//! All encodings are pure transforms: encode/decode have no side effects and
//! every malformed input is surfaced as a typed error.

mod descriptor;
mod primitives;
mod qualified;

pub(crate) use primitives::take;

pub use descriptor::{
    ContentDescriptor, ContentType, Descriptor, HashDescriptor, HashType, KeyDescriptor, KeyType,
    SignatureDescriptor, SignatureType, TypeTag,
};
pub use primitives::{Blob, ContentLength, SchemaVersion, Timestamp, TreeDepth};
pub use qualified::{Qualified, QualifiedContent, QualifiedHash, QualifiedKey, QualifiedSignature};
