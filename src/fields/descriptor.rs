//! Type tags and (type, length) descriptors.
//!
//! A descriptor pairs a 1-byte type tag with a 2-byte length, so every
//! qualified field self-declares its algorithm/format and size. Tags are
//! closed enums: a byte outside the valid set fails at decode time, which
//! makes an out-of-range tag unrepresentable afterwards.

use crate::error::{ForestError, Result};
use crate::fields::primitives::{take, ContentLength};
use std::fmt;

/// A 1-byte type tag with a closed set of valid values.
pub trait TypeTag: fmt::Debug + fmt::Display + Copy + Eq {
    /// Human name for the value kind ("hash", "content", ...), used in errors.
    const KIND: &'static str;

    /// Returns the wire byte for this tag.
    fn to_byte(self) -> u8;

    /// Parses a wire byte, rejecting values outside the valid set.
    fn from_byte(b: u8) -> Result<Self>;
}

/// Hash algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HashType {
    /// The null hash: zero-length, used as the "no parent" / "self-signed"
    /// sentinel.
    Nil = 0,
    /// SHA-512/256 (32-byte digest).
    Sha512_256 = 1,
}

impl HashType {
    /// All known hash types.
    pub const ALL: [HashType; 2] = [HashType::Nil, HashType::Sha512_256];

    /// Stable text name, used in the lossless text encoding of hashes.
    pub fn name(&self) -> &'static str {
        match self {
            HashType::Nil => "NIL",
            HashType::Sha512_256 => "SHA512_256",
        }
    }

    /// Digest length in bytes.
    pub fn digest_length(&self) -> usize {
        match self {
            HashType::Nil => 0,
            HashType::Sha512_256 => 32,
        }
    }
}

impl TypeTag for HashType {
    const KIND: &'static str = "hash";

    fn to_byte(self) -> u8 {
        self as u8
    }

    fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(HashType::Nil),
            1 => Ok(HashType::Sha512_256),
            other => Err(ForestError::decode(format!("unknown hash type {}", other))),
        }
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Content format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContentType {
    /// Plain UTF-8 text.
    Utf8 = 1,
    /// A JSON document.
    Json = 2,
}

impl TypeTag for ContentType {
    const KIND: &'static str = "content";

    fn to_byte(self) -> u8 {
        self as u8
    }

    fn from_byte(b: u8) -> Result<Self> {
        match b {
            1 => Ok(ContentType::Utf8),
            2 => Ok(ContentType::Json),
            other => Err(ForestError::decode(format!(
                "unknown content type {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Utf8 => write!(f, "UTF8"),
            ContentType::Json => write!(f, "JSON"),
        }
    }
}

/// Public key format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyType {
    /// Raw 32-byte Ed25519 public key.
    Ed25519 = 1,
}

impl TypeTag for KeyType {
    const KIND: &'static str = "key";

    fn to_byte(self) -> u8 {
        self as u8
    }

    fn from_byte(b: u8) -> Result<Self> {
        match b {
            1 => Ok(KeyType::Ed25519),
            other => Err(ForestError::decode(format!("unknown key type {}", other))),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ED25519")
    }
}

/// Signature format tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SignatureType {
    /// Raw 64-byte detached Ed25519 signature.
    Ed25519 = 1,
}

impl TypeTag for SignatureType {
    const KIND: &'static str = "signature";

    fn to_byte(self) -> u8 {
        self as u8
    }

    fn from_byte(b: u8) -> Result<Self> {
        match b {
            1 => Ok(SignatureType::Ed25519),
            other => Err(ForestError::decode(format!(
                "unknown signature type {}",
                other
            ))),
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ED25519")
    }
}

/// A (type, length) descriptor. Exactly 3 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor<T: TypeTag> {
    /// The type tag of the value this descriptor qualifies.
    pub tag: T,
    /// The declared length of the qualified blob.
    pub length: ContentLength,
}

/// Descriptor restricted to hash types.
pub type HashDescriptor = Descriptor<HashType>;
/// Descriptor restricted to content types.
pub type ContentDescriptor = Descriptor<ContentType>;
/// Descriptor restricted to key types.
pub type KeyDescriptor = Descriptor<KeyType>;
/// Descriptor restricted to signature types.
pub type SignatureDescriptor = Descriptor<SignatureType>;

impl<T: TypeTag> Descriptor<T> {
    /// Encoded width in bytes.
    pub const WIRE_BYTES: usize = 3;

    /// Creates a descriptor for the given tag and blob length.
    pub fn new(tag: T, length: usize) -> Result<Self> {
        Ok(Self {
            tag,
            length: ContentLength::new(length)?,
        })
    }

    /// Appends the binary form to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.tag.to_byte());
        self.length.encode_into(out);
    }

    /// Decodes from the front of `buf`, returning the value and bytes consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let [tag_byte] = take::<1>(buf, T::KIND)?;
        let tag = T::from_byte(tag_byte)?;
        let (length, _) = ContentLength::decode(&buf[1..])?;
        Ok((Self { tag, length }, Self::WIRE_BYTES))
    }
}

impl HashDescriptor {
    /// The descriptor every non-null node id carries: SHA-512/256, 32 bytes.
    pub fn sha512_256() -> Self {
        Self {
            tag: HashType::Sha512_256,
            length: ContentLength(HashType::Sha512_256.digest_length() as u16),
        }
    }

    /// The null hash descriptor: zero-length, no algorithm.
    pub fn nil() -> Self {
        Self {
            tag: HashType::Nil,
            length: ContentLength(0),
        }
    }
}

impl<T: TypeTag> fmt::Display for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.tag, self.length)
    }
}
