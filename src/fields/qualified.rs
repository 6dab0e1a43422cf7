//! Qualified values: a descriptor paired with its byte blob.
//!
//! Hashes, content, keys, and signatures all share this shape, so every
//! serialized field self-declares its format and size. The invariant checked
//! by [`Qualified::validate`] is that the blob length matches the declared
//! descriptor length.

use crate::error::{ForestError, Result};
use crate::fields::descriptor::{
    ContentType, Descriptor, HashType, KeyType, SignatureType, TypeTag,
};
use crate::fields::primitives::Blob;
use std::fmt;

/// A descriptor and the blob it describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Qualified<T: TypeTag> {
    /// Declares the blob's type and length.
    pub descriptor: Descriptor<T>,
    /// The value bytes.
    pub blob: Blob,
}

/// A qualified hash (content address or reference).
pub type QualifiedHash = Qualified<HashType>;
/// Qualified message or metadata content.
pub type QualifiedContent = Qualified<ContentType>;
/// A qualified public key.
pub type QualifiedKey = Qualified<KeyType>;
/// A qualified detached signature.
pub type QualifiedSignature = Qualified<SignatureType>;

impl<T: TypeTag> Qualified<T> {
    /// Creates a qualified value whose descriptor matches the blob length.
    pub fn new(tag: T, bytes: Vec<u8>) -> Result<Self> {
        Ok(Self {
            descriptor: Descriptor::new(tag, bytes.len())?,
            blob: Blob::new(bytes),
        })
    }

    /// Checks the blob length against the declared descriptor length.
    pub fn validate(&self) -> Result<()> {
        if self.blob.len() != self.descriptor.length.as_usize() {
            return Err(ForestError::validation(format!(
                "{} length mismatch: descriptor declares {}, blob is {} bytes",
                T::KIND,
                self.descriptor.length,
                self.blob.len()
            )));
        }
        Ok(())
    }

    /// Appends the binary form (descriptor, then blob) to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        self.descriptor.encode_into(out);
        self.blob.encode_into(out);
    }

    /// Returns the binary form.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Descriptor::<T>::WIRE_BYTES + self.blob.len());
        self.encode_into(&mut out);
        out
    }

    /// Decodes from the front of `buf`, returning the value and bytes consumed.
    ///
    /// The blob length comes from the decoded descriptor.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let (descriptor, desc_len) = Descriptor::<T>::decode(buf)?;
        let (blob, blob_len) = Blob::decode(&buf[desc_len..], descriptor.length.as_usize())?;
        Ok((Self { descriptor, blob }, desc_len + blob_len))
    }
}

impl QualifiedHash {
    /// The distinguished null hash: "no parent" / "self-signed".
    pub fn null() -> Self {
        Self {
            descriptor: Descriptor::nil(),
            blob: Blob::default(),
        }
    }

    /// Returns true if this is the null hash.
    pub fn is_null(&self) -> bool {
        self.descriptor.tag == HashType::Nil && self.blob.is_empty()
    }

    /// Checks length agreement and that the blob matches the algorithm's
    /// digest length.
    pub fn validate_digest(&self) -> Result<()> {
        self.validate()?;
        let expected = self.descriptor.tag.digest_length();
        if self.blob.len() != expected {
            return Err(ForestError::validation(format!(
                "{} hash must be {} bytes, got {}",
                self.descriptor.tag,
                expected,
                self.blob.len()
            )));
        }
        Ok(())
    }

    /// Lossless text form: `SHA512_256__<base64url>` (`NIL__` for the null
    /// hash). Stable, filesystem-safe; used as the on-disk filename.
    pub fn to_text(&self) -> String {
        format!("{}__{}", self.descriptor.tag.name(), self.blob.to_base64())
    }

    /// Parses the text form produced by [`QualifiedHash::to_text`].
    pub fn from_text(s: &str) -> Result<Self> {
        let (name, b64) = s
            .split_once("__")
            .ok_or_else(|| ForestError::decode(format!("malformed hash text '{}'", s)))?;
        let tag = HashType::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ForestError::decode(format!("unknown hash type name '{}'", name)))?;
        let blob = Blob::from_base64(b64)?;
        let hash = Self::new(tag, blob.as_slice().to_vec())?;
        hash.validate_digest()?;
        Ok(hash)
    }
}

impl QualifiedContent {
    /// Creates UTF-8 text content.
    pub fn utf8(text: &str) -> Result<Self> {
        Self::new(ContentType::Utf8, text.as_bytes().to_vec())
    }

    /// Creates JSON content from a serialized value.
    pub fn json(value: &serde_json::Value) -> Result<Self> {
        Self::new(ContentType::Json, value.to_string().into_bytes())
    }

    /// Returns the content as a string, if it is valid UTF-8.
    pub fn as_str(&self) -> Result<&str> {
        std::str::from_utf8(self.blob.as_slice())
            .map_err(|e| ForestError::validation(format!("content is not valid UTF-8: {}", e)))
    }

    /// Checks that the content is declared JSON and actually parses as JSON.
    pub fn validate_json(&self) -> Result<()> {
        if self.descriptor.tag != ContentType::Json {
            return Err(ForestError::validation(format!(
                "expected JSON content, got {}",
                self.descriptor.tag
            )));
        }
        serde_json::from_slice::<serde_json::Value>(self.blob.as_slice())
            .map_err(|e| ForestError::validation(format!("content is not valid JSON: {}", e)))?;
        Ok(())
    }
}

impl fmt::Display for QualifiedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// UTF-8 and JSON content render as raw text for readability; anything else
/// would fall back to base64.
impl fmt::Display for QualifiedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.descriptor.tag {
            ContentType::Utf8 | ContentType::Json => {
                write!(f, "{}", String::from_utf8_lossy(self.blob.as_slice()))
            }
        }
    }
}

impl fmt::Display for QualifiedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.descriptor, self.blob.to_base64())
    }
}

impl fmt::Display for QualifiedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.descriptor, self.blob.to_base64())
    }
}
