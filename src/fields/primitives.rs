//! Fixed-width primitive fields of the forest wire format.
//!
//! Every primitive has a canonical binary form (big-endian, fixed width) and
//! a canonical text form (decimal for integers, URL-safe base64 for blobs).
//! Decoding returns the parsed value together with the number of bytes
//! consumed so callers can walk a buffer field by field.

use crate::error::{ForestError, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use std::fmt;

/// Reads a fixed-size array from the front of a buffer.
pub(crate) fn take<const N: usize>(buf: &[u8], what: &str) -> Result<[u8; N]> {
    if buf.len() < N {
        return Err(ForestError::decode(format!(
            "truncated {}: need {} bytes, have {}",
            what,
            N,
            buf.len()
        )));
    }
    let mut arr = [0u8; N];
    arr.copy_from_slice(&buf[..N]);
    Ok(arr)
}

/// Wire format version of a node (8 bytes, big-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SchemaVersion(pub u64);

impl SchemaVersion {
    /// Encoded width in bytes.
    pub const WIRE_BYTES: usize = 8;

    /// Appends the binary form to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0.to_be_bytes());
    }

    /// Decodes from the front of `buf`, returning the value and bytes consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let arr = take::<8>(buf, "schema version")?;
        Ok((Self(u64::from_be_bytes(arr)), Self::WIRE_BYTES))
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Length of a blob in bytes (2 bytes, big-endian, max 65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ContentLength(pub u16);

impl ContentLength {
    /// Encoded width in bytes.
    pub const WIRE_BYTES: usize = 2;

    /// Creates a length from a usize, rejecting values over 65535.
    pub fn new(len: usize) -> Result<Self> {
        u16::try_from(len)
            .map(Self)
            .map_err(|_| ForestError::validation(format!("content length {} exceeds 65535", len)))
    }

    /// Returns the length as a usize.
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }

    /// Appends the binary form to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0.to_be_bytes());
    }

    /// Decodes from the front of `buf`, returning the value and bytes consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let arr = take::<2>(buf, "content length")?;
        Ok((Self(u16::from_be_bytes(arr)), Self::WIRE_BYTES))
    }
}

impl fmt::Display for ContentLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Distance of a node from its tree root (4 bytes, big-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TreeDepth(pub u32);

impl TreeDepth {
    /// Encoded width in bytes.
    pub const WIRE_BYTES: usize = 4;

    /// Returns the depth one level below this one, rejecting overflow past
    /// the wire maximum.
    pub fn child_depth(&self) -> Result<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| ForestError::validation("tree depth overflows u32"))
    }

    /// Appends the binary form to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0.to_be_bytes());
    }

    /// Decodes from the front of `buf`, returning the value and bytes consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let arr = take::<4>(buf, "tree depth")?;
        Ok((Self(u32::from_be_bytes(arr)), Self::WIRE_BYTES))
    }
}

impl fmt::Display for TreeDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Milliseconds since the Unix epoch (8 bytes, big-endian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Encoded width in bytes.
    pub const WIRE_BYTES: usize = 8;

    /// Returns the current wall-clock time.
    pub fn now() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }

    /// Appends the binary form to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0.to_be_bytes());
    }

    /// Decodes from the front of `buf`, returning the value and bytes consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let arr = take::<8>(buf, "timestamp")?;
        Ok((Self(u64::from_be_bytes(arr)), Self::WIRE_BYTES))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Variable-length opaque bytes.
///
/// A blob carries no length prefix of its own; callers supply the exact
/// length from the preceding descriptor when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Blob(Vec<u8>);

impl Blob {
    /// Creates a blob from raw bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the blob length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Appends the binary form to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    /// Decodes exactly `len` bytes from the front of `buf`.
    pub fn decode(buf: &[u8], len: usize) -> Result<(Self, usize)> {
        if buf.len() < len {
            return Err(ForestError::decode(format!(
                "truncated blob: need {} bytes, have {}",
                len,
                buf.len()
            )));
        }
        Ok((Self(buf[..len].to_vec()), len))
    }

    /// Returns the canonical text form (URL-safe base64, no padding).
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(&self.0)
    }

    /// Parses a blob from its canonical text form.
    pub fn from_base64(s: &str) -> Result<Self> {
        URL_SAFE_NO_PAD
            .decode(s)
            .map(Self)
            .map_err(|e| ForestError::decode(format!("invalid base64 blob: {}", e)))
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}
