//! Shared size limits for node validation.
//!
//! These ceilings are enforced by shallow validation on every node so that
//! all stores and peers agree on what a well-formed node looks like.

/// Maximum identity/community name size (256 bytes).
pub const MAX_NAME_SIZE: usize = 256;

/// Maximum metadata size (10 KB). Metadata must be a JSON document.
pub const MAX_METADATA_SIZE: usize = 10 * 1024;

/// Maximum reply content size (32 KB).
///
/// The wire format's 2-byte content length caps any blob at 65535 bytes;
/// this limit sits comfortably below that.
pub const MAX_CONTENT_SIZE: usize = 32 * 1024;
