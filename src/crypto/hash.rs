//! Content-address hashing.
//!
//! A node's id is the hash of its complete serialized bytes, including the
//! signature, selected by the node's own id descriptor. Changing either the
//! payload or the signature therefore changes the id.

use crate::fields::{Blob, HashType};
use sha2::{Digest, Sha512_256};

/// Hashes `data` with the given algorithm.
///
/// [`HashType::Nil`] short-circuits to an empty blob; it is only legal while
/// an Identity's own descriptor is being assembled, never as the final id
/// algorithm of a stored node.
pub fn hash_bytes(tag: HashType, data: &[u8]) -> Blob {
    match tag {
        HashType::Nil => Blob::default(),
        HashType::Sha512_256 => {
            let digest = Sha512_256::digest(data);
            Blob::new(digest.to_vec())
        }
    }
}
