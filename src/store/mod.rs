//! Node persistence.
//!
//! Everything that holds nodes implements [`Store`], so callers can swap an
//! in-memory map, an on-disk grove, or a layered cache without changing any
//! validation or archive code. Stores are append-only: a node is either
//! absent or present forever, and re-adding an existing node is a no-op.
//!
//! ## Modules
//!
//! - `memory`: [`MemoryStore`], a map behind a read-write lock
//! - `cache`: [`CacheStore`], a read-through/write-through pair of stores
//! - `grove`: [`Grove`], one file per node in a flat directory

mod cache;
mod grove;
mod memory;

pub use cache::CacheStore;
pub use grove::Grove;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::fields::QualifiedHash;
use crate::node::{Community, Identity, Node, NodeType, Reply};

/// Append-only, content-addressed node storage.
///
/// All methods take `&self`; implementations synchronize internally so a
/// store can be shared across threads behind a plain reference.
pub trait Store {
    /// Fetches the node with the given id. `Ok(None)` means the store does
    /// not hold it, which is distinct from a failure to look.
    fn get(&self, id: &QualifiedHash) -> Result<Option<Node>>;

    /// Adds a node. Adding an id that is already present is a no-op: the
    /// first write wins and the stored bytes never change.
    fn add(&self, node: &Node) -> Result<()>;

    /// Number of nodes held.
    fn size(&self) -> Result<usize>;

    /// Ids of all nodes whose parent is `id`, in no particular order.
    fn children(&self, id: &QualifiedHash) -> Result<Vec<QualifiedHash>>;

    /// The most recently created nodes of the given kind, newest first, at
    /// most `quantity` of them.
    fn recent(&self, node_type: NodeType, quantity: usize) -> Result<Vec<Node>>;

    /// Fetches an identity. An id held under another kind is `None`, exactly
    /// as if `get` had been filtered by type.
    fn get_identity(&self, id: &QualifiedHash) -> Result<Option<Identity>> {
        Ok(self.get(id)?.and_then(Node::into_identity))
    }

    /// Fetches a community. An id held under another kind is `None`.
    fn get_community(&self, id: &QualifiedHash) -> Result<Option<Community>> {
        Ok(self.get(id)?.and_then(Node::into_community))
    }

    /// Fetches a reply. An id held under another kind is `None`.
    fn get_reply(&self, id: &QualifiedHash) -> Result<Option<Reply>> {
        Ok(self.get(id)?.and_then(Node::into_reply))
    }
}
