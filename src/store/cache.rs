//! Layered read-through/write-through storage.

use crate::error::Result;
use crate::fields::QualifiedHash;
use crate::node::{Node, NodeType};
use crate::store::Store;
use tracing::warn;

/// A fast cache store layered over an authoritative base store.
///
/// Reads hit the cache first and fall back to the base, warming the cache on
/// the way out. Writes go to the base first so the cache never holds a node
/// the base lost. Aggregate queries (`size`, `children`, `recent`) always
/// consult the base, which is the layer that holds everything.
pub struct CacheStore<C: Store, B: Store> {
    cache: C,
    base: B,
}

impl<C: Store, B: Store> CacheStore<C, B> {
    /// Layers `cache` over `base`.
    pub fn new(cache: C, base: B) -> Self {
        Self { cache, base }
    }

    /// The cache layer.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// The authoritative layer.
    pub fn base(&self) -> &B {
        &self.base
    }
}

impl<C: Store, B: Store> Store for CacheStore<C, B> {
    fn get(&self, id: &QualifiedHash) -> Result<Option<Node>> {
        if let Some(node) = self.cache.get(id)? {
            return Ok(Some(node));
        }
        match self.base.get(id)? {
            None => Ok(None),
            Some(node) => {
                // A failed warm must not hide a successful read.
                if let Err(e) = self.cache.add(&node) {
                    warn!(id = %id, error = %e, "failed to warm cache");
                }
                Ok(Some(node))
            }
        }
    }

    fn add(&self, node: &Node) -> Result<()> {
        self.base.add(node)?;
        self.cache.add(node)
    }

    fn size(&self) -> Result<usize> {
        self.base.size()
    }

    fn children(&self, id: &QualifiedHash) -> Result<Vec<QualifiedHash>> {
        self.base.children(id)
    }

    fn recent(&self, node_type: NodeType, quantity: usize) -> Result<Vec<Node>> {
        self.base.recent(node_type, quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::crypto::MemorySigner;
    use crate::store::MemoryStore;

    fn metadata() -> serde_json::Value {
        serde_json::json!({})
    }

    fn sample_node() -> Node {
        let signer = MemorySigner::generate();
        Node::Identity(Builder::new_identity(&signer, "alice", &metadata()).unwrap())
    }

    #[test]
    fn test_read_through_warms_cache() {
        let node = sample_node();
        let base = MemoryStore::new();
        base.add(&node).unwrap();
        let layered = CacheStore::new(MemoryStore::new(), base);

        assert_eq!(layered.cache().size().unwrap(), 0);
        assert_eq!(layered.get(&node.id()).unwrap(), Some(node.clone()));
        // The miss warmed the cache.
        assert_eq!(layered.cache().get(&node.id()).unwrap(), Some(node));
    }

    #[test]
    fn test_write_through_lands_in_both() {
        let node = sample_node();
        let layered = CacheStore::new(MemoryStore::new(), MemoryStore::new());

        layered.add(&node).unwrap();
        assert_eq!(layered.cache().get(&node.id()).unwrap(), Some(node.clone()));
        assert_eq!(layered.base().get(&node.id()).unwrap(), Some(node));
    }

    #[test]
    fn test_aggregates_come_from_base() {
        let node = sample_node();
        let base = MemoryStore::new();
        base.add(&node).unwrap();
        let layered = CacheStore::new(MemoryStore::new(), base);

        // Nothing cached yet, but size reflects the base.
        assert_eq!(layered.size().unwrap(), 1);
        assert_eq!(
            layered.recent(NodeType::Identity, 10).unwrap()[0].id(),
            node.id()
        );
    }

    #[test]
    fn test_miss_in_both_is_none() {
        let layered = CacheStore::new(MemoryStore::new(), MemoryStore::new());
        let absent = sample_node();
        assert!(layered.get(&absent.id()).unwrap().is_none());
    }
}
