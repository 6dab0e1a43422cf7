//! In-memory node storage.

use crate::error::Result;
use crate::fields::QualifiedHash;
use crate::node::{Node, NodeType};
use crate::store::Store;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// A node store backed by a map behind a read-write lock.
///
/// The canonical store for tests, and the usual cache layer in front of a
/// [`Grove`](crate::store::Grove).
#[derive(Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<QualifiedHash, Node>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, id: &QualifiedHash) -> Result<Option<Node>> {
        let nodes = self.nodes.read().unwrap_or_else(|e| e.into_inner());
        Ok(nodes.get(id).cloned())
    }

    fn add(&self, node: &Node) -> Result<()> {
        let mut nodes = self.nodes.write().unwrap_or_else(|e| e.into_inner());
        if nodes.contains_key(&node.id()) {
            return Ok(());
        }
        debug!(id = %node.id(), kind = %node.node_type(), "storing node");
        nodes.insert(node.id(), node.clone());
        Ok(())
    }

    fn size(&self) -> Result<usize> {
        let nodes = self.nodes.read().unwrap_or_else(|e| e.into_inner());
        Ok(nodes.len())
    }

    fn children(&self, id: &QualifiedHash) -> Result<Vec<QualifiedHash>> {
        let nodes = self.nodes.read().unwrap_or_else(|e| e.into_inner());
        Ok(nodes
            .values()
            .filter(|node| node.parent() == id)
            .map(|node| node.id())
            .collect())
    }

    fn recent(&self, node_type: NodeType, quantity: usize) -> Result<Vec<Node>> {
        let nodes = self.nodes.read().unwrap_or_else(|e| e.into_inner());
        let mut matching: Vec<Node> = nodes
            .values()
            .filter(|node| node.node_type() == node_type)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created().0.cmp(&a.created().0));
        matching.truncate(quantity);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::crypto::MemorySigner;

    fn metadata() -> serde_json::Value {
        serde_json::json!({})
    }

    #[test]
    fn test_add_get_roundtrip() {
        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "alice", &metadata()).unwrap();
        let node = Node::Identity(identity);

        let store = MemoryStore::new();
        assert_eq!(store.size().unwrap(), 0);
        assert!(store.get(&node.id()).unwrap().is_none());

        store.add(&node).unwrap();
        assert_eq!(store.size().unwrap(), 1);
        assert_eq!(store.get(&node.id()).unwrap(), Some(node));
    }

    #[test]
    fn test_add_is_idempotent() {
        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "alice", &metadata()).unwrap();
        let node = Node::Identity(identity);

        let store = MemoryStore::new();
        store.add(&node).unwrap();
        store.add(&node).unwrap();
        assert_eq!(store.size().unwrap(), 1);
    }

    #[test]
    fn test_typed_getters_filter_by_kind() {
        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "alice", &metadata()).unwrap();
        let builder = Builder::new(identity.clone(), signer);
        let community = builder.new_community("plants", &metadata()).unwrap();

        let store = MemoryStore::new();
        store.add(&Node::Identity(identity.clone())).unwrap();
        store.add(&Node::Community(community.clone())).unwrap();

        assert_eq!(
            store.get_identity(&identity.id()).unwrap(),
            Some(identity.clone())
        );
        assert_eq!(
            store.get_community(&community.id()).unwrap(),
            Some(community.clone())
        );
        // Held under another kind reads the same as absent.
        assert!(store.get_reply(&community.id()).unwrap().is_none());
        assert!(store.get_identity(&community.id()).unwrap().is_none());
        assert!(store
            .get_reply(&crate::fields::QualifiedHash::null())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_children_and_recent() {
        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "alice", &metadata()).unwrap();
        let builder = Builder::new(identity.clone(), signer);
        let community = builder.new_community("plants", &metadata()).unwrap();
        let r1 = builder
            .new_reply(&Node::Community(community.clone()), "one", &metadata())
            .unwrap();
        let mut r2 = builder
            .new_reply(&Node::Community(community.clone()), "two", &metadata())
            .unwrap();
        // Force a distinct, strictly later creation time.
        r2.common.created = crate::fields::Timestamp(r1.created().0 + 10);

        let store = MemoryStore::new();
        store.add(&Node::Identity(identity)).unwrap();
        store.add(&Node::Community(community.clone())).unwrap();
        store.add(&Node::Reply(r1.clone())).unwrap();
        store.add(&Node::Reply(r2.clone())).unwrap();

        let mut kids = store.children(&community.id()).unwrap();
        kids.sort_by_key(|id| id.to_text());
        let mut expected = vec![r1.id(), r2.id()];
        expected.sort_by_key(|id| id.to_text());
        assert_eq!(kids, expected);

        let recent = store.recent(NodeType::Reply, 1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id(), r2.id());
    }
}
