//! A time-ordered view over a store, plus ancestry walks and subscriptions.
//!
//! The [`Archive`] wraps any [`Store`] and maintains an in-memory index of
//! replies sorted by creation time, the shape a chat client renders. It also
//! answers structural queries (ancestry, descendants) by walking the
//! underlying store, and notifies subscribers when new nodes arrive.

use crate::error::Result;
use crate::fields::QualifiedHash;
use crate::node::{Node, NodeType, Reply};
use crate::store::Store;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// How many replies to index when opening an archive over an existing store.
const PREFILL_REPLIES: usize = 4096;

/// Callback invoked for every node newly added through the archive.
pub type Subscriber = Arc<dyn Fn(&Node) + Send + Sync>;

/// A store wrapper that keeps replies ordered by creation time.
pub struct Archive<S: Store> {
    store: S,
    /// Replies sorted ascending by creation time, oldest first.
    replies: Mutex<Vec<Reply>>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl<S: Store> Archive<S> {
    /// Opens an archive over `store`, indexing its most recent replies.
    pub fn new(store: S) -> Result<Self> {
        let mut replies: Vec<Reply> = store
            .recent(NodeType::Reply, PREFILL_REPLIES)?
            .into_iter()
            .filter_map(Node::into_reply)
            .collect();
        replies.sort_by_key(|r| r.created().0);
        debug!(indexed = replies.len(), "opened archive");
        Ok(Self {
            store,
            replies: Mutex::new(replies),
            subscribers: Mutex::new(Vec::new()),
        })
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persists `node` and, if it is a reply, slots it into the time index.
    ///
    /// Subscribers are notified only when the node was not already stored;
    /// a re-add of a known node is silent. Callbacks run after every
    /// internal lock is released, so a callback may query or mutate this
    /// archive freely.
    pub fn add(&self, node: &Node) -> Result<()> {
        let known = self.store.get(&node.id())?.is_some();
        self.store.add(node)?;

        if let Node::Reply(reply) = node {
            let mut replies = self.replies.lock().unwrap_or_else(|e| e.into_inner());
            if !replies.iter().any(|r| r.id() == reply.id()) {
                let at = replies.partition_point(|r| r.created().0 <= reply.created().0);
                replies.insert(at, reply.clone());
            }
        }

        if known {
            return Ok(());
        }
        let subscribers: Vec<Subscriber> = self
            .subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for notify in &subscribers {
            notify(node);
        }
        Ok(())
    }

    /// Registers a callback invoked for every node added through this
    /// archive from now on.
    pub fn subscribe(&self, subscriber: Subscriber) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(subscriber);
    }

    /// A snapshot of the indexed replies, oldest first.
    pub fn replies(&self) -> Vec<Reply> {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Position of a reply in the time index, if it is indexed.
    pub fn index_for_id(&self, id: &QualifiedHash) -> Option<usize> {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .position(|r| r.id() == *id)
    }

    /// The chain of ancestor ids of `id`, nearest first, ending at the last
    /// ancestor with a non-null parent.
    ///
    /// An id the store does not hold yields an empty chain. A missing
    /// ancestor ends the walk early with the partial chain gathered so far.
    pub fn ancestry_of(&self, id: &QualifiedHash) -> Result<Vec<QualifiedHash>> {
        let mut chain = Vec::new();
        let Some(mut node) = self.store.get(id)? else {
            return Ok(chain);
        };
        while !node.parent().is_null() {
            let parent_id = node.parent().clone();
            chain.push(parent_id.clone());
            match self.store.get(&parent_id)? {
                Some(parent) => node = parent,
                None => break,
            }
        }
        Ok(chain)
    }

    /// Ids of every indexed reply beneath `id`, breadth-first.
    pub fn descendants_of(&self, id: &QualifiedHash) -> Result<Vec<QualifiedHash>> {
        let snapshot = self.replies();
        let mut found = Vec::new();
        let mut frontier = VecDeque::from([id.clone()]);
        while let Some(current) = frontier.pop_front() {
            for reply in snapshot.iter().filter(|r| r.common.parent == current) {
                found.push(reply.id());
                frontier.push_back(reply.id());
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::crypto::MemorySigner;
    use crate::fields::Timestamp;
    use crate::store::MemoryStore;

    fn metadata() -> serde_json::Value {
        serde_json::json!({})
    }

    struct Fixture {
        archive: Archive<MemoryStore>,
        community: crate::node::Community,
        r1: Reply,
        r2: Reply,
    }

    /// Identity, community, a depth-1 reply, and a depth-2 reply, all added.
    fn fixture() -> Fixture {
        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "alice", &metadata()).unwrap();
        let builder = Builder::new(identity.clone(), signer);
        let community = builder.new_community("plants", &metadata()).unwrap();
        let r1 = builder
            .new_reply(&Node::Community(community.clone()), "root", &metadata())
            .unwrap();
        let r2 = builder
            .new_reply(&Node::Reply(r1.clone()), "leaf", &metadata())
            .unwrap();

        let archive = Archive::new(MemoryStore::new()).unwrap();
        archive.add(&Node::Identity(identity)).unwrap();
        archive.add(&Node::Community(community.clone())).unwrap();
        archive.add(&Node::Reply(r1.clone())).unwrap();
        archive.add(&Node::Reply(r2.clone())).unwrap();

        Fixture {
            archive,
            community,
            r1,
            r2,
        }
    }

    #[test]
    fn test_only_replies_are_indexed() {
        let f = fixture();
        let replies = f.archive.replies();
        assert_eq!(replies.len(), 2);
        assert!(f.archive.index_for_id(&f.community.id()).is_none());
    }

    #[test]
    fn test_index_stays_time_ordered() {
        let f = fixture();

        // An older reply arriving late still lands before newer ones.
        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "bob", &metadata()).unwrap();
        let builder = Builder::new(identity.clone(), signer);
        let mut old = builder
            .new_reply(&Node::Community(f.community.clone()), "hi", &metadata())
            .unwrap();
        old.common.created = Timestamp(0);

        f.archive.add(&Node::Identity(identity)).unwrap();
        f.archive.add(&Node::Reply(old.clone())).unwrap();

        let replies = f.archive.replies();
        assert_eq!(replies[0].id(), old.id());
        assert!(replies
            .windows(2)
            .all(|w| w[0].created().0 <= w[1].created().0));
    }

    #[test]
    fn test_duplicate_add_not_reindexed() {
        let f = fixture();
        f.archive.add(&Node::Reply(f.r1.clone())).unwrap();
        assert_eq!(f.archive.replies().len(), 2);
    }

    #[test]
    fn test_ancestry_walk() {
        let f = fixture();
        let chain = f.archive.ancestry_of(&f.r2.id()).unwrap();
        assert_eq!(chain, vec![f.r1.id(), f.community.id()]);

        // Unknown starting point yields an empty chain.
        let absent =
            QualifiedHash::new(crate::fields::HashType::Sha512_256, vec![5u8; 32]).unwrap();
        assert!(f.archive.ancestry_of(&absent).unwrap().is_empty());
    }

    #[test]
    fn test_ancestry_partial_on_missing_ancestor() {
        let f = fixture();
        // A fresh archive holding only the leaf cannot walk past its parent.
        let sparse = Archive::new(MemoryStore::new()).unwrap();
        sparse.add(&Node::Reply(f.r2.clone())).unwrap();

        let chain = sparse.ancestry_of(&f.r2.id()).unwrap();
        assert_eq!(chain, vec![f.r1.id()]);
    }

    #[test]
    fn test_descendants_walk() {
        let f = fixture();
        let below_community = f.archive.descendants_of(&f.community.id()).unwrap();
        assert_eq!(below_community, vec![f.r1.id(), f.r2.id()]);

        let below_leaf = f.archive.descendants_of(&f.r2.id()).unwrap();
        assert!(below_leaf.is_empty());
    }

    #[test]
    fn test_prefill_from_existing_store() {
        let f = fixture();
        // Insertion order into the store does not matter; the rebuilt index
        // is sorted by creation time.
        let store = MemoryStore::new();
        store.add(&Node::Reply(f.r2.clone())).unwrap();
        store.add(&Node::Reply(f.r1.clone())).unwrap();

        let rebuilt = Archive::new(store).unwrap();
        let replies = rebuilt.replies();
        assert_eq!(replies.len(), 2);
        assert!(replies[0].created().0 <= replies[1].created().0);
    }

    #[test]
    fn test_subscribers_notified() {
        let f = fixture();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        f.archive.subscribe(Arc::new(move |node: &Node| {
            sink.lock().unwrap().push(node.id());
        }));

        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "carol", &metadata()).unwrap();
        let node = Node::Identity(identity);
        f.archive.add(&node).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![node.id()]);
    }

    #[test]
    fn test_re_adding_a_known_node_is_silent() {
        let f = fixture();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        f.archive.subscribe(Arc::new(move |node: &Node| {
            sink.lock().unwrap().push(node.id());
        }));

        // r1 is already stored; re-adding it must not re-fire listeners.
        f.archive.add(&Node::Reply(f.r1.clone())).unwrap();
        assert!(seen.lock().unwrap().is_empty());

        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "erin", &metadata()).unwrap();
        f.archive.add(&Node::Identity(identity.clone())).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![identity.id()]);
    }

    #[test]
    fn test_subscriber_may_reenter_the_archive() {
        let f = fixture();
        let counts = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&counts);
        let archive = Arc::new(f.archive);
        let inner = Arc::downgrade(&archive);
        archive.subscribe(Arc::new(move |_node: &Node| {
            if let Some(archive) = inner.upgrade() {
                sink.lock().unwrap().push(archive.replies().len());
            }
        }));

        let signer = MemorySigner::generate();
        let identity = Builder::new_identity(&signer, "dora", &metadata()).unwrap();
        let builder = Builder::new(identity.clone(), signer);
        let reply = builder
            .new_reply(&Node::Community(f.community.clone()), "hi", &metadata())
            .unwrap();

        archive.add(&Node::Identity(identity)).unwrap();
        archive.add(&Node::Reply(reply)).unwrap();

        // The callback observed the index with the new reply already slotted.
        assert_eq!(*counts.lock().unwrap(), vec![2, 3]);
    }
}
