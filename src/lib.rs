//! An append-only, content-addressed, signed tree of messages.
//!
//! The forest is the data layer of a distributed chat: every message is a
//! node addressed by the hash of its own serialized bytes and signed by its
//! author, so any holder of a node can verify where it sits in the tree and
//! who wrote it without trusting the peer that delivered it.
//!
//! Three kinds of node make up a forest:
//!
//! - [`Identity`](node::Identity): a user, self-signed, carrying a public key
//! - [`Community`](node::Community): a root a group of users replies under
//! - [`Reply`](node::Reply): a message within a community's tree
//!
//! Nodes are immutable once built. New content is expressed by adding
//! children, never by editing, so replication between peers is a set union.
//!
//! ## Typical flow
//!
//! ```no_run
//! use forest::archive::Archive;
//! use forest::builder::Builder;
//! use forest::crypto::MemorySigner;
//! use forest::node::Node;
//! use forest::store::MemoryStore;
//!
//! # fn main() -> forest::error::Result<()> {
//! let signer = MemorySigner::generate();
//! let metadata = serde_json::json!({ "client": "example" });
//! let alice = Builder::new_identity(&signer, "alice", &metadata)?;
//! let builder = Builder::new(alice.clone(), signer);
//!
//! let community = builder.new_community("gardening", &metadata)?;
//! let reply = builder.new_reply(&Node::Community(community.clone()), "hello!", &metadata)?;
//!
//! let archive = Archive::new(MemoryStore::new())?;
//! archive.add(&Node::Identity(alice))?;
//! archive.add(&Node::Community(community))?;
//! archive.add(&Node::Reply(reply))?;
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod builder;
pub mod crypto;
pub mod error;
pub mod fields;
pub mod node;
pub mod store;

pub use archive::Archive;
pub use builder::Builder;
pub use error::{ForestError, Result};
pub use node::Node;
