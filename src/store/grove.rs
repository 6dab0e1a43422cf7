//! On-disk node storage: one file per node in a flat directory.

use crate::error::{ForestError, Result};
use crate::fields::{HashType, QualifiedHash};
use crate::node::{Node, NodeType};
use crate::store::Store;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// A store that keeps each node as a file named by the text form of its id.
///
/// The directory is flat, and the filenames are the lossless text encoding
/// of each node's hash, so point lookups never scan. Aggregate queries walk
/// the directory and fail if any node file fails to parse; a grove with a
/// corrupt file is not safe to summarize.
pub struct Grove {
    root: PathBuf,
}

impl Grove {
    /// Opens a grove rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "opened grove");
        Ok(Self { root })
    }

    /// The directory nodes are stored in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &QualifiedHash) -> PathBuf {
        self.root.join(id.to_text())
    }

    /// Returns true if the filename could have been written by a grove:
    /// a known hash type name followed by the `__` separator.
    fn is_node_filename(name: &str) -> bool {
        HashType::ALL
            .into_iter()
            .any(|t| name.starts_with(t.name()) && name[t.name().len()..].starts_with("__"))
    }

    fn load(&self, path: &Path) -> Result<Node> {
        let bytes = fs::read(path)?;
        Node::from_bytes(&bytes).map_err(|e| {
            ForestError::decode(format!(
                "corrupt node file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Walks the directory, parsing every node file.
    fn scan(&self) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !Self::is_node_filename(name) {
                continue;
            }
            nodes.push(self.load(&entry.path())?);
        }
        Ok(nodes)
    }
}

impl Store for Grove {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn get(&self, id: &QualifiedHash) -> Result<Option<Node>> {
        let path = self.path_for(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let node = Node::from_bytes(&bytes).map_err(|e| {
            ForestError::decode(format!("corrupt node file {}: {}", path.display(), e))
        })?;
        // The filename is a claim; the bytes are the proof.
        if node.id() != *id {
            return Err(ForestError::validation(format!(
                "node file {} contains id {}",
                path.display(),
                node.id()
            )));
        }
        Ok(Some(node))
    }

    fn add(&self, node: &Node) -> Result<()> {
        let path = self.path_for(&node.id());
        if path.exists() {
            return Ok(());
        }
        debug!(id = %node.id(), kind = %node.node_type(), "writing node file");
        // Staged under a name no scan matches, then renamed into place, so
        // an interrupted write never leaves a truncated node file.
        let staging = self.root.join(format!("tmp-{}", node.id().to_text()));
        fs::write(&staging, node.marshal_binary())?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    fn size(&self) -> Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if Self::is_node_filename(name) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    fn children(&self, id: &QualifiedHash) -> Result<Vec<QualifiedHash>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|node| node.parent() == id)
            .map(|node| node.id())
            .collect())
    }

    fn recent(&self, node_type: NodeType, quantity: usize) -> Result<Vec<Node>> {
        let mut matching: Vec<Node> = self
            .scan()?
            .into_iter()
            .filter(|node| node.node_type() == node_type)
            .collect();
        matching.sort_by(|a, b| b.created().0.cmp(&a.created().0));
        matching.truncate(quantity);
        Ok(matching)
    }
}
