//! In-memory manifest tree.
//!
//! The tree is stored as an arena of nodes. Index 0 is always the program
//! root; every other node points at its parent by index. Relative install
//! paths are derived by walking those parent links back to the root, so a
//! node whose chain is broken (points past the arena, at a file, or loops)
//! cannot produce a path and is reported as a malformed manifest.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use super::errors::ManifestError;

/// Policy flags and release information from the manifest header.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestMeta {
    /// Release time of the published update.
    pub update_time: NaiveDateTime,
    /// Release version of the published update.
    pub update_version: f64,
    /// Replace every required/requested file regardless of its local state.
    pub force_redownload: bool,
    /// Police the local tree: verify digests and delete unlisted files.
    pub only_allow_listed_files: bool,
    /// Permit unlisted files inside directories the manifest does not declare.
    pub allow_custom_directories: bool,
}

/// Index of a node inside a [`Manifest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The program root.
    pub const ROOT: Self = Self(0);

    /// Raw arena index.
    pub const fn index(self) -> usize {
        self.0
    }

    /// Build an id from a raw index.
    ///
    /// Ids that do not name an existing node are accepted here and rejected
    /// when a path is derived through them.
    pub const fn from_index(index: usize) -> Self {
        Self(index)
    }
}

/// A file the installation is expected to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// File name (single path segment).
    pub name: String,
    /// Whether the file must be present.
    pub required: bool,
    /// Where the file is downloaded from.
    pub source_url: String,
    /// Whether the local copy must match `digest`.
    pub digest_required: bool,
    /// Expected content digest (hex).
    pub digest: String,
    /// Containing directory or program root.
    pub parent: NodeId,
}

/// A directory declared by the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    /// Directory name (single path segment).
    pub name: String,
    /// Whether files not named in the manifest may live here.
    pub allow_unlisted: bool,
    /// Containing directory or program root.
    pub parent: NodeId,
}

/// A single arena entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestNode {
    /// The installation root.
    Program,
    /// A declared directory.
    Directory(DirectoryNode),
    /// A declared file.
    File(FileNode),
}

impl ManifestNode {
    fn name(&self) -> Option<&str> {
        match self {
            Self::Program => None,
            Self::Directory(dir) => Some(&dir.name),
            Self::File(file) => Some(&file.name),
        }
    }
}

/// The parsed remote descriptor. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    meta: ManifestMeta,
    nodes: Vec<ManifestNode>,
}

impl Manifest {
    /// Header flags and release info.
    pub const fn meta(&self) -> &ManifestMeta {
        &self.meta
    }

    /// Number of nodes including the program root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the manifest declares nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&ManifestNode> {
        self.nodes.get(id.0)
    }

    /// All file nodes, in document order.
    pub fn files(&self) -> impl Iterator<Item = (NodeId, &FileNode)> {
        self.nodes.iter().enumerate().filter_map(|(i, node)| match node {
            ManifestNode::File(file) => Some((NodeId(i), file)),
            _ => None,
        })
    }

    /// All directory nodes, in document order.
    pub fn directories(&self) -> impl Iterator<Item = (NodeId, &DirectoryNode)> {
        self.nodes.iter().enumerate().filter_map(|(i, node)| match node {
            ManifestNode::Directory(dir) => Some((NodeId(i), dir)),
            _ => None,
        })
    }

    /// Path of a node relative to the installation root.
    ///
    /// Walks parent links until the program root. Fails if a link points
    /// outside the arena, at a file node, or loops.
    pub fn relative_path(&self, id: NodeId) -> Result<PathBuf, ManifestError> {
        let node = self.nodes.get(id.0).ok_or_else(|| {
            ManifestError::malformed(format!("node #{} does not exist", id.0))
        })?;
        let Some(leaf_name) = node.name() else {
            return Ok(PathBuf::new());
        };

        let mut segments = vec![checked_segment(leaf_name)?];
        let mut current = parent_of(node);

        // A valid chain visits each node at most once.
        for _ in 0..self.nodes.len() {
            match current.and_then(|p| self.nodes.get(p.0)) {
                Some(ManifestNode::Program) => {
                    segments.reverse();
                    return Ok(segments.iter().collect());
                }
                Some(ManifestNode::Directory(dir)) => {
                    segments.push(checked_segment(&dir.name)?);
                    current = Some(dir.parent);
                }
                Some(ManifestNode::File(_)) | None => break,
            }
        }

        Err(ManifestError::DanglingParent {
            name: leaf_name.to_string(),
        })
    }

    /// Canonical local path of a node under `install_dir`.
    pub fn local_path(&self, id: NodeId, install_dir: &Path) -> Result<PathBuf, ManifestError> {
        Ok(install_dir.join(self.relative_path(id)?))
    }
}

const fn parent_of(node: &ManifestNode) -> Option<NodeId> {
    match node {
        ManifestNode::Program => None,
        ManifestNode::Directory(dir) => Some(dir.parent),
        ManifestNode::File(file) => Some(file.parent),
    }
}

/// Reject names that would escape or alias their directory.
fn checked_segment(name: &str) -> Result<&str, ManifestError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0');
    if invalid {
        return Err(ManifestError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(name)
}

/// Incremental constructor for a [`Manifest`].
///
/// The builder does not validate parent links; broken chains surface when
/// paths are derived.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    meta: ManifestMeta,
    nodes: Vec<ManifestNode>,
}

impl ManifestBuilder {
    /// Start a manifest containing only the program root.
    pub fn new(meta: ManifestMeta) -> Self {
        Self {
            meta,
            nodes: vec![ManifestNode::Program],
        }
    }

    /// Declare a directory under `parent`.
    pub fn directory(&mut self, parent: NodeId, name: impl Into<String>, allow_unlisted: bool) -> NodeId {
        self.push(ManifestNode::Directory(DirectoryNode {
            name: name.into(),
            allow_unlisted,
            parent,
        }))
    }

    /// Declare a file under `parent`.
    ///
    /// An empty `digest` means the file is trusted once present.
    pub fn file(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        required: bool,
        source_url: impl Into<String>,
        digest: Option<&str>,
    ) -> NodeId {
        self.push(ManifestNode::File(FileNode {
            name: name.into(),
            required,
            source_url: source_url.into(),
            digest_required: digest.is_some(),
            digest: digest.unwrap_or_default().to_string(),
            parent,
        }))
    }

    fn push(&mut self, node: ManifestNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Finish construction.
    pub fn build(self) -> Manifest {
        Manifest {
            meta: self.meta,
            nodes: self.nodes,
        }
    }
}
