//! Node identifiers, node records, and borrowed node views.

use std::fmt;

use catalyze_arena::ArenaRef;
use catalyze_common::Fingerprint;

use crate::store::NodeStore;

/// Stable index of a node within its [`NodeStore`].
///
/// Ids are dense and assigned in insertion order starting at 0. They are
/// only meaningful for the store that issued them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a `NodeId` from a raw index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns the index as a `usize`, for slicing.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-node storage. Strings and the dependency array live in the arena.
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub(crate) path: ArenaRef,
    pub(crate) name: ArenaRef,
    pub(crate) content_hash: Fingerprint,
    /// `dep_capacity` little-endian `u32` node indices.
    pub(crate) deps: ArenaRef,
    pub(crate) dep_count: usize,
    pub(crate) dep_capacity: usize,
}

/// A borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    pub(crate) store: &'a NodeStore,
    pub(crate) id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn record(&self) -> &'a NodeRecord {
        self.store.record(self.id)
    }

    /// The node's id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Full path, exactly as first inserted.
    pub fn path(&self) -> &'a str {
        self.store.arena().get_str(self.record().path)
    }

    /// Basename of the path.
    pub fn name(&self) -> &'a str {
        self.store.arena().get_str(self.record().name)
    }

    /// Most recently recorded fingerprint; [`Fingerprint::UNKNOWN`] for
    /// nodes created only as include targets.
    pub fn content_hash(&self) -> Fingerprint {
        self.record().content_hash
    }

    /// Number of outgoing include edges.
    pub fn dep_count(&self) -> usize {
        self.record().dep_count
    }

    /// Current size of the dependency array.
    pub fn dep_capacity(&self) -> usize {
        self.record().dep_capacity
    }

    /// Direct dependencies in the order they were added.
    pub fn dependencies(&self) -> impl Iterator<Item = NodeId> + 'a {
        let record = self.record();
        let arena = self.store.arena();
        (0..record.dep_count).map(move |i| NodeId(arena.read_u32(record.deps, i)))
    }

    /// Returns `true` if this node has a direct edge to `target`.
    pub fn depends_on(&self, target: NodeId) -> bool {
        self.dependencies().any(|d| d == target)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("path", &self.path())
            .field("content_hash", &self.content_hash())
            .field("dep_count", &self.dep_count())
            .finish()
    }
}
