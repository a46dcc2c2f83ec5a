//! The basename-bucketed hash table of nodes.

use catalyze_arena::{Arena, ArenaStats};
use catalyze_common::{basename, hash_path, Fingerprint};
use tracing::debug;

use crate::error::StoreError;
use crate::node::{NodeId, NodeRecord, NodeRef};

/// Initial size of every node's dependency array. Doubles when full.
pub const INITIAL_DEP_CAPACITY: usize = 2;

/// Size in bytes of one dependency slot in the arena.
const DEP_SLOT_BYTES: usize = std::mem::size_of::<u32>();

/// What happens to existing chains when the bucket array doubles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Extend the bucket array with empty buckets and leave every existing
    /// node where it is. A node whose masked hash changes with the wider mask
    /// is no longer reachable through [`NodeStore::lookup`]; a later upsert of
    /// the same path then creates a second node for it.
    #[default]
    Preserve,
    /// Redistribute every node into the bucket its hash selects under the new
    /// mask, keeping relative chain order.
    Rehash,
}

/// Result of [`NodeStore::add_edge`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeInsert {
    /// The edge was appended.
    Added,
    /// The edge already existed; nothing changed.
    AlreadyPresent,
}

impl EdgeInsert {
    /// Returns `true` if a new edge was appended.
    pub fn is_added(self) -> bool {
        matches!(self, EdgeInsert::Added)
    }
}

/// Hash table of tracked files keyed by path and bucketed by basename.
///
/// The bucket array length is always a power of two so a bucket is selected
/// by masking. Each bucket is a list of node ids; the most recently inserted
/// node is the head of its chain. When the node count reaches the bucket
/// count the array doubles according to the store's [`GrowthPolicy`].
///
/// The store is single-writer: all mutation goes through `&mut self`.
pub struct NodeStore {
    arena: Arena,
    nodes: Vec<NodeRecord>,
    /// Chains stored tail-first: the last element is the chain head.
    buckets: Vec<Vec<NodeId>>,
    policy: GrowthPolicy,
}

impl NodeStore {
    /// Creates a store with a default-sized arena.
    ///
    /// `capacity_hint` is rounded up to the next power of two (minimum 1).
    pub fn new(capacity_hint: usize) -> Result<Self, StoreError> {
        Self::with_arena(Arena::default(), capacity_hint)
    }

    /// Creates a store that draws all node data from `arena`.
    pub fn with_arena(arena: Arena, capacity_hint: usize) -> Result<Self, StoreError> {
        let capacity = capacity_hint
            .max(1)
            .checked_next_power_of_two()
            .ok_or(StoreError::CapacityOverflow {
                requested: capacity_hint,
            })?;
        let buckets = empty_buckets(capacity)?;
        Ok(Self {
            arena,
            nodes: Vec::new(),
            buckets,
            policy: GrowthPolicy::default(),
        })
    }

    /// Sets the policy applied when the bucket array grows.
    pub fn with_growth_policy(mut self, policy: GrowthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The policy applied when the bucket array grows.
    pub fn growth_policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Number of nodes stored.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the store holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current length of the bucket array (always a power of two).
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of edges across all nodes.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.dep_count).sum()
    }

    /// Usage counters of the backing arena.
    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// The bucket `path` hashes to under the current mask.
    ///
    /// Depends only on the basename of `path`.
    pub fn bucket_of(&self, path: &str) -> usize {
        hash_path(path) as usize & (self.buckets.len() - 1)
    }

    /// Finds the node whose full path equals `path`.
    ///
    /// Walks the chain of `path`'s bucket head-first and returns the first
    /// exact match. Does not allocate.
    pub fn lookup(&self, path: &str) -> Option<NodeId> {
        self.buckets[self.bucket_of(path)]
            .iter()
            .rev()
            .copied()
            .find(|&id| self.arena.get_str(self.record(id).path) == path)
    }

    /// Inserts `path` or updates its fingerprint.
    ///
    /// An existing node keeps its id and edges; only `content_hash` is
    /// overwritten. A new node is linked at the head of its bucket chain, after
    /// the bucket array has been doubled if it was full.
    pub fn upsert(&mut self, path: &str, content_hash: Fingerprint) -> Result<NodeId, StoreError> {
        if let Some(id) = self.lookup(path) {
            self.nodes[id.index()].content_hash = content_hash;
            return Ok(id);
        }
        self.insert_new(path, content_hash)
    }

    /// Returns the node for `path`, creating it with [`Fingerprint::UNKNOWN`]
    /// if absent. An existing node's fingerprint is left untouched.
    pub fn get_or_insert(&mut self, path: &str) -> Result<NodeId, StoreError> {
        match self.lookup(path) {
            Some(id) => Ok(id),
            None => self.insert_new(path, Fingerprint::UNKNOWN),
        }
    }

    /// Records that `from_path` includes `to_path`.
    ///
    /// Either endpoint is created on demand. A repeated edge is a no-op. If
    /// growing `from`'s dependency array fails, both endpoints stay in the
    /// store and `from` keeps the edges it already had.
    pub fn add_edge(&mut self, from_path: &str, to_path: &str) -> Result<EdgeInsert, StoreError> {
        let from = self.get_or_insert(from_path)?;
        let to = self.get_or_insert(to_path)?;
        self.add_edge_ids(from, to)
    }

    /// Appends `to` to `from`'s dependencies unless already present.
    ///
    /// # Panics
    ///
    /// Panics if either id was not issued by this store.
    pub fn add_edge_ids(&mut self, from: NodeId, to: NodeId) -> Result<EdgeInsert, StoreError> {
        assert!(to.index() < self.nodes.len(), "unknown node {to}");
        if self.node(from).depends_on(to) {
            return Ok(EdgeInsert::AlreadyPresent);
        }

        let record = &self.nodes[from.index()];
        let (mut deps, count, mut capacity) = (record.deps, record.dep_count, record.dep_capacity);
        if count == capacity {
            let grown = capacity * 2;
            deps = self
                .arena
                .realloc(deps, grown * DEP_SLOT_BYTES)
                .ok_or_else(|| self.exhausted(grown * DEP_SLOT_BYTES))?;
            capacity = grown;
        }

        self.arena.write_u32(deps, count, to.as_raw());
        let record = &mut self.nodes[from.index()];
        record.deps = deps;
        record.dep_capacity = capacity;
        record.dep_count = count + 1;
        Ok(EdgeInsert::Added)
    }

    /// Finds a node by basename alone, in any directory.
    ///
    /// Scans every bucket in index order and each chain head-first, returning
    /// the first node whose basename equals `name`. When several directories
    /// hold a file of that name the winner is whichever this scan meets
    /// first: within one chain that is the most recently inserted node.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.scan_order()
            .find(|&id| self.arena.get_str(self.record(id).name) == name)
    }

    /// Node ids in bucket-scan order: buckets by index, chains head-first.
    pub fn scan_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.buckets
            .iter()
            .flat_map(|chain| chain.iter().rev().copied())
    }

    /// Node ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId::from_raw)
    }

    /// Returns a view of node `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this store.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.index() < self.nodes.len(), "unknown node {id}");
        NodeRef { store: self, id }
    }

    /// Returns a view of node `id`, or `None` if it does not exist.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.index() < self.nodes.len()).then_some(NodeRef { store: self, id })
    }

    /// Convenience: the view of the node at `path`, if reachable.
    pub fn get_path(&self, path: &str) -> Option<NodeRef<'_>> {
        self.lookup(path).map(|id| NodeRef { store: self, id })
    }

    pub(crate) fn record(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[id.index()]
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.arena
    }

    fn insert_new(&mut self, path: &str, content_hash: Fingerprint) -> Result<NodeId, StoreError> {
        if self.nodes.len() == self.buckets.len() {
            self.grow()?;
        }

        let record = self.create_record(path, content_hash)?;
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(record);
        let bucket = self.bucket_of(path);
        self.buckets[bucket].push(id);
        Ok(id)
    }

    fn create_record(&mut self, path: &str, content_hash: Fingerprint) -> Result<NodeRecord, StoreError> {
        let path_ref = self
            .arena
            .strdup(path)
            .ok_or_else(|| self.exhausted(path.len()))?;
        let name = basename(path);
        let name_ref = self
            .arena
            .strdup(name)
            .ok_or_else(|| self.exhausted(name.len()))?;
        let deps = self
            .arena
            .alloc_zeroed_array(DEP_SLOT_BYTES, INITIAL_DEP_CAPACITY)
            .ok_or_else(|| self.exhausted(DEP_SLOT_BYTES * INITIAL_DEP_CAPACITY))?;
        Ok(NodeRecord {
            path: path_ref,
            name: name_ref,
            content_hash,
            deps,
            dep_count: 0,
            dep_capacity: INITIAL_DEP_CAPACITY,
        })
    }

    fn grow(&mut self) -> Result<(), StoreError> {
        let old = self.buckets.len();
        let new = old
            .checked_mul(2)
            .ok_or(StoreError::CapacityOverflow { requested: old })?;

        match self.policy {
            GrowthPolicy::Preserve => {
                self.buckets
                    .try_reserve_exact(new - old)
                    .map_err(|_| StoreError::CapacityOverflow { requested: new })?;
                self.buckets.resize_with(new, Vec::new);
            }
            GrowthPolicy::Rehash => {
                let mut buckets = empty_buckets(new)?;
                // Insertion order keeps each chain's head the newest node.
                for id in (0..self.nodes.len() as u32).map(NodeId::from_raw) {
                    let path = self.arena.get_str(self.nodes[id.index()].path);
                    buckets[hash_path(path) as usize & (new - 1)].push(id);
                }
                self.buckets = buckets;
            }
        }

        debug!(from = old, to = new, policy = ?self.policy, "node store buckets grown");
        Ok(())
    }

    fn exhausted(&self, requested: usize) -> StoreError {
        StoreError::ArenaExhausted {
            requested,
            remaining: self.arena.remaining(),
        }
    }
}

/// A bucket array of `count` empty chains. Fails instead of aborting when
/// the allocation cannot be made.
fn empty_buckets(count: usize) -> Result<Vec<Vec<NodeId>>, StoreError> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(count)
        .map_err(|_| StoreError::CapacityOverflow { requested: count })?;
    buckets.resize_with(count, Vec::new);
    Ok(buckets)
}
