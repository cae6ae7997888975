//! The Maglev lookup table. Every membership change rebuilds the whole table.

use std::fmt;

use fxhash::FxHashMap;
use itertools::{Itertools, MinMaxResult};
use tracing::{debug, warn};

use crate::error::Error;
use crate::hash::{Crc64, HashFunction, OFFSET_SALT};
use crate::permutation;
use crate::populate::{populate, UNASSIGNED};

/// A prime table size suitable for up to a few hundred nodes.
pub const DEFAULT_TABLE_SIZE: usize = 65537;

/// Maglev consistent hashing table.
///
/// Maps keys to one of a set of named nodes through a fixed-size lookup table. The table size
/// should be prime and comfortably larger than the number of nodes; neither is checked unless
/// the table is built with [`Maglev::try_new`] or [`Maglev::try_with_hasher`].
///
/// Lookups take `&self` and mutations take `&mut self`, so sharing a table between threads needs
/// either a lock around it or a copy-on-write handle such as [`SharedMaglev`](crate::SharedMaglev).
#[derive(Clone)]
pub struct Maglev<H = Crc64> {
    nodes: Vec<String>,
    positions: FxHashMap<String, usize>,
    table_size: usize,
    permutations: Vec<Vec<usize>>,
    lookup: Vec<usize>,
    hasher: H,
}

impl Maglev<Crc64> {
    /// Creates a new [`Maglev`] table over `nodes`, with `table_size` slots and the default
    /// [`Crc64`] hash function.
    ///
    /// Node order matters: earlier nodes win ties when claiming slots. Duplicate identifiers are
    /// dropped, keeping the first occurrence.
    ///
    /// # Panics
    ///
    /// Panics if `table_size` is zero.
    pub fn new<S: AsRef<str>>(nodes: Vec<S>, table_size: usize) -> Maglev<Crc64> {
        Maglev::with_hasher(nodes, table_size, Crc64)
    }

    /// Like [`Maglev::new`], but fails if `table_size` is not prime or is smaller than the
    /// number of nodes.
    pub fn try_new<S: AsRef<str>>(nodes: Vec<S>, table_size: usize) -> Result<Maglev<Crc64>, Error> {
        Maglev::try_with_hasher(nodes, table_size, Crc64)
    }
}

impl<H: HashFunction> Maglev<H> {
    /// Creates a new [`Maglev`] table using the given hash function.
    ///
    /// # Panics
    ///
    /// Panics if `table_size` is zero.
    pub fn with_hasher<S: AsRef<str>>(nodes: Vec<S>, table_size: usize, hasher: H) -> Maglev<H> {
        assert!(table_size > 0, "maglev table size must be non-zero");

        let (nodes, positions) = dedup_nodes(nodes);
        Maglev::build(nodes, positions, table_size, hasher)
    }

    /// Like [`Maglev::with_hasher`], but fails if `table_size` is not prime or is smaller than
    /// the number of nodes.
    ///
    /// Only construction is checked: later membership changes are not revalidated.
    pub fn try_with_hasher<S: AsRef<str>>(
        nodes: Vec<S>,
        table_size: usize,
        hasher: H,
    ) -> Result<Maglev<H>, Error> {
        let (nodes, positions) = dedup_nodes(nodes);
        if !is_prime(table_size) || table_size < nodes.len() {
            return Err(Error::InvalidTableSize {
                table_size,
                nodes: nodes.len(),
            });
        }

        Ok(Maglev::build(nodes, positions, table_size, hasher))
    }

    /// Adds a node, then rebuilds the whole table.
    ///
    /// The node is appended, so it has the lowest priority when claiming slots. If the node is
    /// already present, [`Error::DuplicateNode`] is returned and the table is left unchanged.
    pub fn add_node<S: AsRef<str>>(&mut self, node: S) -> Result<(), Error> {
        let node = node.as_ref();
        if self.positions.contains_key(node) {
            return Err(Error::DuplicateNode(node.to_string()));
        }

        self.positions.insert(node.to_string(), self.nodes.len());
        self.nodes.push(node.to_string());
        self.rebuild();

        debug!(node, nodes = self.nodes.len(), "added node to maglev table");
        Ok(())
    }

    /// Removes a node, then rebuilds the whole table.
    ///
    /// The remaining nodes keep their relative order. If the node is not present,
    /// [`Error::NodeNotFound`] is returned and the table is left unchanged.
    pub fn remove_node<S: AsRef<str>>(&mut self, node: S) -> Result<(), Error> {
        let node = node.as_ref();
        let position = match self.positions.remove(node) {
            Some(position) => position,
            None => return Err(Error::NodeNotFound(node.to_string())),
        };

        self.nodes.remove(position);
        for (i, name) in self.nodes.iter().enumerate().skip(position) {
            self.positions.insert(name.clone(), i);
        }
        self.rebuild();

        debug!(node, nodes = self.nodes.len(), "removed node from maglev table");
        Ok(())
    }

    /// Returns the node that owns `key`.
    ///
    /// If the table has no nodes, [`Error::EmptyTable`] is returned.
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Result<&str, Error> {
        match self.node_index(&key) {
            Some(i) => Ok(&self.nodes[i]),
            None => Err(Error::EmptyTable {
                key: String::from_utf8_lossy(key.as_ref()).into_owned(),
            }),
        }
    }

    /// Returns the index, into [`Maglev::nodes`], of the node that owns `key`, or `None` if the
    /// table has no nodes.
    pub fn node_index<K: AsRef<[u8]>>(&self, key: K) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }

        Some(self.lookup[self.slot_index(key)])
    }

    /// Returns the slot `key` hashes to. This does not depend on the current nodes.
    pub fn slot_index<K: AsRef<[u8]>>(&self, key: K) -> usize {
        (self.hasher.hash(key.as_ref(), OFFSET_SALT) % self.table_size as u64) as usize
    }

    /// Groups keys by the node that owns them.
    ///
    /// The returned vector is parallel to [`Maglev::nodes`]: entry `i` holds the keys owned by
    /// node `i`, in the order they were given. If the table has no nodes and there is at least
    /// one key, [`Error::EmptyTable`] is returned for the first key.
    pub fn keys_by_node<I, K>(&self, keys: I) -> Result<Vec<Vec<K>>, Error>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        let mut keys_for_node: Vec<Vec<K>> = std::iter::repeat_with(Vec::new)
            .take(self.nodes.len())
            .collect();

        for key in keys {
            match self.node_index(&key) {
                Some(i) => keys_for_node[i].push(key),
                None => {
                    return Err(Error::EmptyTable {
                        key: String::from_utf8_lossy(key.as_ref()).into_owned(),
                    })
                }
            }
        }

        Ok(keys_for_node)
    }

    /// The number of slots each node owns, parallel to [`Maglev::nodes`].
    pub fn slot_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.nodes.len()];
        for &owner in self.lookup.iter().filter(|owner| **owner != UNASSIGNED) {
            counts[owner] += 1;
        }
        counts
    }

    /// The difference between the most and the least slots owned by any single node.
    ///
    /// With a prime table size at least as large as the node count this is at most 1.
    pub fn spread(&self) -> usize {
        match self.slot_counts().into_iter().minmax() {
            MinMaxResult::NoElements | MinMaxResult::OneElement(_) => 0,
            MinMaxResult::MinMax(min, max) => max - min,
        }
    }

    /// The nodes, in priority order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Whether `node` is a member of the table.
    pub fn contains<S: AsRef<str>>(&self, node: S) -> bool {
        self.positions.contains_key(node.as_ref())
    }

    /// The number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the table has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The number of slots in the lookup table.
    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// The lookup table: slot index to node index.
    ///
    /// Every entry is a valid index into [`Maglev::nodes`], unless the table has no nodes, in
    /// which case the entries are meaningless.
    pub fn lookup_table(&self) -> &[usize] {
        &self.lookup
    }

    /// Each node's slot preference list, parallel to [`Maglev::nodes`].
    pub fn permutations(&self) -> &[Vec<usize>] {
        &self.permutations
    }

    /// The hash function in use.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    fn build(
        nodes: Vec<String>,
        positions: FxHashMap<String, usize>,
        table_size: usize,
        hasher: H,
    ) -> Maglev<H> {
        let mut maglev = Maglev {
            nodes,
            positions,
            table_size,
            permutations: Vec::new(),
            lookup: Vec::new(),
            hasher,
        };
        maglev.rebuild();
        maglev
    }

    fn rebuild(&mut self) {
        self.permutations = permutation::generate(&self.hasher, &self.nodes, self.table_size);
        self.lookup = populate(&self.permutations, self.table_size);
    }
}

impl<H> fmt::Debug for Maglev<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Maglev")
            .field("nodes", &self.nodes)
            .field("table_size", &self.table_size)
            .finish_non_exhaustive()
    }
}

fn dedup_nodes<S: AsRef<str>>(nodes: Vec<S>) -> (Vec<String>, FxHashMap<String, usize>) {
    let mut unique = Vec::with_capacity(nodes.len());
    let mut positions = FxHashMap::default();
    for node in nodes {
        let node = node.as_ref();
        if positions.contains_key(node) {
            warn!(node, "ignoring duplicate node");
            continue;
        }
        positions.insert(node.to_string(), unique.len());
        unique.push(node.to_string());
    }
    (unique, positions)
}

/// Whether `n` is prime. Useful for picking a table size.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }

    let mut d = 3;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
