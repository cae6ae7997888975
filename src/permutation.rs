//! Per-node slot preference lists.
//!
//! Each node scans the lookup table in its own order, starting at `offset` and stepping by
//! `skip`. When the table size `M` is prime, any `skip` in `[1, M)` is invertible modulo `M`, so
//! the scan visits every slot exactly once.

use crate::hash::{HashFunction, OFFSET_SALT, SKIP_SALT};

/// The preference order of a single node over the slots of a table of size `len`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Permutation {
    offset: usize,
    skip: usize,
    len: usize,
}

impl Permutation {
    /// Derives the permutation for `node` over a table of `table_size` slots.
    ///
    /// `table_size` must be non-zero.
    pub fn new<H: HashFunction + ?Sized>(hasher: &H, node: &[u8], table_size: usize) -> Self {
        let m = table_size as u64;
        let offset = hasher.hash(node, OFFSET_SALT) % m;
        // A table of one slot has nothing to skip over, and `m - 1` would be zero.
        let skip = if m > 1 {
            hasher.hash(node, SKIP_SALT) % (m - 1) + 1
        } else {
            1
        };

        Permutation {
            offset: offset as usize,
            skip: skip as usize,
            len: table_size,
        }
    }

    /// The first slot this node prefers.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The distance between consecutive preferred slots.
    pub fn skip(&self) -> usize {
        self.skip
    }

    /// The table size this permutation spans.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this permutation spans no slots at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The `j`th preferred slot: `(offset + j * skip) mod len`.
    pub fn get(&self, j: usize) -> usize {
        // Widened so `j * skip` cannot overflow for any table that fits in memory.
        ((self.offset as u128 + j as u128 * self.skip as u128) % self.len as u128) as usize
    }

    /// Iterates over all `len` preferred slots, in order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(move |j| self.get(j))
    }

    /// Materializes the full preference list.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

/// Generates the preference list of every node, in node order.
pub(crate) fn generate<H, S>(hasher: &H, nodes: &[S], table_size: usize) -> Vec<Vec<usize>>
where
    H: HashFunction + ?Sized,
    S: AsRef<str>,
{
    nodes
        .iter()
        .map(|node| Permutation::new(hasher, node.as_ref().as_bytes(), table_size).to_vec())
        .collect()
}
