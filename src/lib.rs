//! Maglev consistent hashing.
//!
//! A [`Maglev`] table maps arbitrary keys onto a set of named backend nodes, so that a load
//! balancer or router can pick a destination without coordinating with the backends:
//!
//! - the same key maps to the same node for as long as the node set is unchanged,
//! - every node owns an almost equal share of the table,
//! - adding or removing a single node moves only a small fraction of keys.
//!
//! ```
//! use maglev::Maglev;
//!
//! let mut table = Maglev::new(vec!["backend1", "backend2", "backend3"], 7);
//! let owner = table.get("Key")?.to_string();
//!
//! table.add_node("backend4")?;
//! assert_eq!(table.get("Key")?, owner);
//! # Ok::<(), maglev::Error>(())
//! ```
//!
//! The table size should be prime, and a good deal larger than the number of nodes;
//! [`DEFAULT_TABLE_SIZE`] is a reasonable choice for up to a few hundred nodes. The table does no
//! I/O and no internal locking: wrap it in a lock, or use [`SharedMaglev`] to rebuild off to the
//! side while readers keep querying the previous table.
#![deny(warnings, missing_docs)]

mod error;
pub use self::error::Error;

pub mod hash;
pub use self::hash::{Blake3, Crc64, HashFunction};

mod maglev;
pub use self::maglev::{is_prime, Maglev, DEFAULT_TABLE_SIZE};

pub mod permutation;
pub use self::permutation::Permutation;

mod populate;

mod shared;
pub use self::shared::SharedMaglev;
