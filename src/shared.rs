//! Copy-on-write sharing of a [`Maglev`] table between threads.
//!
//! Readers take a snapshot of the most recently published table, holding a read lock only long
//! enough to clone a pointer, and query it lock-free. Writers clone the current table, apply
//! their change to the clone and then publish it, so a rebuild never blocks lookups.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::error::Error;
use crate::hash::{Crc64, HashFunction};
use crate::maglev::Maglev;

/// A [`Maglev`] table that can be read and updated concurrently.
pub struct SharedMaglev<H = Crc64> {
    current: RwLock<Arc<Maglev<H>>>,
    // Serializes writers, so that no update is lost between cloning and publishing.
    writer: Mutex<()>,
}

impl<H: HashFunction + Clone> SharedMaglev<H> {
    /// Creates a new [`SharedMaglev`], publishing `maglev` as the initial table.
    pub fn new(maglev: Maglev<H>) -> SharedMaglev<H> {
        SharedMaglev {
            current: RwLock::new(Arc::new(maglev)),
            writer: Mutex::new(()),
        }
    }

    /// Returns a snapshot of the most recently published table.
    ///
    /// The snapshot is unaffected by later updates.
    pub fn load(&self) -> Arc<Maglev<H>> {
        self.current.read().clone()
    }

    /// Publishes `maglev`, replacing the current table.
    pub fn store(&self, maglev: Maglev<H>) {
        let _writer = self.writer.lock();
        self.publish(maglev);
    }

    /// Returns the node that owns `key` in the current table.
    ///
    /// This allocates the returned name. For hot paths, take a snapshot with
    /// [`SharedMaglev::load`] and call [`Maglev::get`] on it, which borrows instead.
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Result<String, Error> {
        self.load().get(key).map(str::to_string)
    }

    /// Adds a node and publishes the rebuilt table.
    ///
    /// On error, nothing is published.
    pub fn add_node<S: AsRef<str>>(&self, node: S) -> Result<(), Error> {
        self.update(|maglev| maglev.add_node(node))
    }

    /// Removes a node and publishes the rebuilt table.
    ///
    /// On error, nothing is published.
    pub fn remove_node<S: AsRef<str>>(&self, node: S) -> Result<(), Error> {
        self.update(|maglev| maglev.remove_node(node))
    }

    /// Applies `f` to a private copy of the current table, publishing the copy if `f` succeeds.
    pub fn update<F, T>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Maglev<H>) -> Result<T, Error>,
    {
        let _writer = self.writer.lock();

        let current = self.load();
        let mut next: Maglev<H> = (*current).clone();
        let result = f(&mut next)?;
        self.publish(next);

        Ok(result)
    }

    fn publish(&self, maglev: Maglev<H>) {
        let nodes = maglev.len();
        *self.current.write() = Arc::new(maglev);
        trace!(nodes, "published maglev table");
    }
}

impl<H: HashFunction + Clone> From<Maglev<H>> for SharedMaglev<H> {
    fn from(maglev: Maglev<H>) -> Self {
        SharedMaglev::new(maglev)
    }
}

impl<H> fmt::Debug for SharedMaglev<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMaglev")
            .field("current", &*self.current.read())
            .finish()
    }
}
