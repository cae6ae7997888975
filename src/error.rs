use std::fmt;

/// Error type for [`Maglev`](crate::Maglev) operations.
///
/// None of these are fatal: an operation that returns an error leaves the table untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The node being added is already a member of the table.
    DuplicateNode(String),
    /// The node being removed is not a member of the table.
    NodeNotFound(String),
    /// A key was looked up while the table has no nodes.
    EmptyTable {
        /// The key that could not be resolved.
        key: String,
    },
    /// The table size failed the opt-in configuration check: it is either not prime, or smaller
    /// than the number of nodes.
    InvalidTableSize {
        /// The configured table size.
        table_size: usize,
        /// The number of nodes the table was built for.
        nodes: usize,
    },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DuplicateNode(node) => write!(f, "duplicate node: {}", node),
            Self::NodeNotFound(node) => write!(f, "node not found: {}", node),
            Self::EmptyTable { key } => write!(f, "empty table: no node for key `{}`", key),
            Self::InvalidTableSize { table_size, nodes } => write!(
                f,
                "invalid table size: {} must be prime and at least the node count ({})",
                table_size, nodes
            ),
        }
    }
}
