use thiserror::Error;

/// Result type alias for set operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by [`Set`](crate::Set) and [`BlockSet`](crate::BlockSet).
///
/// Inserting a duplicate or looking up a missing element is not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The branching order is below the minimum of 2
    #[error("invalid order {0}, a node needs room for at least 2 children")]
    InvalidOrder(usize),

    /// A node or the node arena could not be allocated
    #[error("out of memory while growing the tree")]
    OutOfMemory,

    /// A byte block does not match the stride the set was built with
    #[error("element size mismatch, expected {expected} bytes, got {got}")]
    ElementSize { expected: usize, got: usize },
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}
