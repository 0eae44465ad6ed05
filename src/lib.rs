mod block;
mod error;
mod index;
mod node;
mod set;

pub use block::BlockSet;
pub use error::{Error, Result};
pub use set::{Set, DEFAULT_ORDER, MIN_ORDER};
