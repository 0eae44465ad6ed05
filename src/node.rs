use std::fmt::{self, Debug, Display, Formatter};

use crate::error::{Error, Result};

pub struct Node<T> {
    pub slot_id: usize,
    pub height: usize,
    pub parent: usize,
    pub keys: Vec<T>,
    pub children: Vec<usize>,
}

impl<T> Node<T> {
    // Allocate a node able to hold one key (and one child) more than the order
    // allows, so a full node can take the incoming entry before it is split.
    pub fn new(order: usize, height: usize, parent: usize) -> Result<Node<T>> {
        let mut keys = Vec::new();
        keys.try_reserve_exact(order)?;
        let mut children = Vec::new();
        if height > 0 {
            children.try_reserve_exact(order.checked_add(1).ok_or(Error::OutOfMemory)?)?;
        }
        Ok(Node {
            slot_id: usize::MAX,
            height,
            parent,
            keys,
            children,
        })
    }

    pub fn is_leaf(&self) -> bool {
        self.height == 0
    }

    // Position of the first key not less than `elem`, and whether that key is
    // equivalent to `elem`. An empty node yields (0, false).
    pub fn search<L>(&self, elem: &T, less: &L) -> (usize, bool)
    where
        L: Fn(&T, &T) -> bool,
    {
        self.search_by(|key| less(key, elem), |key| less(elem, key))
    }

    // Same as `search` for a probe known only through `before(key)` (key < probe)
    // and `after(key)` (probe < key).
    pub fn search_by<B, A>(&self, before: B, after: A) -> (usize, bool)
    where
        B: Fn(&T) -> bool,
        A: Fn(&T) -> bool,
    {
        let pos = self
            .keys
            .iter()
            .position(|key| !before(key))
            .unwrap_or(self.keys.len());
        let found = pos < self.keys.len() && !after(&self.keys[pos]);
        (pos, found)
    }
}

impl<T: Debug> Display for Node<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{},{},{},{:?},{:?}",
            self.slot_id, self.height, self.parent as isize, self.keys, self.children
        )
    }
}
