use std::{fmt::Debug, mem::size_of};

use tracing::{debug, trace};

use crate::{
    error::{Error, Result},
    index::Index,
    node::Node,
};

/// Smallest branching order a set accepts.
pub const MIN_ORDER: usize = 2;

/// Branching order used by [`Set::default`].
pub const DEFAULT_ORDER: usize = 16;

/// Ordered set backed by a B-tree of a fixed branching order.
///
/// Elements are ordered by a caller-supplied strict weak ordering `less(a, b)`.
/// Two elements are equivalent when neither is less than the other, and the
/// set never holds two equivalent elements.
pub struct Set<T, L = fn(&T, &T) -> bool> {
    order: usize,
    less: L,
    root: usize,
    len: usize,
    index: Index<T>,
}

fn ascending<T: Ord>(a: &T, b: &T) -> bool {
    a < b
}

impl<T: Ord> Set<T> {
    /// Creates an empty set ordered by `T`'s own `Ord`.
    pub fn with_order(order: usize) -> Result<Self> {
        Set::new(order, ascending::<T> as fn(&T, &T) -> bool)
    }
}

impl<T: Ord> Default for Set<T> {
    fn default() -> Self {
        Set::with_order(DEFAULT_ORDER).expect("Invalid order")
    }
}

impl<T, L> Set<T, L>
where
    L: Fn(&T, &T) -> bool,
{
    /// Creates an empty set whose nodes hold at most `order` children.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is below [`MIN_ORDER`].
    pub fn new(order: usize, less: L) -> Result<Self> {
        if order < MIN_ORDER {
            return Err(Error::InvalidOrder(order));
        }
        Ok(Set {
            order,
            less,
            root: usize::MAX,
            len: 0,
            index: Index::new(),
        })
    }

    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Maximum number of keys a node holds.
    #[must_use]
    pub fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Minimum number of keys every node but the root holds.
    #[must_use]
    pub fn min_keys(&self) -> usize {
        (self.order - 1) / 2
    }

    /// Byte stride of one stored element.
    #[must_use]
    pub fn element_size(&self) -> usize {
        size_of::<T>()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels in the tree, 0 for an empty set.
    #[must_use]
    pub fn height(&self) -> usize {
        self.index
            .nodes
            .get(self.root)
            .map_or(0, |node| node.height + 1)
    }

    #[must_use]
    pub fn contains(&self, elem: &T) -> bool {
        self.get(elem).is_some()
    }

    /// Returns the stored element equivalent to `elem`, if any.
    #[must_use]
    pub fn get(&self, elem: &T) -> Option<&T> {
        let less = &self.less;
        self.find(|key| less(key, elem), |key| less(elem, key))
    }

    // Descend from the root toward a probe described by `before(key)` (key
    // sorts before the probe) and `after(key)` (key sorts after it).
    pub(crate) fn find<B, A>(&self, before: B, after: A) -> Option<&T>
    where
        B: Fn(&T) -> bool,
        A: Fn(&T) -> bool,
    {
        let mut node_id = self.root;
        while let Some(node) = self.index.nodes.get(node_id) {
            let (pos, found) = node.search_by(&before, &after);
            if found {
                return Some(&node.keys[pos]);
            }
            if node.is_leaf() {
                return None;
            }
            node_id = node.children[pos];
        }
        None
    }

    /// Looks up `elem` and, when an equivalent element is stored and `copy_out`
    /// is given, copies the stored element into it. On a miss `copy_out` is
    /// left untouched.
    pub fn contains_copy(&self, elem: &T, copy_out: Option<&mut T>) -> bool
    where
        T: Clone,
    {
        match self.get(elem) {
            Some(stored) => {
                if let Some(out) = copy_out {
                    out.clone_from(stored);
                }
                true
            }
            None => false,
        }
    }

    /// Inserts `elem`. Returns `Ok(false)` without touching the tree when an
    /// equivalent element is already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the nodes needed by the insertion
    /// cannot be allocated. The set is left unchanged in that case.
    pub fn insert(&mut self, elem: T) -> Result<bool> {
        if self.root == usize::MAX {
            self.index.reserve(1)?;
            let mut root = Node::new(self.order, 0, usize::MAX)?;
            root.keys.push(elem);
            self.root = self.index.insert(root);
            self.len = 1;
            return Ok(true);
        }

        // Descend to the target leaf, remembering the position taken at each level
        let mut path = Vec::new();
        let mut node_id = self.root;
        loop {
            let node = &self.index.nodes[node_id];
            let (pos, found) = node.search(&elem, &self.less);
            if found {
                trace!(node = node_id, "equivalent element already stored");
                return Ok(false);
            }
            path.try_reserve(1)?;
            path.push((node_id, pos));
            if node.is_leaf() {
                break;
            }
            node_id = node.children[pos];
        }

        // Every full node from the leaf upward splits; allocate their siblings
        // (and a new root if the chain reaches the top) before mutating anything.
        let max_keys = self.max_keys();
        let splits = path
            .iter()
            .rev()
            .take_while(|(slot_id, _)| self.index.nodes[*slot_id].keys.len() == max_keys)
            .count();
        let grows = splits == path.len();
        let mut spare = Vec::new();
        spare.try_reserve_exact(splits + usize::from(grows))?;
        for (slot_id, _) in path.iter().rev().take(splits) {
            let height = self.index.nodes[*slot_id].height;
            spare.push(Node::new(self.order, height, usize::MAX)?);
        }
        if grows {
            let height = self.index.nodes[self.root].height + 1;
            spare.push(Node::new(self.order, height, usize::MAX)?);
        }
        self.index.reserve(spare.len())?;
        let mut spare = spare.into_iter();

        let mut entry = elem;
        let mut right_child = usize::MAX;
        while let Some((slot_id, pos)) = path.pop() {
            if !self.insert_in_node(slot_id, pos, entry, right_child) {
                break;
            }
            let Some(sibling) = spare.next() else {
                unreachable!("split without a preallocated sibling");
            };
            let (median, sibling_id) = self.split(slot_id, sibling);
            if path.is_empty() {
                let Some(root) = spare.next() else {
                    unreachable!("root split without a preallocated root");
                };
                self.grow(root, median, sibling_id);
                break;
            }
            entry = median;
            right_child = sibling_id;
        }

        self.len += 1;
        Ok(true)
    }

    // Place `elem` at `pos` and, for internal nodes, `right_child` just after it.
    // Returns true if the node now holds more keys than allowed.
    fn insert_in_node(&mut self, slot_id: usize, pos: usize, elem: T, right_child: usize) -> bool {
        let max_keys = self.max_keys();
        let node = &mut self.index.nodes[slot_id];
        node.keys.insert(pos, elem);
        if !node.is_leaf() {
            node.children.insert(pos + 1, right_child);
        }
        node.keys.len() > max_keys
    }

    // Split an overflowing node of `order` keys. The left half keeps
    // ceil((order - 1) / 2) keys, the next key is returned as the median and the
    // rest moves into `sibling`, along with the matching children.
    fn split(&mut self, slot_id: usize, mut sibling: Node<T>) -> (T, usize) {
        let left_len = (self.max_keys() + 1) / 2;
        let node = &mut self.index.nodes[slot_id];
        sibling.keys.extend(node.keys.drain(left_len + 1..));
        let median = node.keys.remove(left_len);
        if !node.is_leaf() {
            sibling.children.extend(node.children.drain(left_len + 1..));
        }
        sibling.parent = node.parent;
        let sibling_id = self.index.insert(sibling);

        // Update parent of the moved children
        for i in 0..self.index.nodes[sibling_id].children.len() {
            let child_id = self.index.nodes[sibling_id].children[i];
            self.index.nodes[child_id].parent = sibling_id;
        }

        debug!(
            node = slot_id,
            sibling = sibling_id,
            left = left_len,
            right = self.index.nodes[sibling_id].keys.len(),
            "split node"
        );
        (median, sibling_id)
    }

    // Promote `median` into a new root above the old root and its new sibling.
    fn grow(&mut self, mut root: Node<T>, median: T, sibling_id: usize) {
        let old_root = self.root;
        root.keys.push(median);
        root.children.push(old_root);
        root.children.push(sibling_id);
        let root_id = self.index.insert(root);
        self.index.nodes[old_root].parent = root_id;
        self.index.nodes[sibling_id].parent = root_id;
        self.root = root_id;
        debug!(root = root_id, height = self.height(), "promoted new root");
    }

    /// Calls `visitor` on every element in ascending order, passing `context`
    /// along. The visitor may change elements in place as long as their
    /// relative order is unchanged.
    pub fn map<C, F>(&mut self, mut visitor: F, context: &mut C)
    where
        F: FnMut(&mut T, &mut C),
    {
        let mut stack = self.walk_stack();
        while let Some((slot_id, key)) = next_in_order(&self.index.nodes, &mut stack) {
            visitor(&mut self.index.nodes[slot_id].keys[key], context);
        }
    }

    /// Calls `visitor` on every element in ascending order.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&T),
    {
        let mut stack = self.walk_stack();
        while let Some((slot_id, key)) = next_in_order(&self.index.nodes, &mut stack) {
            visitor(&self.index.nodes[slot_id].keys[key]);
        }
    }

    fn walk_stack(&self) -> Vec<(usize, usize)> {
        let mut stack = Vec::new();
        if self.root != usize::MAX {
            stack.push((self.root, 0));
        }
        stack
    }

    /// Releases every node and element. The set stays usable and empty.
    pub fn clear(&mut self) {
        let released = self.index.release(self.root);
        trace!(nodes = released, elements = self.len, "released tree");
        self.root = usize::MAX;
        self.len = 0;
    }

    /// One row per node, root level first. Each row reads
    /// `slot,height,parent,[keys],[children]` with `-1` for the root's parent.
    #[must_use]
    pub fn nodes_to_string_rows(&self) -> Vec<String>
    where
        T: Debug,
    {
        let mut rows = Vec::new();
        for h in (0..self.height()).rev() {
            for node in &self.index.nodes {
                if node.height == h {
                    rows.push(node.to_string());
                }
            }
        }
        rows
    }
}

// Advance an in-order walk. A stack entry `(slot, i)` for an internal node means
// key `i - 1` is next, followed by child `i`; for a leaf it means key `i` is next.
fn next_in_order<T>(nodes: &[Node<T>], stack: &mut Vec<(usize, usize)>) -> Option<(usize, usize)> {
    while let Some((slot_id, i)) = stack.pop() {
        let node = &nodes[slot_id];
        if node.is_leaf() {
            if i < node.keys.len() {
                stack.push((slot_id, i + 1));
                return Some((slot_id, i));
            }
            continue;
        }
        if i < node.children.len() {
            stack.push((slot_id, i + 1));
            stack.push((node.children[i], 0));
        }
        if i > 0 && i - 1 < node.keys.len() {
            return Some((slot_id, i - 1));
        }
    }
    None
}
