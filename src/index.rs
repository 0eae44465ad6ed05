use crate::{error::Result, node::Node};

/// Slot arena owning every node of one tree. Nodes refer to each other by slot id.
pub struct Index<T> {
    pub nodes: Vec<Node<T>>,
}

impl<T> Default for Index<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<T> {
    #[must_use]
    pub fn new() -> Self {
        Index { nodes: Vec::new() }
    }

    // Make room for `additional` nodes so that the following inserts cannot fail.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.nodes.try_reserve(additional)?;
        Ok(())
    }

    // Store a node in the next slot.
    pub fn insert(&mut self, mut node: Node<T>) -> usize {
        let slot_id = self.nodes.len();
        node.slot_id = slot_id;
        self.nodes.push(node);
        slot_id
    }

    // Release the tree below `root` bottom-up (children before their parent),
    // then drop every slot. Returns the number of nodes released.
    pub fn release(&mut self, root: usize) -> usize {
        let mut released = 0;
        if root < self.nodes.len() {
            let mut stack = vec![(root, false)];
            while let Some((slot_id, expanded)) = stack.pop() {
                if expanded {
                    let node = &mut self.nodes[slot_id];
                    drop(std::mem::take(&mut node.keys));
                    drop(std::mem::take(&mut node.children));
                    released += 1;
                } else {
                    stack.push((slot_id, true));
                    for &child_id in self.nodes[slot_id].children.iter().rev() {
                        stack.push((child_id, false));
                    }
                }
            }
        }
        self.nodes.clear();
        released
    }
}
