use std::rc::Rc;

use crate::{
    error::{Error, Result},
    set::Set,
};

type Block = Box<[u8]>;

type BlockLess = Box<dyn Fn(&Block, &Block) -> bool>;

/// Ordered set of opaque byte blocks of one fixed size.
///
/// The set never looks inside a block; ordering comes entirely from the
/// `less` predicate given at construction.
pub struct BlockSet<L> {
    element_size: usize,
    less: Rc<L>,
    set: Set<Block, BlockLess>,
}

impl<L> BlockSet<L>
where
    L: Fn(&[u8], &[u8]) -> bool + 'static,
{
    /// Creates an empty set of `element_size`-byte blocks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOrder`] if `order` is below 2.
    pub fn new(order: usize, element_size: usize, less: L) -> Result<Self> {
        let less = Rc::new(less);
        let shared = Rc::clone(&less);
        let block_less: BlockLess = Box::new(move |a: &Block, b: &Block| (*shared)(a, b));
        Ok(BlockSet {
            element_size,
            less,
            set: Set::new(order, block_less)?,
        })
    }

    #[must_use]
    pub fn order(&self) -> usize {
        self.set.order()
    }

    #[must_use]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.set.height()
    }

    fn check(&self, block: &[u8]) -> Result<()> {
        if block.len() == self.element_size {
            Ok(())
        } else {
            Err(Error::ElementSize {
                expected: self.element_size,
                got: block.len(),
            })
        }
    }

    /// Copies `elem` into the set. Returns `Ok(false)` if an equivalent block
    /// is already stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementSize`] if `elem` is not exactly one element long,
    /// or [`Error::OutOfMemory`] if storage for it cannot be allocated.
    pub fn insert(&mut self, elem: &[u8]) -> Result<bool> {
        self.check(elem)?;
        let mut block = Vec::new();
        block.try_reserve_exact(elem.len())?;
        block.extend_from_slice(elem);
        self.set.insert(block.into_boxed_slice())
    }

    /// Looks up `elem`; on a hit the stored block is copied into `copy_out`
    /// when one is given. On a miss `copy_out` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ElementSize`] if `elem` or `copy_out` is not exactly
    /// one element long.
    pub fn contains(&self, elem: &[u8], copy_out: Option<&mut [u8]>) -> Result<bool> {
        self.check(elem)?;
        if let Some(out) = &copy_out {
            self.check(out)?;
        }
        let less = &*self.less;
        let stored = self
            .set
            .find(|key| less(key, elem), |key| less(elem, key));
        match (stored, copy_out) {
            (Some(stored), Some(out)) => {
                out.copy_from_slice(stored);
                Ok(true)
            }
            (stored, _) => Ok(stored.is_some()),
        }
    }

    /// Calls `visitor` on every block in ascending order with `context`. The
    /// visitor may rewrite bytes that do not take part in the ordering.
    pub fn map<C, F>(&mut self, mut visitor: F, context: &mut C)
    where
        F: FnMut(&mut [u8], &mut C),
    {
        self.set.map(|block, context| visitor(block, context), context);
    }

    /// Calls `visitor` on every block in ascending order.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&[u8]),
    {
        self.set.for_each(|block| visitor(block));
    }

    /// Releases every stored block.
    pub fn clear(&mut self) {
        self.set.clear();
    }
}
