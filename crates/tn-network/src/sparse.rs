//! Block-allocated sparse array.
//!
//! # Data layout
//!
//! ```text
//! index i  →  blocks[i >> block_bits]  →  block[i & (block_size - 1)]
//! ```
//!
//! Blocks are allocated on the first non-default write.  Writing the default
//! value into an unallocated block does nothing, so huge index ranges (all
//! `4^14` tile slots of a zoom-14 network) cost one pointer per block until
//! data actually lands there.
//!
//! Blocks sit behind an `Arc`, so cloning the array is cheap and a writer
//! working on a clone copies only the blocks it touches.

use std::sync::Arc;

/// Default number of entries per block.
pub const DEFAULT_BLOCK_SIZE: usize = 1 << 16;

#[derive(Clone, Debug)]
pub struct SparseArray<T: Clone + PartialEq> {
    blocks: Vec<Option<Arc<Vec<T>>>>,
    block_bits: u32,
    length: i64,
    default: T,
}

impl<T: Clone + PartialEq> SparseArray<T> {
    /// Array of `length` default entries using [`DEFAULT_BLOCK_SIZE`] blocks.
    pub fn new(length: i64, default: T) -> Self {
        Self::with_block_size(length, DEFAULT_BLOCK_SIZE, default)
    }

    /// # Panics
    /// Panics if `block_size` is not a power of two or `length` is negative.
    pub fn with_block_size(length: i64, block_size: usize, default: T) -> Self {
        assert!(block_size.is_power_of_two(), "block size must be a power of two");
        assert!(length >= 0, "length must be non-negative");
        let block_bits = block_size.trailing_zeros();
        let mut array = Self { blocks: Vec::new(), block_bits, length: 0, default };
        array.resize(length);
        array
    }

    #[inline]
    pub fn len(&self) -> i64 {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        1 << self.block_bits
    }

    /// Number of blocks that hold allocated storage.
    pub fn allocated_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_some()).count()
    }

    #[inline]
    fn split(&self, index: i64) -> (usize, usize) {
        assert!(
            (0..self.length).contains(&index),
            "index {index} out of range for sparse array of length {}",
            self.length
        );
        let index = index as usize;
        (index >> self.block_bits, index & (self.block_size() - 1))
    }

    /// Value at `index`, or the default if nothing was written there.
    ///
    /// # Panics
    /// Panics if `index` is outside `0..len()`.
    pub fn get(&self, index: i64) -> &T {
        let (block, offset) = self.split(index);
        match &self.blocks[block] {
            Some(b) => &b[offset],
            None => &self.default,
        }
    }

    /// Write `value` at `index`.
    ///
    /// # Panics
    /// Panics if `index` is outside `0..len()`.
    pub fn set(&mut self, index: i64, value: T) {
        let (block, offset) = self.split(index);
        if self.blocks[block].is_none() && value == self.default {
            return;
        }
        *self.slot(block, offset) = value;
    }

    /// Mutable access to `index`, allocating its block if needed.
    ///
    /// # Panics
    /// Panics if `index` is outside `0..len()`.
    pub fn get_mut(&mut self, index: i64) -> &mut T {
        let (block, offset) = self.split(index);
        self.slot(block, offset)
    }

    fn slot(&mut self, block: usize, offset: usize) -> &mut T {
        let size = self.block_size();
        let default = &self.default;
        let block = self.blocks[block].get_or_insert_with(|| Arc::new(vec![default.clone(); size]));
        &mut Arc::make_mut(block)[offset]
    }

    /// Grow or shrink to `length` entries.
    ///
    /// Only the block-pointer array changes; no block is allocated.  Blocks
    /// entirely beyond the new length are dropped, and entries past the new
    /// length in the last kept block are reset to the default.
    pub fn resize(&mut self, length: i64) {
        assert!(length >= 0, "length must be non-negative");
        let size = self.block_size() as i64;
        let block_count = ((length + size - 1) / size) as usize;
        self.blocks.resize(block_count, None);

        if length < self.length && length % size != 0 {
            let tail = (length % size) as usize;
            let default = self.default.clone();
            if let Some(Some(last)) = self.blocks.last_mut() {
                for v in &mut Arc::make_mut(last)[tail..] {
                    *v = default.clone();
                }
            }
        }
        self.length = length;
    }

    /// All `(index, value)` pairs whose value differs from the default, in
    /// index order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &T)> + '_ {
        let bits = self.block_bits;
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(b, block)| block.as_ref().map(|block| (b, block)))
            .flat_map(move |(b, block)| {
                block
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| **v != self.default)
                    .map(move |(o, v)| ((((b as i64) << bits) | o as i64), v))
            })
    }
}
