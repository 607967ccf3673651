//! Per-type memoization of profile results.
//!
//! A `FactorCache` is a plain growable array indexed by edge-type (or
//! turn-cost-type) id.  Entries are never invalidated individually: when the
//! network's type function changes, the type ids change meaning and the whole
//! cache must be replaced (see `ProfileHandler` in `tn-routing`, which keys
//! its caches on the type-function id).
//!
//! # Thread safety
//!
//! `set` may reallocate the backing vector, so a cache must not be written
//! from several threads at once.  Give every worker its own cache.

/// Backing array grows in steps of this many entries.
pub const CACHE_BLOCK_SIZE: usize = 1024;

/// Growable `type id → Option<T>` memo table.
#[derive(Clone, Debug)]
pub struct FactorCache<T: Copy> {
    entries: Vec<Option<T>>,
}

impl<T: Copy> FactorCache<T> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Cached value for `type_id`, if any.
    #[inline]
    pub fn get(&self, type_id: u32) -> Option<T> {
        self.entries.get(type_id as usize).copied().flatten()
    }

    /// Store `value` for `type_id`, growing the array in whole blocks.
    pub fn set(&mut self, type_id: u32, value: T) {
        let index = type_id as usize;
        if index >= self.entries.len() {
            let blocks = index / CACHE_BLOCK_SIZE + 1;
            self.entries.resize(blocks * CACHE_BLOCK_SIZE, None);
        }
        self.entries[index] = Some(value);
    }

    /// Allocated slots (a multiple of [`CACHE_BLOCK_SIZE`]).
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }
}

impl<T: Copy> Default for FactorCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type EdgeFactorCache = FactorCache<crate::EdgeFactor>;
pub type TurnCostFactorCache = FactorCache<crate::TurnCostFactor>;
