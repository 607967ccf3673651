//! Tile-scoped identifier types.
//!
//! Every vertex and edge id is a `(tile_id, local_id)` pair: `tile_id` is the
//! local tile id at the network zoom (see [`crate::tiles`]) and `local_id` is
//! assigned sequentially by the tile that owns the item.  Both are `Copy +
//! Ord + Hash` so they can be used as map keys without ceremony.

use std::fmt;

/// Generate a `(tile_id, local_id)` identifier type.
macro_rules! tiled_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name {
            pub tile_id: u32,
            pub local_id: u32,
        }

        impl $name {
            /// Sentinel meaning "no valid id".
            pub const EMPTY: $name = $name { tile_id: u32::MAX, local_id: u32::MAX };

            #[inline(always)]
            pub const fn new(tile_id: u32, local_id: u32) -> Self {
                Self { tile_id, local_id }
            }

            #[inline(always)]
            pub fn is_empty(self) -> bool {
                self == Self::EMPTY
            }

            /// Pack into a single `u64` (`tile_id` in the high half).
            #[inline(always)]
            pub fn encode(self) -> u64 {
                ((self.tile_id as u64) << 32) | self.local_id as u64
            }

            /// Inverse of [`encode`](Self::encode).
            #[inline(always)]
            pub fn decode(value: u64) -> Self {
                Self { tile_id: (value >> 32) as u32, local_id: value as u32 }
            }
        }

        impl Default for $name {
            /// Returns the `EMPTY` sentinel so uninitialized ids are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::EMPTY
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}-{})", stringify!($name), self.tile_id, self.local_id)
            }
        }
    };
}

tiled_id! {
    /// A vertex, owned by exactly one tile.
    pub struct VertexId;
}

tiled_id! {
    /// A logical edge.  `tile_id` is the tile of the edge's first vertex.
    ///
    /// Local ids at or above [`EdgeId::MIN_CROSS_ID`] identify edges that
    /// cross into another tile; those edges are stored in both tiles under
    /// this same id.
    pub struct EdgeId;
}

impl EdgeId {
    /// First local id reserved for tile-crossing edges.
    pub const MIN_CROSS_ID: u32 = 1 << 31;

    /// `true` when this edge has a mirrored copy in a second tile.
    #[inline]
    pub fn is_cross_tile(self) -> bool {
        self.local_id >= Self::MIN_CROSS_ID
    }
}
