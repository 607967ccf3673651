//! `RoutingNetwork`: an immutable snapshot of the tiled graph.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use tn_core::tiles::{self, tile_count_per_axis};
use tn_core::{BoundingBox, Coordinate, Tile, VertexId};

use crate::data_use::DataUseNotifier;
use crate::enumerator::{RoutingNetworkEdgeEnumerator, RoutingNetworkVertexEnumerator};
use crate::sparse::SparseArray;
use crate::tile::NetworkTile;
use crate::types::{EdgeTypeIndex, TurnCostTypeIndex};
use crate::{NetworkConfig, NetworkError, NetworkResult};

/// Tiles per sparse-array block.  Tile ids of one region are close together,
/// so small blocks keep untouched regions unallocated.
pub const TILE_BLOCK_SIZE: usize = 1 << 10;

/// The tiled road graph at one point in time.
///
/// A `RoutingNetwork` is never mutated once published; writers work on a
/// clone (see [`RoutingNetworkWriter`](crate::RoutingNetworkWriter)).  Cloning
/// is cheap: tiles and sparse-array blocks are reference counted and only the
/// ones a writer touches get copied.
#[derive(Clone, Debug)]
pub struct RoutingNetwork {
    pub(crate) zoom: u32,
    pub(crate) tiles: SparseArray<Option<Arc<NetworkTile>>>,
    pub(crate) edge_types: EdgeTypeIndex,
    pub(crate) turn_cost_types: TurnCostTypeIndex,
    pub(crate) usage: Arc<DataUseNotifier>,
}

impl RoutingNetwork {
    /// An empty network.
    pub fn new(config: &NetworkConfig) -> NetworkResult<Self> {
        config.validate()?;
        Ok(Self::with_parts(
            config.zoom,
            EdgeTypeIndex::default(),
            TurnCostTypeIndex::default(),
            Arc::new(DataUseNotifier::new()),
        ))
    }

    pub(crate) fn with_parts(
        zoom: u32,
        edge_types: EdgeTypeIndex,
        turn_cost_types: TurnCostTypeIndex,
        usage: Arc<DataUseNotifier>,
    ) -> Self {
        let slots = (tile_count_per_axis(zoom) * tile_count_per_axis(zoom)) as i64;
        Self {
            zoom,
            tiles: SparseArray::with_block_size(slots, TILE_BLOCK_SIZE, None),
            edge_types,
            turn_cost_types,
            usage,
        }
    }

    #[inline]
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn edge_types(&self) -> &EdgeTypeIndex {
        &self.edge_types
    }

    pub fn turn_cost_types(&self) -> &TurnCostTypeIndex {
        &self.turn_cost_types
    }

    /// The notifier shared by every snapshot of the same router db.
    pub fn usage(&self) -> &Arc<DataUseNotifier> {
        &self.usage
    }

    // ── Tiles ─────────────────────────────────────────────────────────────

    /// The tile with local id `tile_id`, if it holds any data.
    pub fn tile(&self, tile_id: u32) -> Option<&NetworkTile> {
        if tile_id as i64 >= self.tiles.len() {
            return None;
        }
        self.tiles.get(tile_id as i64).as_deref()
    }

    /// Every non-empty tile, in tile-id order.
    pub fn tiles(&self) -> impl Iterator<Item = &NetworkTile> + '_ {
        self.tiles.iter().filter_map(|(_, tile)| tile.as_deref())
    }

    pub fn tile_count(&self) -> usize {
        self.tiles().count()
    }

    /// Mutable access to a tile, creating it if needed.  Only a writer's
    /// private copy is ever mutated, and a tile shared with a published
    /// snapshot is copied first.
    pub(crate) fn tile_mut(&mut self, tile_id: u32) -> NetworkResult<&mut NetworkTile> {
        if tile_id as i64 >= self.tiles.len() {
            let (x, y) = tiles::from_local_id(tile_id, self.zoom);
            return Err(tn_core::CoreError::TileOutOfRange { x, y, zoom: self.zoom }.into());
        }
        let zoom = self.zoom;
        let map_id = self.edge_types.func_id();
        let slot = self.tiles.get_mut(tile_id as i64);
        let tile = slot.get_or_insert_with(|| {
            let mut tile = NetworkTile::new(tile_id, zoom);
            tile.edge_type_map_id = map_id;
            Arc::new(tile)
        });
        Ok(Arc::make_mut(tile))
    }

    /// Recompute every stored edge-type id with the current edge-type
    /// function.  Tiles already on the current function are left alone.
    pub(crate) fn reindex_edge_types(&mut self) -> usize {
        let map_id = self.edge_types.func_id();
        let stale: Vec<i64> = self
            .tiles
            .iter()
            .filter(|(_, t)| t.as_ref().is_some_and(|t| t.edge_type_map_id() != map_id))
            .map(|(i, _)| i)
            .collect();
        for &i in &stale {
            if let Some(tile) = self.tiles.get_mut(i) {
                let edge_types = &mut self.edge_types;
                Arc::make_mut(tile).apply_edge_types(map_id, |a| edge_types.get(a));
            }
        }
        stale.len()
    }

    /// Store a tile read from a stream.
    pub(crate) fn insert_tile(&mut self, tile: NetworkTile) -> NetworkResult<()> {
        let tile_id = tile.tile_id();
        *self.tile_mut(tile_id)? = tile;
        Ok(())
    }

    // ── Vertices ──────────────────────────────────────────────────────────

    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        self.tile(vertex.tile_id).is_some_and(|t| t.has_vertex(vertex))
    }

    /// Location of `vertex`.
    pub fn vertex(&self, vertex: VertexId) -> NetworkResult<Coordinate> {
        self.tile(vertex.tile_id)
            .and_then(|t| t.vertex(vertex))
            .ok_or(NetworkError::VertexNotFound(vertex))
    }

    pub fn vertex_count(&self) -> usize {
        self.tiles().map(NetworkTile::vertex_count).sum()
    }

    /// Every vertex with its location, tile by tile.
    pub fn vertices(&self) -> RoutingNetworkVertexEnumerator<'_> {
        RoutingNetworkVertexEnumerator::new(self)
    }

    /// A cursor over this network's edges.
    pub fn edge_enumerator(&self) -> RoutingNetworkEdgeEnumerator<'_> {
        RoutingNetworkEdgeEnumerator::new(self)
    }

    /// Vertices located inside `bbox`.
    pub fn vertices_in_box(&self, bbox: &BoundingBox) -> Vec<VertexId> {
        let mut found = Vec::new();
        for tile in Tile::tiles_in_box(bbox, self.zoom) {
            self.collect_tile_vertices(tile, bbox, &mut found);
        }
        found
    }

    /// Like [`vertices_in_box`](Self::vertices_in_box), but first tells the
    /// data-use listeners about `bbox`.
    ///
    /// Yields between tiles.  Once `cancel` fires the search stops and returns
    /// what it found so far.
    pub async fn vertices_in_box_async(
        &self,
        bbox: BoundingBox,
        cancel: &CancellationToken,
    ) -> Vec<VertexId> {
        self.usage.notify_box(self, bbox, cancel).await;

        let mut found = Vec::new();
        for tile in Tile::tiles_in_box(&bbox, self.zoom) {
            if cancel.is_cancelled() {
                break;
            }
            self.collect_tile_vertices(tile, &bbox, &mut found);
            tokio::task::yield_now().await;
        }
        found
    }

    /// Tell the data-use listeners `vertex` is about to be used.
    pub async fn touch_vertex(&self, vertex: VertexId) {
        self.usage.notify_vertex(self, vertex).await;
    }

    fn collect_tile_vertices(&self, tile: Tile, bbox: &BoundingBox, found: &mut Vec<VertexId>) {
        let Some(tile) = self.tile(tile.local_id()) else {
            return;
        };
        for (i, v) in tile.vertices.iter().enumerate() {
            if bbox.contains(v.location) {
                found.push(VertexId::new(tile.tile_id(), i as u32));
            }
        }
    }
}
