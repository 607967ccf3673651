//! Network-wide cursors.
//!
//! [`RoutingNetworkEdgeEnumerator`] wraps a tile cursor and resolves what a
//! single tile cannot: vertices in neighbouring tiles, turn-cost attributes
//! from the network's type index, and lengths stored as
//! [`LENGTH_UNKNOWN`](crate::tile::LENGTH_UNKNOWN).

use tn_core::{Attribute, Coordinate, EdgeId, VertexId, geo};

use crate::tile::turn_costs::TurnCostTable;
use crate::tile::{LENGTH_UNKNOWN, NetworkTile, NetworkTileEnumerator, TurnCost, length_cm_of};
use crate::{NetworkResult, RoutingNetwork};

/// Offset of the end of an edge; offsets run `0..=MAX_OFFSET` from tail to
/// head in traversal direction.
pub const MAX_OFFSET: u16 = u16::MAX;

/// Fraction of the edge an offset stands for.
#[inline]
pub fn offset_fraction(offset: u16) -> f64 {
    offset as f64 / MAX_OFFSET as f64
}

/// A read-only edge cursor over a whole network.
///
/// Same contract as [`NetworkTileEnumerator`]: position it with
/// [`move_to`](Self::move_to) or [`move_to_edge`](Self::move_to_edge);
/// accessors describe the edge as traversed and panic when unpositioned.
#[derive(Clone, Debug)]
pub struct RoutingNetworkEdgeEnumerator<'a> {
    network: &'a RoutingNetwork,
    inner: Option<NetworkTileEnumerator<'a>>,
}

impl<'a> RoutingNetworkEdgeEnumerator<'a> {
    pub(crate) fn new(network: &'a RoutingNetwork) -> Self {
        Self { network, inner: None }
    }

    #[inline]
    pub fn network(&self) -> &'a RoutingNetwork {
        self.network
    }

    /// Prepare to enumerate the edges of `vertex`.  Returns `false` if the
    /// vertex does not exist.
    pub fn move_to(&mut self, vertex: VertexId) -> bool {
        self.inner = self.network.tile(vertex.tile_id).map(NetworkTile::enumerator);
        match &mut self.inner {
            Some(inner) => inner.move_to_vertex(vertex),
            None => false,
        }
    }

    /// Advance to the next edge of the current vertex.
    pub fn move_next(&mut self) -> bool {
        self.inner.as_mut().is_some_and(NetworkTileEnumerator::move_next)
    }

    /// Jump to edge `id`, traversed forward (vertex1 → vertex2) or backward.
    pub fn move_to_edge(&mut self, id: EdgeId, forward: bool) -> bool {
        self.inner = self.network.tile(id.tile_id).map(NetworkTile::enumerator);
        match &mut self.inner {
            Some(inner) => inner.move_to_edge(id, forward),
            None => false,
        }
    }

    #[inline]
    pub fn is_positioned(&self) -> bool {
        self.inner.as_ref().is_some_and(NetworkTileEnumerator::is_positioned)
    }

    #[inline]
    fn cur(&self) -> &NetworkTileEnumerator<'a> {
        match &self.inner {
            Some(inner) => inner,
            None => panic!("edge enumerator is not positioned on an edge"),
        }
    }

    pub fn edge_id(&self) -> EdgeId {
        self.cur().edge_id()
    }

    pub fn forward(&self) -> bool {
        self.cur().forward()
    }

    pub fn tail(&self) -> VertexId {
        self.cur().tail()
    }

    pub fn head(&self) -> VertexId {
        self.cur().head()
    }

    pub fn tail_order(&self) -> u8 {
        self.cur().tail_order()
    }

    pub fn head_order(&self) -> u8 {
        self.cur().head_order()
    }

    pub fn edge_type_id(&self) -> u32 {
        self.cur().edge_type_id()
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        self.cur().attributes()
    }

    /// Intermediate points, tail to head.
    pub fn shape(&self) -> impl DoubleEndedIterator<Item = Coordinate> + ExactSizeIterator + use<'a> {
        self.cur().shape()
    }

    /// Edge length in centimetres, recomputed from the geometry when the
    /// stored value is the unknown sentinel.
    pub fn length_cm(&self) -> NetworkResult<u32> {
        let stored = self.cur().length_cm();
        if stored != LENGTH_UNKNOWN {
            return Ok(stored);
        }
        let tail = self.network.vertex(self.tail())?;
        let head = self.network.vertex(self.head())?;
        let shape: Vec<Coordinate> = self.shape().collect();
        Ok(length_cm_of(tail, &shape, head))
    }

    pub fn length_m(&self) -> NetworkResult<f64> {
        Ok(self.length_cm()? as f64 / 100.0)
    }

    /// Tail, shape and head in traversal order.
    pub fn polyline(&self) -> NetworkResult<Vec<Coordinate>> {
        let mut points = Vec::with_capacity(self.shape().len() + 2);
        points.push(self.network.vertex(self.tail())?);
        points.extend(self.shape());
        points.push(self.network.vertex(self.head())?);
        Ok(points)
    }

    /// The point at `offset` along the edge in traversal order.
    pub fn location(&self, offset: u16) -> NetworkResult<Coordinate> {
        let points = self.polyline()?;
        Ok(geo::point_along_line(&points, offset_fraction(offset)).0)
    }

    /// The part of the edge between two offsets, both end points included.
    ///
    /// If `offset1 > offset2` the result runs backwards along the edge.
    pub fn shape_between(&self, offset1: u16, offset2: u16) -> NetworkResult<Vec<Coordinate>> {
        let points = self.polyline()?;
        if offset1 <= offset2 {
            return Ok(sub_line(&points, offset_fraction(offset1), offset_fraction(offset2)));
        }
        let mut reversed = sub_line(&points, offset_fraction(offset2), offset_fraction(offset1));
        reversed.reverse();
        Ok(reversed)
    }

    // ── Turn costs ────────────────────────────────────────────────────────

    /// Turn costs for arriving at this edge's tail over the endpoint with
    /// order `from_order` and leaving over this edge.
    pub fn turn_cost_to_tail(&self, from_order: u8) -> impl Iterator<Item = TurnCost<'a>> + use<'a> {
        let to_order = self.tail_order();
        self.turn_costs_at(self.tail(), move |table| table.cost(from_order, to_order))
    }

    /// Turn costs for arriving at the tail over this edge and leaving over the
    /// endpoint with order `to_order`.
    pub fn turn_cost_from_tail(&self, to_order: u8) -> impl Iterator<Item = TurnCost<'a>> + use<'a> {
        let from_order = self.tail_order();
        self.turn_costs_at(self.tail(), move |table| table.cost(from_order, to_order))
    }

    fn turn_costs_at<F>(&self, vertex: VertexId, cost: F) -> impl Iterator<Item = TurnCost<'a>> + use<'a, F>
    where
        F: Fn(&TurnCostTable) -> u32 + 'a,
    {
        let network = self.network;
        network
            .tile(vertex.tile_id)
            .into_iter()
            .flat_map(move |tile| tile.turn_cost_tables(vertex.local_id))
            .map(move |table| TurnCost {
                type_id: table.type_id,
                attributes: network.turn_cost_types.get_by_id(table.type_id).unwrap_or(&[]),
                cost: cost(table),
                prefix: &table.prefix,
            })
    }
}

/// The polyline between two fractions of its length.
fn sub_line(points: &[Coordinate], from: f64, to: f64) -> Vec<Coordinate> {
    let (start, start_segment) = geo::point_along_line(points, from);
    let (end, end_segment) = geo::point_along_line(points, to);
    let mut out = Vec::with_capacity(end_segment.saturating_sub(start_segment) + 2);
    out.push(start);
    // Interior points strictly after the start segment's first point.
    for p in &points[start_segment + 1..=end_segment] {
        if *p != start {
            out.push(*p);
        }
    }
    if out.last() != Some(&end) {
        out.push(end);
    }
    out
}

// ── Vertices ──────────────────────────────────────────────────────────────────

/// Iterator over every vertex of a network, tile by tile.
#[derive(Debug)]
pub struct RoutingNetworkVertexEnumerator<'a> {
    tiles: Vec<&'a NetworkTile>,
    tile: usize,
    local: u32,
}

impl<'a> RoutingNetworkVertexEnumerator<'a> {
    pub(crate) fn new(network: &'a RoutingNetwork) -> Self {
        Self { tiles: network.tiles().collect(), tile: 0, local: 0 }
    }
}

impl Iterator for RoutingNetworkVertexEnumerator<'_> {
    type Item = (VertexId, Coordinate);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let tile = self.tiles.get(self.tile)?;
            if let Some(v) = tile.vertices.get(self.local as usize) {
                let id = VertexId::new(tile.tile_id(), self.local);
                self.local += 1;
                return Some((id, v.location));
            }
            self.tile += 1;
            self.local = 0;
        }
    }
}
