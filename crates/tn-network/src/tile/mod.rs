//! One tile of the routing network.
//!
//! # Data layout
//!
//! A tile is a set of flat arrays with no pointers:
//!
//! ```text
//! vertices[local_id]     location, first incidence, next free order, first turn-cost table
//! edges[i]               arena of edge records (local, cross-tile and mirrored)
//! cross_edges[k]         arena index of the edge with local id MIN_CROSS_ID + k
//! shape_points           intermediate points of all edges, sliced per edge
//! attribute_sets[j]      distinct edge attribute sets, 0 = empty
//! turn_costs[t]          turn-cost tables, linked per vertex
//! ```
//!
//! # Adjacency
//!
//! Each vertex's incident edges form a singly linked list threaded through
//! the edge records.  A link is an **incidence**: `(arena index << 1) | side`
//! where side `0` means "the vertex is this edge's vertex1" and `1` means
//! "vertex2".  Every record carries one next-link per side, so adding an edge
//! is an O(1) prepend and enumerating a vertex is O(degree).  Encoding the
//! side in the link keeps self-loops (both sides at one vertex) unambiguous.
//!
//! # Cross-tile edges
//!
//! An edge whose vertices live in different tiles is stored twice: once in
//! vertex1's tile under a cross id (`local_id >= EdgeId::MIN_CROSS_ID`) and
//! once in vertex2's tile as a mirror carrying that same id.  Both records
//! hold the full geometry, attributes, length and both orders.

mod enumerator;
pub(crate) mod io;
pub(crate) mod turn_costs;

pub use enumerator::NetworkTileEnumerator;
pub use turn_costs::TurnCost;

use rustc_hash::FxHashMap;

use tn_core::{Attribute, Coordinate, EdgeId, VertexId, geo};

use crate::{NetworkError, NetworkResult};

/// Highest order a vertex can hand out; a vertex has at most 15 ordered
/// edge endpoints.
pub const MAX_ORDER_HEAD_TAIL: u8 = 14;

/// Tail and head order in one byte, tail in the high nibble.
#[inline]
pub(crate) fn pack_orders(tail: u8, head: u8) -> u8 {
    (tail << 4) | (head & 0x0f)
}

#[inline]
pub(crate) fn unpack_orders(packed: u8) -> (u8, u8) {
    (packed >> 4, packed & 0x0f)
}

/// Longest representable edge, in centimetres.
pub const MAX_EDGE_LENGTH_CM: u32 = u32::MAX - 1;

/// Length sentinel: recompute from geometry when read.
pub const LENGTH_UNKNOWN: u32 = u32::MAX;

/// Null link in the adjacency and turn-cost lists.
pub(crate) const NO_LINK: u32 = u32::MAX;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct VertexRecord {
    pub location: Coordinate,
    /// First incidence in this vertex's edge list.
    pub first_edge: u32,
    /// Order handed to the next edge endpoint added here.
    pub next_order: u8,
    /// First turn-cost table at this vertex.
    pub first_turn_cost: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EdgeRecord {
    pub id: EdgeId,
    pub vertex1: VertexId,
    pub vertex2: VertexId,
    /// Next incidence in vertex1's list (only meaningful if vertex1 is local).
    pub next1: u32,
    /// Next incidence in vertex2's list (only meaningful if vertex2 is local).
    pub next2: u32,
    pub tail_order: u8,
    pub head_order: u8,
    pub length_cm: u32,
    pub edge_type_id: u32,
    pub shape_start: u32,
    pub shape_len: u32,
    pub attributes: u32,
}

/// Everything needed to add one edge record.
#[derive(Clone, Copy, Debug)]
pub struct NewEdge<'a> {
    pub vertex1: VertexId,
    pub vertex2: VertexId,
    /// Intermediate points from vertex1 to vertex2.
    pub shape: &'a [Coordinate],
    pub attributes: &'a [Attribute],
    pub edge_type_id: u32,
    /// Length in centimetres; computed from the geometry when `None`.
    pub length_cm: Option<u32>,
}

/// Which part of an edge a mirror-aware add writes.
#[derive(Clone, Copy, Debug)]
pub(crate) enum EdgeRole {
    /// Both vertices are in this tile.
    Local,
    /// Vertex1 is here, vertex2 elsewhere; `head_order` was reserved there.
    Canonical { head_order: u8 },
    /// Vertex2 is here; the canonical record already has `id` and `tail_order`.
    Mirror { id: EdgeId, tail_order: u8 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct NetworkTile {
    pub(crate) tile_id: u32,
    pub(crate) zoom: u32,
    /// Id of the edge-type function the stored type ids were computed with.
    pub(crate) edge_type_map_id: u32,
    pub(crate) vertices: Vec<VertexRecord>,
    pub(crate) edges: Vec<EdgeRecord>,
    pub(crate) cross_edges: Vec<u32>,
    pub(crate) shape_points: Vec<Coordinate>,
    pub(crate) attribute_sets: Vec<Vec<Attribute>>,
    pub(crate) attribute_lookup: FxHashMap<Vec<Attribute>, u32>,
    pub(crate) turn_costs: Vec<turn_costs::TurnCostTable>,
}

impl NetworkTile {
    pub fn new(tile_id: u32, zoom: u32) -> Self {
        let mut attribute_lookup = FxHashMap::default();
        attribute_lookup.insert(Vec::new(), 0);
        Self {
            tile_id,
            zoom,
            edge_type_map_id: 0,
            vertices: Vec::new(),
            edges: Vec::new(),
            cross_edges: Vec::new(),
            shape_points: Vec::new(),
            attribute_sets: vec![Vec::new()],
            attribute_lookup,
            turn_costs: Vec::new(),
        }
    }

    #[inline]
    pub fn tile_id(&self) -> u32 {
        self.tile_id
    }

    #[inline]
    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    #[inline]
    pub fn edge_type_map_id(&self) -> u32 {
        self.edge_type_map_id
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edge records, mirrors included.
    pub fn edge_record_count(&self) -> usize {
        self.edges.len()
    }

    pub fn enumerator(&self) -> NetworkTileEnumerator<'_> {
        NetworkTileEnumerator::new(self)
    }

    // ── Vertices ──────────────────────────────────────────────────────────

    /// Append a vertex and return its id.
    pub fn add_vertex(&mut self, location: Coordinate) -> VertexId {
        let id = VertexId::new(self.tile_id, self.vertices.len() as u32);
        self.vertices.push(VertexRecord {
            location,
            first_edge: NO_LINK,
            next_order: 0,
            first_turn_cost: NO_LINK,
        });
        id
    }

    #[inline]
    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        vertex.tile_id == self.tile_id && (vertex.local_id as usize) < self.vertices.len()
    }

    /// Location of a vertex owned by this tile.
    pub fn vertex(&self, vertex: VertexId) -> Option<Coordinate> {
        if vertex.tile_id != self.tile_id {
            return None;
        }
        self.vertices.get(vertex.local_id as usize).map(|v| v.location)
    }

    fn vertex_record(&self, vertex: VertexId) -> NetworkResult<&VertexRecord> {
        if vertex.tile_id != self.tile_id {
            return Err(NetworkError::VertexNotFound(vertex));
        }
        self.vertices
            .get(vertex.local_id as usize)
            .ok_or(NetworkError::VertexNotFound(vertex))
    }

    /// The order the next edge endpoint at `vertex` would receive.
    pub fn next_order(&self, vertex: VertexId) -> NetworkResult<u8> {
        let order = self.vertex_record(vertex)?.next_order;
        if order > MAX_ORDER_HEAD_TAIL {
            return Err(NetworkError::OrderOutOfRange(vertex));
        }
        Ok(order)
    }

    /// The order two more endpoints at `vertex` would receive (self-loops).
    pub(crate) fn reserve_two_orders(&self, vertex: VertexId) -> NetworkResult<(u8, u8)> {
        let first = self.next_order(vertex)?;
        if first >= MAX_ORDER_HEAD_TAIL {
            return Err(NetworkError::OrderOutOfRange(vertex));
        }
        Ok((first, first + 1))
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    /// Add an edge whose vertices both live in this tile.
    pub fn add_edge(&mut self, edge: &NewEdge<'_>) -> NetworkResult<EdgeId> {
        self.add_edge_record(edge, EdgeRole::Local)
    }

    pub(crate) fn add_edge_record(
        &mut self,
        edge: &NewEdge<'_>,
        role: EdgeRole,
    ) -> NetworkResult<EdgeId> {
        // Validate and reserve orders before touching any array.
        let (tail_order, head_order) = match role {
            EdgeRole::Local => {
                self.vertex_record(edge.vertex1)?;
                self.vertex_record(edge.vertex2)?;
                if edge.vertex1 == edge.vertex2 {
                    self.reserve_two_orders(edge.vertex1)?
                } else {
                    (self.next_order(edge.vertex1)?, self.next_order(edge.vertex2)?)
                }
            }
            EdgeRole::Canonical { head_order } => (self.next_order(edge.vertex1)?, head_order),
            EdgeRole::Mirror { tail_order, .. } => (tail_order, self.next_order(edge.vertex2)?),
        };

        let length_cm = match edge.length_cm {
            Some(l) => l,
            None => match role {
                EdgeRole::Local => self.compute_length_cm(edge)?,
                _ => LENGTH_UNKNOWN,
            },
        };

        let index = self.edges.len() as u32;
        let id = match role {
            EdgeRole::Local => EdgeId::new(self.tile_id, index),
            EdgeRole::Canonical { .. } => {
                let id = EdgeId::new(self.tile_id, EdgeId::MIN_CROSS_ID + self.cross_edges.len() as u32);
                self.cross_edges.push(index);
                id
            }
            EdgeRole::Mirror { id, .. } => id,
        };

        let shape_start = self.shape_points.len() as u32;
        self.shape_points.extend_from_slice(edge.shape);
        let attributes = self.intern_attributes(edge.attributes);

        let mut record = EdgeRecord {
            id,
            vertex1: edge.vertex1,
            vertex2: edge.vertex2,
            next1: NO_LINK,
            next2: NO_LINK,
            tail_order,
            head_order,
            length_cm,
            edge_type_id: edge.edge_type_id,
            shape_start,
            shape_len: edge.shape.len() as u32,
            attributes,
        };

        // Prepend to the local vertices' incidence lists.
        if !matches!(role, EdgeRole::Mirror { .. }) {
            let v = &mut self.vertices[edge.vertex1.local_id as usize];
            record.next1 = v.first_edge;
            v.first_edge = index << 1;
            v.next_order += 1;
        }
        if !matches!(role, EdgeRole::Canonical { .. }) {
            let v = &mut self.vertices[edge.vertex2.local_id as usize];
            record.next2 = v.first_edge;
            v.first_edge = (index << 1) | 1;
            v.next_order += 1;
        }

        self.edges.push(record);
        Ok(id)
    }

    fn compute_length_cm(&self, edge: &NewEdge<'_>) -> NetworkResult<u32> {
        let from = self.vertex_record(edge.vertex1)?.location;
        let to = self.vertex_record(edge.vertex2)?.location;
        Ok(length_cm_of(from, edge.shape, to))
    }

    fn intern_attributes(&mut self, attributes: &[Attribute]) -> u32 {
        if let Some(&id) = self.attribute_lookup.get(attributes) {
            return id;
        }
        let id = self.attribute_sets.len() as u32;
        self.attribute_sets.push(attributes.to_vec());
        self.attribute_lookup.insert(attributes.to_vec(), id);
        id
    }

    /// Arena index of the record stored under `id` in this tile.
    ///
    /// Only ids owned by this tile resolve; mirrors are reached through the
    /// vertex lists.
    pub(crate) fn edge_index(&self, id: EdgeId) -> Option<u32> {
        if id.tile_id != self.tile_id {
            return None;
        }
        let index = if id.is_cross_tile() {
            *self.cross_edges.get((id.local_id - EdgeId::MIN_CROSS_ID) as usize)?
        } else {
            id.local_id
        };
        let record = self.edges.get(index as usize)?;
        (record.id == id).then_some(index)
    }

    pub fn has_edge(&self, id: EdgeId) -> bool {
        self.edge_index(id).is_some()
    }

    pub(crate) fn shape(&self, record: &EdgeRecord) -> &[Coordinate] {
        let start = record.shape_start as usize;
        &self.shape_points[start..start + record.shape_len as usize]
    }

    pub(crate) fn attributes(&self, record: &EdgeRecord) -> &[Attribute] {
        &self.attribute_sets[record.attributes as usize]
    }

    /// Recompute every stored edge-type id with `edge_type`, recording the
    /// function id the ids now belong to.
    pub(crate) fn apply_edge_types(&mut self, map_id: u32, mut edge_type: impl FnMut(&[Attribute]) -> u32) {
        for i in 0..self.edges.len() {
            let attributes = &self.attribute_sets[self.edges[i].attributes as usize];
            self.edges[i].edge_type_id = edge_type(attributes);
        }
        self.edge_type_map_id = map_id;
    }

    /// Rebuild derived lookups after deserialization.
    pub(crate) fn rebuild_lookups(&mut self) {
        self.attribute_lookup = self
            .attribute_sets
            .iter()
            .enumerate()
            .map(|(i, a)| (a.clone(), i as u32))
            .collect();
    }
}

/// Haversine length through `from`, `shape`, `to`, in capped centimetres.
pub fn length_cm_of(from: Coordinate, shape: &[Coordinate], to: Coordinate) -> u32 {
    let mut points = Vec::with_capacity(shape.len() + 2);
    points.push(from);
    points.extend_from_slice(shape);
    points.push(to);
    let cm = (geo::line_length_m(&points) * 100.0).round();
    cm.min(MAX_EDGE_LENGTH_CM as f64) as u32
}
