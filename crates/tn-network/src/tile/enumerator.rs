//! Cursor over the edges of a single tile.

use tn_core::{Attribute, Coordinate, EdgeId, VertexId};

use super::{EdgeRecord, NO_LINK, NetworkTile};

/// A read-only cursor over one tile's edges.
///
/// Position it with [`move_to_vertex`](Self::move_to_vertex) and step with
/// [`move_next`](Self::move_next), or jump to a known edge with
/// [`move_to_edge`](Self::move_to_edge).  The edge accessors describe the
/// edge *as traversed*: `tail` is where the traversal starts, `forward` says
/// whether that matches the stored direction.
///
/// Accessors panic if the cursor is not positioned on an edge, the same way
/// slice indexing panics out of bounds.
#[derive(Clone, Debug)]
pub struct NetworkTileEnumerator<'a> {
    tile: &'a NetworkTile,
    next_link: u32,
    current: Option<(&'a EdgeRecord, bool)>,
}

impl<'a> NetworkTileEnumerator<'a> {
    pub(crate) fn new(tile: &'a NetworkTile) -> Self {
        Self { tile, next_link: NO_LINK, current: None }
    }

    #[inline]
    pub fn tile(&self) -> &'a NetworkTile {
        self.tile
    }

    /// Prepare to enumerate the edges of `vertex`.  Returns `false` if the
    /// vertex does not belong to this tile.
    pub fn move_to_vertex(&mut self, vertex: VertexId) -> bool {
        self.current = None;
        self.next_link = NO_LINK;
        if !self.tile.has_vertex(vertex) {
            return false;
        }
        self.next_link = self.tile.vertices[vertex.local_id as usize].first_edge;
        true
    }

    /// Advance to the next edge of the current vertex.
    ///
    /// Once this returns `false` it keeps returning `false` until the cursor
    /// is repositioned.
    pub fn move_next(&mut self) -> bool {
        if self.next_link == NO_LINK {
            self.current = None;
            return false;
        }
        let record = &self.tile.edges[(self.next_link >> 1) as usize];
        let forward = self.next_link & 1 == 0;
        self.next_link = if forward { record.next1 } else { record.next2 };
        self.current = Some((record, forward));
        true
    }

    /// Jump to the edge stored under `id` in this tile.
    pub fn move_to_edge(&mut self, id: EdgeId, forward: bool) -> bool {
        self.next_link = NO_LINK;
        self.current = self
            .tile
            .edge_index(id)
            .map(|i| (&self.tile.edges[i as usize], forward));
        self.current.is_some()
    }

    #[inline]
    pub fn is_positioned(&self) -> bool {
        self.current.is_some()
    }

    #[inline]
    fn cur(&self) -> (&'a EdgeRecord, bool) {
        match self.current {
            Some(c) => c,
            None => panic!("tile enumerator is not positioned on an edge"),
        }
    }

    #[inline]
    pub fn edge_id(&self) -> EdgeId {
        self.cur().0.id
    }

    #[inline]
    pub fn forward(&self) -> bool {
        self.cur().1
    }

    #[inline]
    pub fn tail(&self) -> VertexId {
        let (r, forward) = self.cur();
        if forward { r.vertex1 } else { r.vertex2 }
    }

    #[inline]
    pub fn head(&self) -> VertexId {
        let (r, forward) = self.cur();
        if forward { r.vertex2 } else { r.vertex1 }
    }

    /// Order of this edge's endpoint at the tail vertex.
    #[inline]
    pub fn tail_order(&self) -> u8 {
        let (r, forward) = self.cur();
        if forward { r.tail_order } else { r.head_order }
    }

    /// Order of this edge's endpoint at the head vertex.
    #[inline]
    pub fn head_order(&self) -> u8 {
        let (r, forward) = self.cur();
        if forward { r.head_order } else { r.tail_order }
    }

    /// Stored length in centimetres; may be [`super::LENGTH_UNKNOWN`].
    #[inline]
    pub fn length_cm(&self) -> u32 {
        self.cur().0.length_cm
    }

    #[inline]
    pub fn edge_type_id(&self) -> u32 {
        self.cur().0.edge_type_id
    }

    pub fn attributes(&self) -> &'a [Attribute] {
        self.tile.attributes(self.cur().0)
    }

    /// Intermediate points in traversal order (tail → head).
    pub fn shape(&self) -> impl DoubleEndedIterator<Item = Coordinate> + ExactSizeIterator + use<'a> {
        let (r, forward) = self.cur();
        let points = self.tile.shape(r);
        let n = points.len();
        (0..n).map(move |i| if forward { points[i] } else { points[n - 1 - i] })
    }
}
