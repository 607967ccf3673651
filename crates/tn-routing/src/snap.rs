//! Locations on edges.
//!
//! A [`SnapPoint`] is an edge plus an offset in `0..=MAX_OFFSET`, measured
//! from the edge's first vertex (`vertex1`) regardless of travel direction.
//!
//! [`Snapper`] finds the closest edge to a coordinate.  It indexes the edge
//! segments of the tiles around the query point in an R-tree and walks
//! candidates nearest first until one passes the filter.

use std::fmt;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashSet;
use tracing::trace;

use tn_core::{BoundingBox, Coordinate, EdgeId, Tile, VertexId};
use tn_network::{MAX_OFFSET, NetworkError, RoutingNetwork, RoutingNetworkEdgeEnumerator};

use crate::{ProfileHandler, RoutingError, RoutingResult};

/// Search radius used when none is given.
pub const DEFAULT_SNAP_DISTANCE_M: f64 = 50.0;

// ── SnapPoint ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnapPoint {
    pub edge_id: EdgeId,
    /// `0` at vertex1, [`MAX_OFFSET`] at vertex2.
    pub offset: u16,
}

impl SnapPoint {
    pub const fn new(edge_id: EdgeId, offset: u16) -> Self {
        Self { edge_id, offset }
    }

    /// A point exactly on `vertex`, on the first edge listed there.
    pub fn from_vertex(network: &RoutingNetwork, vertex: VertexId) -> RoutingResult<Self> {
        Self::from_vertex_filtered(network, vertex, |_| true)?.ok_or(RoutingError::IsolatedVertex(vertex))
    }

    /// A point exactly on `vertex`, on the first edge there the handler's
    /// profile can stop on.
    pub fn from_vertex_for(network: &RoutingNetwork, vertex: VertexId, handler: &mut ProfileHandler) -> RoutingResult<Self> {
        Self::from_vertex_filtered(network, vertex, |edge| handler.can_stop(edge))?.ok_or_else(|| {
            RoutingError::NoStoppableEdge { vertex, profile: handler.name().to_string() }
        })
    }

    fn from_vertex_filtered<F>(network: &RoutingNetwork, vertex: VertexId, mut accept: F) -> RoutingResult<Option<Self>>
    where
        F: FnMut(&RoutingNetworkEdgeEnumerator<'_>) -> bool,
    {
        let mut edges = network.edge_enumerator();
        if !edges.move_to(vertex) {
            return Err(NetworkError::VertexNotFound(vertex).into());
        }
        let mut any = false;
        while edges.move_next() {
            any = true;
            if accept(&edges) {
                let offset = if edges.forward() { 0 } else { MAX_OFFSET };
                return Ok(Some(Self::new(edges.edge_id(), offset)));
            }
        }
        if !any {
            return Err(RoutingError::IsolatedVertex(vertex));
        }
        Ok(None)
    }

    /// Offset in the direction of travel: unchanged going forward, mirrored
    /// going backward.
    #[inline]
    pub fn offset_in(&self, forward: bool) -> u16 {
        if forward { self.offset } else { MAX_OFFSET - self.offset }
    }

    pub fn location(&self, network: &RoutingNetwork) -> RoutingResult<Coordinate> {
        let mut edges = network.edge_enumerator();
        if !edges.move_to_edge(self.edge_id, true) {
            return Err(NetworkError::EdgeNotFound(self.edge_id).into());
        }
        Ok(edges.location(self.offset)?)
    }
}

impl fmt::Display for SnapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.edge_id, self.offset)
    }
}

// ── Segment index ─────────────────────────────────────────────────────────────

/// One straight piece of an edge in a local equirectangular frame.
struct SegmentEntry {
    edge: EdgeId,
    segment: usize,
    a: [f64; 2],
    b: [f64; 2],
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.a, self.b)
    }
}

impl PointDistance for SegmentEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let (dx, dy) = (self.b[0] - self.a[0], self.b[1] - self.a[1]);
        let len2 = dx * dx + dy * dy;
        let t = if len2 == 0.0 {
            0.0
        } else {
            (((point[0] - self.a[0]) * dx + (point[1] - self.a[1]) * dy) / len2).clamp(0.0, 1.0)
        };
        let (x, y) = (self.a[0] + dx * t, self.a[1] + dy * t);
        (point[0] - x).powi(2) + (point[1] - y).powi(2)
    }
}

// ── Snapper ───────────────────────────────────────────────────────────────────

/// Snaps coordinates to the nearest edge of one network snapshot.
#[derive(Clone, Debug)]
pub struct Snapper<'a> {
    network: &'a RoutingNetwork,
    max_distance_m: f64,
}

impl<'a> Snapper<'a> {
    pub fn new(network: &'a RoutingNetwork) -> Self {
        Self { network, max_distance_m: DEFAULT_SNAP_DISTANCE_M }
    }

    pub fn with_max_distance_m(mut self, max_distance_m: f64) -> Self {
        self.max_distance_m = max_distance_m;
        self
    }

    /// Nearest point on any edge.
    pub fn snap(&self, location: Coordinate) -> RoutingResult<SnapPoint> {
        self.snap_filtered(location, |_| true)
    }

    /// Nearest point on an edge the profile can stop on.
    pub fn snap_for(&self, location: Coordinate, handler: &mut ProfileHandler) -> RoutingResult<SnapPoint> {
        self.snap_filtered(location, |edge| handler.can_stop(edge))
    }

    fn snap_filtered<F>(&self, location: Coordinate, mut accept: F) -> RoutingResult<SnapPoint>
    where
        F: FnMut(&RoutingNetworkEdgeEnumerator<'a>) -> bool,
    {
        let scale = location.lat.to_radians().cos();
        let project = |c: Coordinate| [c.lon * scale, c.lat];
        let bbox = BoundingBox::around(location, self.max_distance_m);
        let tree = self.index(&bbox, project)?;
        trace!(segments = tree.size(), "snap index built");

        let mut edges = self.network.edge_enumerator();
        let mut rejected = FxHashSet::default();
        for entry in tree.nearest_neighbor_iter(&project(location)) {
            if rejected.contains(&entry.edge) {
                continue;
            }
            if !edges.move_to_edge(entry.edge, true) {
                return Err(NetworkError::EdgeNotFound(entry.edge).into());
            }
            if !accept(&edges) {
                rejected.insert(entry.edge);
                continue;
            }

            let points = edges.polyline()?;
            let (a, b) = (points[entry.segment], points[entry.segment + 1]);
            let (on_edge, t) = tn_core::geo::project_on_segment(location, a, b);
            if on_edge.distance_m(location) > self.max_distance_m {
                break;
            }

            let before = tn_core::geo::line_length_m(&points[..=entry.segment]);
            let along = before + a.distance_m(b) * t;
            let total = tn_core::geo::line_length_m(&points);
            let fraction = if total > 0.0 { (along / total).clamp(0.0, 1.0) } else { 0.0 };
            return Ok(SnapPoint::new(entry.edge, (fraction * MAX_OFFSET as f64).round() as u16));
        }

        Err(RoutingError::SnapFailed { location, max_distance_m: self.max_distance_m })
    }

    /// Segments of every edge touching a tile that overlaps `bbox`.
    fn index(&self, bbox: &BoundingBox, project: impl Fn(Coordinate) -> [f64; 2]) -> RoutingResult<RTree<SegmentEntry>> {
        let mut entries = Vec::new();
        let mut seen = FxHashSet::default();
        let mut edges = self.network.edge_enumerator();

        for tile in Tile::tiles_in_box(bbox, self.network.zoom()) {
            let tile_id = tile.local_id();
            let Some(network_tile) = self.network.tile(tile_id) else { continue };
            for local in 0..network_tile.vertex_count() as u32 {
                edges.move_to(VertexId::new(tile_id, local));
                while edges.move_next() {
                    let edge = edges.edge_id();
                    if !seen.insert(edge) {
                        continue;
                    }
                    let mut points = edges.polyline()?;
                    if !edges.forward() {
                        points.reverse();
                    }
                    for (segment, w) in points.windows(2).enumerate() {
                        if !bbox.intersects(&BoundingBox::new(w[0], w[1])) {
                            continue;
                        }
                        entries.push(SegmentEntry { edge, segment, a: project(w[0]), b: project(w[1]) });
                    }
                }
            }
        }
        Ok(RTree::bulk_load(entries))
    }
}
