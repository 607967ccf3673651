//! Turning paths into routes.
//!
//! # Pluggability
//!
//! The router only calls [`RouteBuilder`], so applications can attach their
//! own instructions or per-segment attributes by supplying another builder.

use tn_core::{Coordinate, EdgeId};
use tn_network::{NetworkError, RoutingNetwork, offset_fraction};

use crate::{Path, ProfileHandler, RoutingError, RoutingResult};

/// A routable description of a path.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub profile: String,
    /// Geometry from start to end, without repeated points at edge joins.
    pub shape: Vec<Coordinate>,
    pub distance_m: f64,
    pub time_s: f64,
    /// `(edge, forward)` in travel order.
    pub edges: Vec<(EdgeId, bool)>,
}

impl Route {
    /// `true` if start and end coincide.
    pub fn is_trivial(&self) -> bool {
        self.distance_m == 0.0
    }
}

/// Builds a [`Route`] from a [`Path`].
///
/// Implementations must be `Send + Sync` so one builder can serve parallel
/// searches.
pub trait RouteBuilder: Send + Sync {
    fn build(&self, network: &RoutingNetwork, handler: &mut ProfileHandler, path: &Path) -> RoutingResult<Route>;
}

/// Distance from edge lengths, time from profile speeds, shape from edge
/// geometry.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultRouteBuilder;

impl RouteBuilder for DefaultRouteBuilder {
    fn build(&self, network: &RoutingNetwork, handler: &mut ProfileHandler, path: &Path) -> RoutingResult<Route> {
        if path.is_empty() {
            return Err(RoutingError::InvalidPath("path has no edges"));
        }

        let mut edges = network.edge_enumerator();
        let mut shape: Vec<Coordinate> = Vec::new();
        let mut distance_m = 0.0;
        let mut time_s = 0.0;

        for segment in path.segments() {
            if !edges.move_to_edge(segment.edge_id, segment.forward) {
                return Err(NetworkError::EdgeNotFound(segment.edge_id).into());
            }
            let part = offset_fraction(segment.offset2) - offset_fraction(segment.offset1);
            let distance = edges.length_m()? * part.max(0.0);

            let speed_m_per_s = handler.edge_factor(&edges).speed_m_per_s(true);
            if speed_m_per_s <= 0.0 {
                return Err(RoutingError::InvalidSpeed { edge: segment.edge_id, speed_m_per_s });
            }
            distance_m += distance;
            time_s += distance / speed_m_per_s;

            let points = edges.shape_between(segment.offset1, segment.offset2)?;
            let skip = usize::from(shape.last().is_some_and(|last| points.first() == Some(last)));
            shape.extend_from_slice(&points[skip..]);
        }

        Ok(Route {
            profile: handler.name().to_string(),
            shape,
            distance_m,
            time_s,
            edges: path.edges().to_vec(),
        })
    }
}
