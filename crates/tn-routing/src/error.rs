//! Routing error type.

use thiserror::Error;

use tn_core::{Coordinate, EdgeId, VertexId};
use tn_network::NetworkError;

use crate::SnapPoint;

/// Errors produced by `tn-routing`.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: SnapPoint, to: SnapPoint },

    #[error("no edge within {max_distance_m} m of {location}")]
    SnapFailed { location: Coordinate, max_distance_m: f64 },

    #[error("vertex {0} has no edges")]
    IsolatedVertex(VertexId),

    #[error("profile {profile:?} cannot stop on any edge at vertex {vertex}")]
    NoStoppableEdge { vertex: VertexId, profile: String },

    #[error("profile {0:?} is not registered")]
    UnknownProfile(String),

    #[error("edge {edge} has speed {speed_m_per_s} m/s on a route")]
    InvalidSpeed { edge: EdgeId, speed_m_per_s: f64 },

    #[error("invalid path: {0}")]
    InvalidPath(&'static str),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
