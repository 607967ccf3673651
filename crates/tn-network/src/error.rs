//! Network-subsystem error type.

use thiserror::Error;

use tn_core::{CoreError, EdgeId, VertexId};

/// Errors produced by `tn-network`.
///
/// Every variant except `Io` is a structural or format violation: the caller
/// passed data the network cannot represent.  None of them are retried.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("vertex {0} not found in network")]
    VertexNotFound(VertexId),

    #[error("edge {0} not found in network")]
    EdgeNotFound(EdgeId),

    #[error("edge {edge} is not incident to vertex {vertex}")]
    EdgeNotAtVertex { edge: EdgeId, vertex: VertexId },

    #[error("vertex {0} already has the maximum number of ordered edges ({max})",
            max = crate::tile::MAX_ORDER_HEAD_TAIL as u32 + 1)]
    OrderOutOfRange(VertexId),

    #[error("type id {0} is out of range")]
    TypeIdOutOfRange(u32),

    #[error("turn cost matrix for {edges} edges must have {expected} entries, got {got}")]
    TurnCostDimension { edges: usize, expected: usize, got: usize },

    #[error("not supported: {0}")]
    NotSupported(&'static str),

    #[error("type function {id} is required to read this data but was not supplied")]
    MissingTypeFunc { id: u32 },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
