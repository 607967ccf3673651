//! Turn restrictions expressed as edge sequences.

use tn_core::{Attribute, EdgeId};

use crate::{NetworkError, NetworkResult, RoutingNetwork};

/// A restricted manoeuvre: a sequence of directed edges.
///
/// Prohibitory restrictions forbid the sequence ("no left turn"); mandatory
/// ones forbid every alternative to its last edge ("only straight on").
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkRestriction {
    edges: Vec<(EdgeId, bool)>,
    is_prohibitory: bool,
    attributes: Vec<Attribute>,
}

impl NetworkRestriction {
    pub fn new(edges: Vec<(EdgeId, bool)>, is_prohibitory: bool, attributes: Vec<Attribute>) -> Self {
        Self { edges, is_prohibitory, attributes }
    }

    /// `(edge, forward)` pairs in travel order.
    pub fn edges(&self) -> &[(EdgeId, bool)] {
        &self.edges
    }

    pub fn is_prohibitory(&self) -> bool {
        self.is_prohibitory
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every other continuation from the last via vertex.
    ///
    /// The pivot is the head of the second-to-last edge.  For each edge
    /// leaving the pivot, except the literal U-turn back over the
    /// second-to-last edge and the restricted last edge itself, one
    /// restriction is produced: this sequence with its last edge replaced by
    /// that alternative and the prohibitory flag flipped.
    ///
    /// Sequences shorter than two edges have no pivot and yield nothing.
    pub fn invert(&self, network: &RoutingNetwork) -> NetworkResult<Vec<NetworkRestriction>> {
        let n = self.edges.len();
        if n < 2 {
            return Ok(Vec::new());
        }
        let (before, forward) = self.edges[n - 2];
        let (last, _) = self.edges[n - 1];

        let mut enumerator = network.edge_enumerator();
        if !enumerator.move_to_edge(before, forward) {
            return Err(NetworkError::EdgeNotFound(before));
        }
        let pivot = enumerator.head();
        if !enumerator.move_to(pivot) {
            return Err(NetworkError::VertexNotFound(pivot));
        }

        let mut inverted = Vec::new();
        while enumerator.move_next() {
            let edge = enumerator.edge_id();
            if edge == before || edge == last {
                continue;
            }
            let mut edges = self.edges[..n - 1].to_vec();
            edges.push((edge, enumerator.forward()));
            inverted.push(NetworkRestriction {
                edges,
                is_prohibitory: !self.is_prohibitory,
                attributes: self.attributes.clone(),
            });
        }
        Ok(inverted)
    }
}
