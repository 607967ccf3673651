//! Turn-cost tables.
//!
//! A table belongs to one vertex and one turn-cost type.  It is a square
//! matrix indexed by **order**: entry `[from, to]` is the cost of arriving
//! over the endpoint with order `from` and leaving over the endpoint with
//! order `to`.  Indexing by order instead of edge id keeps lookups O(1).
//!
//! Multi-edge context ("prefix") is rejected on write; tables always have an
//! empty prefix.

use tn_core::{Attribute, EdgeId, VertexId};

use super::{NO_LINK, NetworkTile};
use crate::{NetworkError, NetworkResult};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TurnCostTable {
    pub vertex: u32,
    pub type_id: u32,
    pub dimension: u8,
    /// Row-major `dimension × dimension` matrix.
    pub costs: Vec<u32>,
    pub prefix: Vec<EdgeId>,
    /// Next table at the same vertex.
    pub next: u32,
}

impl TurnCostTable {
    /// Cost from order `from` to order `to`; `0` outside the matrix.
    #[inline]
    pub fn cost(&self, from: u8, to: u8) -> u32 {
        let dim = self.dimension as usize;
        let (from, to) = (from as usize, to as usize);
        if from >= dim || to >= dim {
            return 0;
        }
        self.costs[from * dim + to]
    }
}

/// One turn cost as seen from an edge enumerator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnCost<'a> {
    pub type_id: u32,
    /// Attributes of the turn-cost type.
    pub attributes: &'a [Attribute],
    pub cost: u32,
    /// Edges that must precede the turn; always empty (see module docs).
    pub prefix: &'a [EdgeId],
}

impl NetworkTile {
    /// Store a turn-cost table at `vertex`.
    ///
    /// `costs` is a row-major `edges.len() × edges.len()` matrix:
    /// `costs[i * n + j]` is the cost of arriving via `edges[i]` and leaving
    /// via `edges[j]`.  Every edge must be incident to `vertex`.
    pub fn add_turn_costs(
        &mut self,
        vertex: VertexId,
        type_id: u32,
        edges: &[EdgeId],
        costs: &[u32],
        prefix: &[EdgeId],
    ) -> NetworkResult<()> {
        if !prefix.is_empty() {
            return Err(NetworkError::NotSupported("turn costs with a prefix sequence"));
        }
        if !self.has_vertex(vertex) {
            return Err(NetworkError::VertexNotFound(vertex));
        }
        let n = edges.len();
        if costs.len() != n * n {
            return Err(NetworkError::TurnCostDimension { edges: n, expected: n * n, got: costs.len() });
        }

        let orders = edges
            .iter()
            .map(|&edge| {
                self.order_at(vertex.local_id, edge)
                    .ok_or(NetworkError::EdgeNotAtVertex { edge, vertex })
            })
            .collect::<NetworkResult<Vec<u8>>>()?;

        let dimension = orders.iter().copied().max().map_or(0, |m| m + 1);
        let dim = dimension as usize;
        let mut matrix = vec![0u32; dim * dim];
        for (i, &from) in orders.iter().enumerate() {
            for (j, &to) in orders.iter().enumerate() {
                matrix[from as usize * dim + to as usize] = costs[i * n + j];
            }
        }

        let index = self.turn_costs.len() as u32;
        let v = &mut self.vertices[vertex.local_id as usize];
        self.turn_costs.push(TurnCostTable {
            vertex: vertex.local_id,
            type_id,
            dimension,
            costs: matrix,
            prefix: Vec::new(),
            next: v.first_turn_cost,
        });
        v.first_turn_cost = index;
        Ok(())
    }

    /// Order of `edge`'s endpoint at the local vertex `vertex`.
    ///
    /// For a self-loop the first endpoint found wins.
    pub(crate) fn order_at(&self, vertex: u32, edge: EdgeId) -> Option<u8> {
        let mut link = self.vertices.get(vertex as usize)?.first_edge;
        while link != NO_LINK {
            let record = &self.edges[(link >> 1) as usize];
            let at_vertex1 = link & 1 == 0;
            if record.id == edge {
                return Some(if at_vertex1 { record.tail_order } else { record.head_order });
            }
            link = if at_vertex1 { record.next1 } else { record.next2 };
        }
        None
    }

    /// Turn-cost tables stored at the local vertex `vertex`, newest first.
    pub(crate) fn turn_cost_tables(&self, vertex: u32) -> impl Iterator<Item = &TurnCostTable> + '_ {
        let mut link = self.vertices.get(vertex as usize).map_or(NO_LINK, |v| v.first_turn_cost);
        std::iter::from_fn(move || {
            if link == NO_LINK {
                return None;
            }
            let table = &self.turn_costs[link as usize];
            link = table.next;
            Some(table)
        })
    }

    /// Whether any turn-cost table exists at `vertex`.
    pub fn has_turn_costs(&self, vertex: VertexId) -> bool {
        vertex.tile_id == self.tile_id
            && self.vertices.get(vertex.local_id as usize).is_some_and(|v| v.first_turn_cost != NO_LINK)
    }
}
