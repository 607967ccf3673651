//! The single-writer mutation scope.
//!
//! A [`RoutingNetworkWriter`] holds the router db's write lock and a private
//! copy of the latest snapshot.  Every mutation lands in the copy; readers
//! keep seeing the previous snapshot until the writer is dropped, at which
//! point the copy is published in one swap.

use std::sync::Arc;

use parking_lot::{MutexGuard, RwLock};
use rustc_hash::FxHashSet;
use tracing::debug;

use tn_core::tiles::world_to_local_id;
use tn_core::{Attribute, Coordinate, EdgeId, VertexId};

use crate::restrictions::NetworkRestriction;
use crate::tile::{EdgeRole, NewEdge, length_cm_of};
use crate::{NetworkError, NetworkResult, RoutingNetwork};

/// Optional parts of a new edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeOptions<'a> {
    /// Intermediate points from vertex1 to vertex2.
    pub shape: &'a [Coordinate],
    pub attributes: &'a [Attribute],
    /// Use this edge-type id instead of deriving one from `attributes`.
    pub edge_type_id: Option<u32>,
    /// Length in centimetres; computed from the geometry when `None`.
    pub length_cm: Option<u32>,
}

pub struct RoutingNetworkWriter<'db> {
    _guard: MutexGuard<'db, ()>,
    target: &'db RwLock<Arc<RoutingNetwork>>,
    network: Option<RoutingNetwork>,
    touched: FxHashSet<u32>,
    vertices_added: usize,
    edges_added: usize,
}

impl<'db> RoutingNetworkWriter<'db> {
    pub(crate) fn new(guard: MutexGuard<'db, ()>, target: &'db RwLock<Arc<RoutingNetwork>>) -> Self {
        let network = RoutingNetwork::clone(&target.read());
        Self {
            _guard: guard,
            target,
            network: Some(network),
            touched: FxHashSet::default(),
            vertices_added: 0,
            edges_added: 0,
        }
    }

    /// The network as modified so far.
    pub fn network(&self) -> &RoutingNetwork {
        match &self.network {
            Some(network) => network,
            None => unreachable!("network is only taken on drop"),
        }
    }

    fn network_mut(&mut self) -> &mut RoutingNetwork {
        match &mut self.network {
            Some(network) => network,
            None => unreachable!("network is only taken on drop"),
        }
    }

    // ── Vertices ──────────────────────────────────────────────────────────

    /// Add a vertex in the tile containing `location`.
    pub fn add_vertex(&mut self, location: Coordinate) -> NetworkResult<VertexId> {
        let network = self.network_mut();
        let tile_id = world_to_local_id(location.lon, location.lat, network.zoom);
        let vertex = network.tile_mut(tile_id)?.add_vertex(location);
        self.touched.insert(tile_id);
        self.vertices_added += 1;
        Ok(vertex)
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    /// Add an edge with intermediate `shape` points and `attributes`.
    pub fn add_edge(
        &mut self,
        vertex1: VertexId,
        vertex2: VertexId,
        shape: &[Coordinate],
        attributes: &[Attribute],
    ) -> NetworkResult<EdgeId> {
        self.add_edge_with(vertex1, vertex2, &EdgeOptions { shape, attributes, ..Default::default() })
    }

    /// Add an edge.
    ///
    /// An edge between two tiles is stored in both: the canonical record in
    /// vertex1's tile and a mirror with the same id, edge type and length in
    /// vertex2's tile.  Both orders are checked before either record is
    /// written, so a failed add leaves the network unchanged.
    pub fn add_edge_with(
        &mut self,
        vertex1: VertexId,
        vertex2: VertexId,
        options: &EdgeOptions<'_>,
    ) -> NetworkResult<EdgeId> {
        let network = self.network_mut();
        let from = network.vertex(vertex1)?;
        let to = network.vertex(vertex2)?;

        // Orders before the type id: a failed add must not grow the index.
        let (tail_order, head_order) = match (network.tile(vertex1.tile_id), network.tile(vertex2.tile_id)) {
            (Some(t1), _) if vertex1 == vertex2 => t1.reserve_two_orders(vertex1)?,
            (Some(t1), Some(t2)) => (t1.next_order(vertex1)?, t2.next_order(vertex2)?),
            (None, _) => return Err(NetworkError::VertexNotFound(vertex1)),
            (_, None) => return Err(NetworkError::VertexNotFound(vertex2)),
        };

        let edge_type_id = match options.edge_type_id {
            Some(id) => id,
            None => network.edge_types.get(options.attributes),
        };
        let length_cm = options.length_cm.unwrap_or_else(|| length_cm_of(from, options.shape, to));
        let edge = NewEdge {
            vertex1,
            vertex2,
            shape: options.shape,
            attributes: options.attributes,
            edge_type_id,
            length_cm: Some(length_cm),
        };

        let id = if vertex1.tile_id == vertex2.tile_id {
            network.tile_mut(vertex1.tile_id)?.add_edge(&edge)?
        } else {
            let id = network
                .tile_mut(vertex1.tile_id)?
                .add_edge_record(&edge, EdgeRole::Canonical { head_order })?;
            network
                .tile_mut(vertex2.tile_id)?
                .add_edge_record(&edge, EdgeRole::Mirror { id, tail_order })?;
            self.touched.insert(vertex2.tile_id);
            id
        };
        self.touched.insert(vertex1.tile_id);
        self.edges_added += 1;
        Ok(id)
    }

    // ── Turn costs ────────────────────────────────────────────────────────

    /// Add a turn-cost table at `vertex`.
    ///
    /// `costs` is the row-major `n × n` matrix for `edges`: entry `[i, j]` is
    /// the cost of arriving over `edges[i]` and leaving over `edges[j]`.  A
    /// non-empty `prefix` is rejected with [`NetworkError::NotSupported`].
    pub fn add_turn_costs(
        &mut self,
        vertex: VertexId,
        attributes: &[Attribute],
        edges: &[EdgeId],
        costs: &[u32],
        prefix: &[EdgeId],
    ) -> NetworkResult<()> {
        if !prefix.is_empty() {
            return Err(NetworkError::NotSupported("turn costs with a prefix sequence"));
        }
        let network = self.network_mut();
        if !network.has_vertex(vertex) {
            return Err(NetworkError::VertexNotFound(vertex));
        }
        let type_id = network.turn_cost_types.get(attributes);
        network.tile_mut(vertex.tile_id)?.add_turn_costs(vertex, type_id, edges, costs, prefix)?;
        self.touched.insert(vertex.tile_id);
        Ok(())
    }

    /// Store restrictions as turn costs.
    ///
    /// A prohibitory restriction `[from, to]` becomes a table at the via
    /// vertex with cost `1` for the `from → to` turn.  Mandatory restrictions
    /// are inverted into the prohibitory restrictions they imply first.
    /// Restrictions over more than two edges would need a prefix and fail with
    /// [`NetworkError::NotSupported`].
    ///
    /// Returns the number of turn-cost tables added.
    pub fn add_restrictions(&mut self, restrictions: &[NetworkRestriction]) -> NetworkResult<usize> {
        let mut added = 0;
        for restriction in restrictions {
            if restriction.is_prohibitory() {
                self.add_prohibitory(restriction)?;
                added += 1;
                continue;
            }
            for inverted in restriction.invert(self.network())? {
                self.add_prohibitory(&inverted)?;
                added += 1;
            }
        }
        Ok(added)
    }

    fn add_prohibitory(&mut self, restriction: &NetworkRestriction) -> NetworkResult<()> {
        let [(from, from_forward), (to, _)] = restriction.edges() else {
            return Err(NetworkError::NotSupported("restrictions must span exactly two edges"));
        };
        let mut enumerator = self.network().edge_enumerator();
        if !enumerator.move_to_edge(*from, *from_forward) {
            return Err(NetworkError::EdgeNotFound(*from));
        }
        let via = enumerator.head();

        if from == to {
            self.add_turn_costs(via, restriction.attributes(), &[*from], &[1], &[])
        } else {
            self.add_turn_costs(via, restriction.attributes(), &[*from, *to], &[0, 1, 0, 0], &[])
        }
    }

    // ── Edge types ────────────────────────────────────────────────────────

    /// Replace the edge-type function and recompute every stored edge type.
    ///
    /// The new function gets the next id, so factor caches built for the
    /// previous function stop matching.
    pub fn set_edge_type_func<F>(&mut self, func: F)
    where
        F: Fn(&[Attribute]) -> Vec<Attribute> + Send + Sync + 'static,
    {
        let network = self.network_mut();
        network.edge_types = network.edge_types.next(func);
        let tiles = network.reindex_edge_types();
        debug!(func_id = network.edge_types.func_id(), tiles, "edge-type function replaced");
    }
}

impl Drop for RoutingNetworkWriter<'_> {
    fn drop(&mut self) {
        let Some(network) = self.network.take() else {
            return;
        };
        *self.target.write() = Arc::new(network);
        debug!(
            tiles = self.touched.len(),
            vertices = self.vertices_added,
            edges = self.edges_added,
            "network snapshot published"
        );
    }
}
