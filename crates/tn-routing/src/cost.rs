//! Profile evaluation against a network.
//!
//! A [`ProfileHandler`] is the only place the search asks a [`Profile`]
//! anything.  It memoizes factors per type id and drops its memo whenever the
//! network's type function changes, because type ids then mean something
//! else.
//!
//! # Thread safety
//!
//! A handler is `Send` but holds mutable caches; give every worker thread its
//! own (see [`many_to_many`](crate::many_to_many)).
//!
//! # Cost units
//!
//! Edge weight is `length_m × factor`, where the factor comes from the
//! profile in the direction of travel.  Turn costs add the stored table cost
//! scaled by the profile's turn-cost factor.

use std::sync::Arc;

use tn_core::Attribute;
use tn_network::{RoutingNetwork, RoutingNetworkEdgeEnumerator, TurnCost};
use tn_profile::{EdgeFactor, EdgeFactorCache, Profile, TurnCostFactor, TurnCostFactorCache};

use crate::RoutingResult;

/// A profile plus the per-worker caches that make it cheap to evaluate.
pub struct ProfileHandler {
    profile: Arc<dyn Profile>,
    edge_func_id: u32,
    edge_factors: EdgeFactorCache,
    turn_func_id: u32,
    turn_factors: TurnCostFactorCache,
}

impl ProfileHandler {
    pub fn new(profile: Arc<dyn Profile>) -> Self {
        Self {
            profile,
            edge_func_id: 0,
            edge_factors: EdgeFactorCache::new(),
            turn_func_id: 0,
            turn_factors: TurnCostFactorCache::new(),
        }
    }

    pub fn profile(&self) -> &Arc<dyn Profile> {
        &self.profile
    }

    pub fn name(&self) -> &str {
        self.profile.name()
    }

    fn sync(&mut self, network: &RoutingNetwork) {
        let edge_func_id = network.edge_types().func_id();
        if edge_func_id != self.edge_func_id {
            self.edge_factors = EdgeFactorCache::new();
            self.edge_func_id = edge_func_id;
        }
        let turn_func_id = network.turn_cost_types().func_id();
        if turn_func_id != self.turn_func_id {
            self.turn_factors = TurnCostFactorCache::new();
            self.turn_func_id = turn_func_id;
        }
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    /// Factor of the edge under the cursor, oriented so that `forward_*`
    /// describes the direction the cursor traverses it.
    pub fn edge_factor(&mut self, edge: &RoutingNetworkEdgeEnumerator<'_>) -> EdgeFactor {
        let network = edge.network();
        self.sync(network);

        let type_id = edge.edge_type_id();
        let stored = match self.edge_factors.get(type_id) {
            Some(factor) => factor,
            None => match network.edge_types().get_by_id(type_id) {
                Ok(attributes) => {
                    let factor = self.profile.factor(attributes);
                    self.edge_factors.set(type_id, factor);
                    factor
                }
                // Type id assigned outside the index; evaluate uncached.
                Err(_) => self.profile.factor(edge.attributes()),
            },
        };
        if edge.forward() { stored } else { stored.reverse() }
    }

    /// Weight of traversing the edge under the cursor, or `None` if the
    /// profile forbids travel in this direction.
    pub fn edge_weight(&mut self, edge: &RoutingNetworkEdgeEnumerator<'_>) -> RoutingResult<Option<f64>> {
        let factor = self.edge_factor(edge).factor(true);
        if factor == 0 {
            return Ok(None);
        }
        Ok(Some(edge.length_m()? * factor as f64))
    }

    /// Whether a route may start or end on the edge under the cursor.
    pub fn can_stop(&mut self, edge: &RoutingNetworkEdgeEnumerator<'_>) -> bool {
        let factor = self.edge_factor(edge);
        factor.can_stop && factor.is_traversable()
    }

    // ── Turns ─────────────────────────────────────────────────────────────

    pub fn turn_cost_factor(&mut self, network: &RoutingNetwork, type_id: u32, attributes: &[Attribute]) -> TurnCostFactor {
        self.sync(network);
        if let Some(factor) = self.turn_factors.get(type_id) {
            return factor;
        }
        let factor = self.profile.turn_cost_factor(attributes);
        self.turn_factors.set(type_id, factor);
        factor
    }

    /// Sum of the given turn costs, or `None` if any of them forbids the turn.
    pub fn turn_cost<'a>(
        &mut self,
        network: &RoutingNetwork,
        costs: impl IntoIterator<Item = TurnCost<'a>>,
    ) -> Option<f64> {
        let mut total = 0.0;
        for cost in costs {
            let factor = self.turn_cost_factor(network, cost.type_id, cost.attributes);
            total += factor.apply(cost.cost)?;
        }
        Some(total)
    }
}

impl std::fmt::Debug for ProfileHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileHandler")
            .field("profile", &self.profile.name())
            .field("edge_func_id", &self.edge_func_id)
            .field("turn_func_id", &self.turn_func_id)
            .finish_non_exhaustive()
    }
}
