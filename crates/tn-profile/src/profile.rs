//! The `Profile` trait.
//!
//! # Pluggability
//!
//! The routing core calls cost models only through this trait, so a
//! lookup table, a scripted profile or a hardcoded one are interchangeable.
//!
//! # Purity
//!
//! `factor` and `turn_cost_factor` must be pure functions of their input.
//! Results are cached per edge-type id; a profile whose output depends on
//! anything else would poison the cache.

use tn_core::Attribute;

use crate::{EdgeFactor, TurnCostFactor};

/// A cost model.
///
/// Implementations must be `Send + Sync` so one instance can serve many
/// concurrent searches.
pub trait Profile: Send + Sync {
    /// Unique name used to register the profile with a router db.
    fn name(&self) -> &str;

    /// Factor for an edge with the given (edge-type) attributes.
    fn factor(&self, attributes: &[Attribute]) -> EdgeFactor;

    /// Factor applied to a turn-cost table with the given attributes.
    fn turn_cost_factor(&self, attributes: &[Attribute]) -> TurnCostFactor;
}

/// A profile returning the same factor for every edge.  Turn costs are
/// applied as-is (factor 1), so restrictions stored with cost 1 add a unit
/// penalty rather than forbidding the turn.
#[derive(Clone, Debug)]
pub struct FixedProfile {
    name: String,
    factor: EdgeFactor,
    turn_cost_factor: TurnCostFactor,
}

impl FixedProfile {
    pub fn new(name: impl Into<String>, factor: EdgeFactor) -> Self {
        Self { name: name.into(), factor, turn_cost_factor: TurnCostFactor(1) }
    }

    /// Use `factor` for every turn-cost table instead of the default `1`.
    pub fn with_turn_cost_factor(mut self, factor: TurnCostFactor) -> Self {
        self.turn_cost_factor = factor;
        self
    }
}

impl Profile for FixedProfile {
    fn name(&self) -> &str {
        &self.name
    }

    fn factor(&self, _attributes: &[Attribute]) -> EdgeFactor {
        self.factor
    }

    fn turn_cost_factor(&self, attributes: &[Attribute]) -> TurnCostFactor {
        if attributes.is_empty() {
            return TurnCostFactor::EMPTY;
        }
        self.turn_cost_factor
    }
}
