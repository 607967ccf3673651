//! Cost factors produced by a [`Profile`](crate::Profile).
//!
//! # Units
//!
//! | Field            | Unit                                      |
//! |------------------|-------------------------------------------|
//! | `*_factor`       | weight per metre; `0` = not traversable   |
//! | `*_speed`        | centimetres per second (m/s × 100)        |
//!
//! Both types are `Copy` and hold no heap data.

/// Per-direction weight multipliers and speeds for one edge type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeFactor {
    pub forward_factor: u32,
    pub backward_factor: u32,
    pub forward_speed: u16,
    pub backward_speed: u16,
    /// Whether a route may start or end on this edge.
    pub can_stop: bool,
}

impl EdgeFactor {
    /// Not traversable in either direction.
    pub const NO_FACTOR: EdgeFactor = EdgeFactor {
        forward_factor: 0,
        backward_factor: 0,
        forward_speed: 0,
        backward_speed: 0,
        can_stop: false,
    };

    pub const fn new(
        forward_factor: u32,
        backward_factor: u32,
        forward_speed: u16,
        backward_speed: u16,
        can_stop: bool,
    ) -> Self {
        Self { forward_factor, backward_factor, forward_speed, backward_speed, can_stop }
    }

    /// Weight multiplier for travelling the edge `forward` or backward.
    #[inline]
    pub fn factor(&self, forward: bool) -> u32 {
        if forward { self.forward_factor } else { self.backward_factor }
    }

    /// Speed in m/s for the given direction.
    #[inline]
    pub fn speed_m_per_s(&self, forward: bool) -> f64 {
        let raw = if forward { self.forward_speed } else { self.backward_speed };
        raw as f64 / 100.0
    }

    #[inline]
    pub fn is_traversable(&self) -> bool {
        self.forward_factor > 0 || self.backward_factor > 0
    }

    /// The same factor seen from the other end of the edge.
    pub fn reverse(self) -> EdgeFactor {
        EdgeFactor {
            forward_factor: self.backward_factor,
            backward_factor: self.forward_factor,
            forward_speed: self.backward_speed,
            backward_speed: self.forward_speed,
            can_stop: self.can_stop,
        }
    }
}

/// Multiplier applied to the raw cost stored in a turn-cost table.
///
/// `EMPTY` ignores the table, `BINARY` turns any non-zero cost into a
/// forbidden turn; any other value scales the stored cost.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct TurnCostFactor(pub u32);

impl TurnCostFactor {
    pub const EMPTY: TurnCostFactor = TurnCostFactor(0);
    pub const BINARY: TurnCostFactor = TurnCostFactor(u32::MAX);

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }

    #[inline]
    pub fn is_binary(self) -> bool {
        self == Self::BINARY
    }

    /// Cost of a turn whose table entry is `cost`.
    ///
    /// Returns `None` if the turn is forbidden.
    #[inline]
    pub fn apply(self, cost: u32) -> Option<f64> {
        if self.is_binary() {
            return if cost > 0 { None } else { Some(0.0) };
        }
        Some(self.0 as f64 * cost as f64)
    }
}
