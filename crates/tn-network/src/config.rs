//! Network construction parameters.

use tn_core::CoreResult;
use tn_core::tiles::check_zoom;

/// Zoom used when none is given.
pub const DEFAULT_ZOOM: u32 = 14;

/// Parameters fixed for the lifetime of a network.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    /// Tile zoom every vertex and edge id is computed at.
    pub zoom: u32,
}

impl NetworkConfig {
    pub fn with_zoom(zoom: u32) -> Self {
        Self { zoom }
    }

    /// Fail if the zoom cannot address tiles with a `u32` local id.
    pub fn validate(&self) -> CoreResult<()> {
        check_zoom(self.zoom)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { zoom: DEFAULT_ZOOM }
    }
}
