//! Lookup-table profile configured from JSON.
//!
//! ```json
//! {
//!   "name": "car",
//!   "key": "highway",
//!   "speeds_kmh": { "motorway": 120, "primary": 90, "residential": 50 },
//!   "stoppable": ["primary", "residential"],
//!   "respect_restrictions": true
//! }
//! ```
//!
//! Edge weight is time-based: the factor is the number of seconds needed to
//! travel one kilometre, so `weight = length_m × factor` is proportional to
//! travel time.

use std::collections::BTreeMap;

use serde::Deserialize;

use tn_core::{Attribute, attributes};

use crate::{EdgeFactor, Profile, ProfileError, ProfileResult, TurnCostFactor};

fn default_oneway_key() -> String {
    "oneway".to_string()
}

fn default_true() -> bool {
    true
}

/// Deserializable description of a [`TableProfile`].
#[derive(Clone, Debug, Deserialize)]
pub struct TableProfileConfig {
    pub name: String,
    /// Attribute key whose value selects the speed, e.g. `"highway"`.
    pub key: String,
    /// Speed per value of `key`.  Values not listed are not traversable.
    pub speeds_kmh: BTreeMap<String, f64>,
    /// Values of `key` on which a route may start or stop.  Empty means all.
    #[serde(default)]
    pub stoppable: Vec<String>,
    #[serde(default = "default_oneway_key")]
    pub oneway_key: String,
    /// Treat turn-cost tables tagged `type=restriction` as forbidden turns.
    #[serde(default = "default_true")]
    pub respect_restrictions: bool,
}

/// A [`Profile`] backed by a value → speed table.
#[derive(Clone, Debug)]
pub struct TableProfile {
    config: TableProfileConfig,
}

impl TableProfile {
    /// Validate `config` and build the profile.
    pub fn from_config(config: TableProfileConfig) -> ProfileResult<Self> {
        if config.name.is_empty() {
            return Err(ProfileError::Config("profile name is empty".into()));
        }
        if let Some((value, speed)) = config
            .speeds_kmh
            .iter()
            .find(|(_, s)| !(s.is_finite() && **s > 0.0 && **s < 2_000.0))
        {
            return Err(ProfileError::Config(format!(
                "speed for {}={value} must be positive, got {speed}",
                config.key
            )));
        }
        Ok(Self { config })
    }

    pub fn from_json(json: &str) -> ProfileResult<Self> {
        Self::from_config(serde_json::from_str(json)?)
    }

    pub fn config(&self) -> &TableProfileConfig {
        &self.config
    }
}

impl Profile for TableProfile {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn factor(&self, attributes: &[Attribute]) -> EdgeFactor {
        let Some(value) = attributes::find(attributes, &self.config.key) else {
            return EdgeFactor::NO_FACTOR;
        };
        let Some(&speed_kmh) = self.config.speeds_kmh.get(value) else {
            return EdgeFactor::NO_FACTOR;
        };

        let factor = (3_600.0 / speed_kmh).round().max(1.0) as u32;
        let speed = (speed_kmh / 3.6 * 100.0).round() as u16;
        let can_stop = self.config.stoppable.is_empty()
            || self.config.stoppable.iter().any(|s| s == value);

        let (forward, backward) = match attributes::find(attributes, &self.config.oneway_key) {
            Some("yes" | "true" | "1") => (true, false),
            Some("-1" | "reverse") => (false, true),
            _ => (true, true),
        };

        EdgeFactor {
            forward_factor: if forward { factor } else { 0 },
            backward_factor: if backward { factor } else { 0 },
            forward_speed: if forward { speed } else { 0 },
            backward_speed: if backward { speed } else { 0 },
            can_stop,
        }
    }

    fn turn_cost_factor(&self, attributes: &[Attribute]) -> TurnCostFactor {
        if attributes.is_empty() {
            return TurnCostFactor::EMPTY;
        }
        if self.config.respect_restrictions
            && attributes::find(attributes, "type") == Some("restriction")
        {
            return TurnCostFactor::BINARY;
        }
        TurnCostFactor(1)
    }
}
