//! Parallel many-to-many search.
//!
//! One edge-based search per source, fanned out over the Rayon pool.  Each
//! worker owns its own [`ProfileHandler`] so factor caches are never shared
//! between threads.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use tn_network::RoutingNetwork;
use tn_profile::Profile;

use crate::dijkstra::{self, SearchBound, WeightedPath};
use crate::{ProfileHandler, RoutingError, RoutingResult, SnapPoint};

/// Best paths between every source and every target.
///
/// `result[i][j]` is the path from `sources[i]` to `targets[j]`.  A missing
/// route is a per-pair [`RoutingError::NoRoute`]; an error that stops a whole
/// search (a broken network) fails that source's row only.
pub fn many_to_many(
    network: &RoutingNetwork,
    profile: &Arc<dyn Profile>,
    sources: &[SnapPoint],
    targets: &[SnapPoint],
    max_distance_m: Option<f64>,
) -> Vec<RoutingResult<Vec<RoutingResult<WeightedPath>>>> {
    debug!(profile = profile.name(), sources = sources.len(), targets = targets.len(), "many-to-many");
    sources
        .par_iter()
        .map_init(
            || ProfileHandler::new(Arc::clone(profile)),
            |handler, &source| -> RoutingResult<Vec<RoutingResult<WeightedPath>>> {
                let origin = source.location(network)?;
                let bound = SearchBound { origin, max_distance_m };
                let found = dijkstra::one_to_many(network, handler, source, targets, |vertex, _| {
                    bound.prunes(network, vertex)
                })?;
                Ok(found
                    .into_iter()
                    .zip(targets)
                    .map(|(path, &target)| path.ok_or(RoutingError::NoRoute { from: source, to: target }))
                    .collect())
            },
        )
        .collect()
}
