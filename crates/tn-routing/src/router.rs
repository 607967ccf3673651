//! The `Router` facade.
//!
//! A router pins one network snapshot for its lifetime: every query made
//! through it sees the same graph even if a writer publishes in between.

use std::sync::Arc;

use tracing::debug;

use tn_core::{Coordinate, VertexId};
use tn_network::{RouterDb, RoutingNetwork};

use crate::dijkstra::{self, SearchBound, WeightedPath};
use crate::snap::DEFAULT_SNAP_DISTANCE_M;
use crate::{
    DefaultRouteBuilder, ProfileHandler, Route, RouteBuilder, RoutingError, RoutingResult, SnapPoint, Snapper,
    many_to_many,
};

/// Search limits.
#[derive(Clone, Debug, PartialEq)]
pub struct RouterSettings {
    /// Stop expanding past vertices farther than this from the source.
    pub max_distance_m: Option<f64>,
    /// Search radius for [`Router::snap`].
    pub snap_distance_m: f64,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self { max_distance_m: None, snap_distance_m: DEFAULT_SNAP_DISTANCE_M }
    }
}

pub struct Router<'db> {
    db: &'db RouterDb,
    network: Arc<RoutingNetwork>,
    settings: RouterSettings,
    builder: Arc<dyn RouteBuilder>,
}

impl<'db> Router<'db> {
    /// A router over the db's latest snapshot.
    pub fn new(db: &'db RouterDb) -> Self {
        Self {
            db,
            network: db.latest(),
            settings: RouterSettings::default(),
            builder: Arc::new(DefaultRouteBuilder),
        }
    }

    pub fn with_settings(mut self, settings: RouterSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_builder(mut self, builder: Arc<dyn RouteBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn network(&self) -> &Arc<RoutingNetwork> {
        &self.network
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// A fresh handler for the profile registered as `profile`.
    pub fn handler(&self, profile: &str) -> RoutingResult<ProfileHandler> {
        self.db
            .profile(profile)
            .map(ProfileHandler::new)
            .ok_or_else(|| RoutingError::UnknownProfile(profile.to_string()))
    }

    // ── Snapping ──────────────────────────────────────────────────────────

    pub fn snap(&self, location: Coordinate) -> RoutingResult<SnapPoint> {
        self.snapper().snap(location)
    }

    /// Snap to an edge `profile` can start or stop on.
    pub fn snap_for(&self, profile: &str, location: Coordinate) -> RoutingResult<SnapPoint> {
        let mut handler = self.handler(profile)?;
        self.snapper().snap_for(location, &mut handler)
    }

    /// A point on `vertex`, on an edge `profile` can start or stop on.
    pub fn snap_vertex(&self, profile: &str, vertex: VertexId) -> RoutingResult<SnapPoint> {
        let mut handler = self.handler(profile)?;
        SnapPoint::from_vertex_for(&self.network, vertex, &mut handler)
    }

    fn snapper(&self) -> Snapper<'_> {
        Snapper::new(&self.network).with_max_distance_m(self.settings.snap_distance_m)
    }

    // ── Searches ──────────────────────────────────────────────────────────

    pub fn path(&self, profile: &str, source: SnapPoint, target: SnapPoint) -> RoutingResult<WeightedPath> {
        let mut handler = self.handler(profile)?;
        self.path_with(&mut handler, source, target)
    }

    /// Like [`path`](Self::path), reusing the caches in `handler`.
    pub fn path_with(
        &self,
        handler: &mut ProfileHandler,
        source: SnapPoint,
        target: SnapPoint,
    ) -> RoutingResult<WeightedPath> {
        let network = &*self.network;
        let bound = SearchBound { origin: source.location(network)?, max_distance_m: self.settings.max_distance_m };
        let found = dijkstra::one_to_one(network, handler, source, target, |vertex, _| bound.prunes(network, vertex))?;
        found.ok_or_else(|| {
            debug!(profile = handler.name(), from = %source, to = %target, "no route");
            RoutingError::NoRoute { from: source, to: target }
        })
    }

    pub fn route(&self, profile: &str, source: SnapPoint, target: SnapPoint) -> RoutingResult<Route> {
        let mut handler = self.handler(profile)?;
        self.route_with(&mut handler, source, target)
    }

    pub fn route_with(&self, handler: &mut ProfileHandler, source: SnapPoint, target: SnapPoint) -> RoutingResult<Route> {
        let found = self.path_with(handler, source, target)?;
        self.builder.build(&self.network, handler, &found.path)
    }

    /// Paths between every source and target; see
    /// [`many_to_many`](crate::many_to_many()).
    pub fn many_to_many(
        &self,
        profile: &str,
        sources: &[SnapPoint],
        targets: &[SnapPoint],
    ) -> RoutingResult<Vec<RoutingResult<Vec<RoutingResult<WeightedPath>>>>> {
        let profile = self
            .db
            .profile(profile)
            .ok_or_else(|| RoutingError::UnknownProfile(profile.to_string()))?;
        Ok(many_to_many(&self.network, &profile, sources, targets, self.settings.max_distance_m))
    }
}

impl std::fmt::Debug for Router<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("zoom", &self.network.zoom())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
