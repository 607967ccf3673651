//! `tn-routing`: searches over a `tn-network` snapshot.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                 |
//! |------------------|----------------------------------------------------------|
//! | [`cost`]         | `ProfileHandler`: cached edge weights and turn costs     |
//! | [`snap`]         | `SnapPoint`, `Snapper` (R-tree over edge segments)       |
//! | [`path`]         | `Path`, `PathSegment`                                    |
//! | [`dijkstra`]     | edge-based one-to-one / one-to-many search               |
//! | [`many_to_many`] | parallel many-to-many over the Rayon pool                |
//! | [`route`]        | `Route`, `RouteBuilder`, `DefaultRouteBuilder`           |
//! | [`router`]       | `Router` facade, `RouterSettings`                        |
//! | [`error`]        | `RoutingError`, `RoutingResult<T>`                       |
//!
//! # Typical use
//!
//! ```ignore
//! let router = Router::new(&db);
//! let from = router.snap_for("car", a)?;
//! let to = router.snap_for("car", b)?;
//! let route = router.route("car", from, to)?;
//! ```

pub mod cost;
pub mod dijkstra;
pub mod error;
pub mod many_to_many;
pub mod path;
pub mod route;
pub mod router;
pub mod snap;

#[cfg(test)]
mod tests;

pub use cost::ProfileHandler;
pub use dijkstra::{SearchBound, WeightedPath};
pub use error::{RoutingError, RoutingResult};
pub use many_to_many::many_to_many;
pub use path::{Path, PathSegment};
pub use route::{DefaultRouteBuilder, Route, RouteBuilder};
pub use router::{Router, RouterSettings};
pub use snap::{SnapPoint, Snapper};
