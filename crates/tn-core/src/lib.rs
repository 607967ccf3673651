//! `tn-core`: foundational types for the `tilenet` routing engine.
//!
//! This crate is a dependency of every other `tn-*` crate.  It has no `tn-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module         | Contents                                               |
//! |----------------|--------------------------------------------------------|
//! | [`ids`]        | `VertexId`, `EdgeId`                                   |
//! | [`tiles`]      | `Tile`, local-id encoding, tiles-in-box iteration      |
//! | [`geo`]        | `Coordinate`, `BoundingBox`, haversine, polylines      |
//! | [`attributes`] | `Attribute`, canonicalization                          |
//! | [`codec`]      | varint / string / float read-write extension traits    |
//! | [`error`]      | `CoreError`, `CoreResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, tiles, coordinates. |

pub mod attributes;
pub mod codec;
pub mod error;
pub mod geo;
pub mod ids;
pub mod tiles;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use attributes::{Attribute, canonicalize};
pub use codec::{ReadExt, WriteExt};
pub use error::{CoreError, CoreResult};
pub use geo::{BoundingBox, Coordinate};
pub use ids::{EdgeId, VertexId};
pub use tiles::Tile;
