//! `tn-network`: the tiled road graph.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                     |
//! |------------------|--------------------------------------------------------------|
//! | [`sparse`]       | `SparseArray<T>`: block-allocated, copy-on-write storage     |
//! | [`tile`]         | `NetworkTile`, its cursor, turn-cost tables, tile format     |
//! | [`types`]        | `TypeFunc`, `TypeIndex` (edge types and turn-cost types)     |
//! | [`network`]      | `RoutingNetwork` snapshot, vertex search                     |
//! | [`enumerator`]   | network-wide edge and vertex cursors                         |
//! | [`writer`]       | `RoutingNetworkWriter`, `EdgeOptions`                        |
//! | [`restrictions`] | `NetworkRestriction` and its inversion                       |
//! | [`router_db`]    | `RouterDb`: latest snapshot, writer lock, profiles           |
//! | [`data_use`]     | `DataUseListener`, `DataUseNotifier`                         |
//! | [`config`]       | `NetworkConfig`                                              |
//! | [`error`]        | `NetworkError`, `NetworkResult<T>`                           |
//!
//! # Snapshots
//!
//! Readers hold an `Arc<RoutingNetwork>` that never changes.  All mutation
//! goes through a writer obtained from [`RouterDb::writer`], which edits a
//! private copy and publishes it when dropped.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `NetworkConfig`. |

pub mod config;
pub mod data_use;
pub mod enumerator;
pub mod error;
pub mod io;
pub mod network;
pub mod restrictions;
pub mod router_db;
pub mod sparse;
pub mod tile;
pub mod types;
pub mod writer;


pub use config::NetworkConfig;
pub use data_use::{DataUseListener, DataUseNotifier, ListenerError};
pub use enumerator::{MAX_OFFSET, RoutingNetworkEdgeEnumerator, RoutingNetworkVertexEnumerator, offset_fraction};
pub use error::{NetworkError, NetworkResult};
pub use io::ReadOptions;
pub use network::RoutingNetwork;
pub use restrictions::NetworkRestriction;
pub use router_db::RouterDb;
pub use sparse::SparseArray;
pub use tile::{NetworkTile, TurnCost};
pub use types::{EdgeTypeIndex, TurnCostTypeIndex, TypeFunc, TypeIndex};
pub use writer::{EdgeOptions, RoutingNetworkWriter};
