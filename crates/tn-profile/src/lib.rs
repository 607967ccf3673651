//! `tn-profile`: pluggable cost models.
//!
//! The routing core only ever sees a [`Profile`]: a pure function from an
//! attribute set to an [`EdgeFactor`] (edges) or a [`TurnCostFactor`] (turn
//! cost tables).  Because profiles are pure, their results can be memoized
//! per edge-type id in an [`EdgeFactorCache`] / [`TurnCostFactorCache`].
//!
//! # Crate layout
//!
//! | Module      | Contents                                                 |
//! |-------------|----------------------------------------------------------|
//! | [`factor`]  | `EdgeFactor`, `TurnCostFactor`                           |
//! | [`profile`] | `Profile` trait, `FixedProfile`                          |
//! | [`cache`]   | `FactorCache<T>`, `EdgeFactorCache`, `TurnCostFactorCache` |
//! | [`table`]   | `TableProfile`, `TableProfileConfig` (JSON-configurable)  |
//! | [`error`]   | `ProfileError`, `ProfileResult<T>`                       |

pub mod cache;
pub mod error;
pub mod factor;
pub mod profile;
pub mod table;

#[cfg(test)]
mod tests;

pub use cache::{EdgeFactorCache, FactorCache, TurnCostFactorCache};
pub use error::{ProfileError, ProfileResult};
pub use factor::{EdgeFactor, TurnCostFactor};
pub use profile::{FixedProfile, Profile};
pub use table::{TableProfile, TableProfileConfig};
