//! Edge-type and turn-cost-type indexes.
//!
//! Full edge attributes (every OSM tag) are too fine-grained to cache cost
//! factors on.  A [`TypeFunc`] reduces them to the subset a cost model
//! actually looks at; the [`AttributeSetIndex`] then maps each distinct
//! reduced set to a small integer **type id**.  Profiles are evaluated once
//! per type id and cached.
//!
//! # Versioning
//!
//! Every `TypeFunc` carries an id.  Replacing the function (via
//! [`TypeIndex::next`]) bumps the id; caches keyed on the old id never hit
//! for the new one, so stale factors cannot leak across a profile change.
//! Id `0` is reserved for the built-in identity function.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use tn_core::{Attribute, canonicalize};

use crate::{NetworkError, NetworkResult};

/// Type id of the empty attribute set.
pub const EMPTY_TYPE_ID: u32 = 0;

type TypeFn = dyn Fn(&[Attribute]) -> Vec<Attribute> + Send + Sync;

/// A versioned, pure attribute-filtering function.
#[derive(Clone)]
pub struct TypeFunc {
    id: u32,
    func: Arc<TypeFn>,
}

impl TypeFunc {
    /// The identity function, id `0`.
    pub fn identity() -> Self {
        Self { id: 0, func: Arc::new(|a: &[Attribute]| a.to_vec()) }
    }

    /// A function with an explicit id.  Use a non-zero id for anything but
    /// the identity.
    pub fn new<F>(id: u32, func: F) -> Self
    where
        F: Fn(&[Attribute]) -> Vec<Attribute> + Send + Sync + 'static,
    {
        Self { id, func: Arc::new(func) }
    }

    /// Keep only attributes whose key is in `keys`.
    pub fn keep_keys(id: u32, keys: &[&str]) -> Self {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        Self::new(id, move |attributes: &[Attribute]| {
            attributes.iter().filter(|(k, _)| keys.contains(k)).cloned().collect()
        })
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn apply(&self, attributes: &[Attribute]) -> Vec<Attribute> {
        (self.func)(attributes)
    }
}

impl Default for TypeFunc {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for TypeFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeFunc").field("id", &self.id).finish_non_exhaustive()
    }
}

// ── AttributeSetIndex ─────────────────────────────────────────────────────────

/// Bidirectional map between canonical attribute sets and dense ids.
///
/// Id `0` is always the empty set; new sets get strictly increasing ids.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSetIndex {
    sets: Vec<Vec<Attribute>>,
    lookup: FxHashMap<Vec<Attribute>, u32>,
}

impl AttributeSetIndex {
    pub fn new() -> Self {
        let mut lookup = FxHashMap::default();
        lookup.insert(Vec::new(), EMPTY_TYPE_ID);
        Self { sets: vec![Vec::new()], lookup }
    }

    /// Id of `attributes`, adding the set if it is new.
    pub fn get(&mut self, attributes: &[Attribute]) -> u32 {
        let key = canonicalize(attributes.iter().cloned());
        if let Some(&id) = self.lookup.get(&key) {
            return id;
        }
        let id = self.sets.len() as u32;
        self.sets.push(key.clone());
        self.lookup.insert(key, id);
        id
    }

    /// Id of `attributes` if the set is already known.
    pub fn find(&self, attributes: &[Attribute]) -> Option<u32> {
        self.lookup.get(&canonicalize(attributes.iter().cloned())).copied()
    }

    /// The canonical set stored under `id`.
    pub fn get_by_id(&self, id: u32) -> NetworkResult<&[Attribute]> {
        self.sets
            .get(id as usize)
            .map(Vec::as_slice)
            .ok_or(NetworkError::TypeIdOutOfRange(id))
    }

    /// Number of sets, including the empty one.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.len() <= 1
    }

    pub(crate) fn sets(&self) -> &[Vec<Attribute>] {
        &self.sets
    }

    /// Rebuild from stored sets; `sets[0]` must be the empty set.
    pub(crate) fn from_sets(sets: Vec<Vec<Attribute>>) -> NetworkResult<Self> {
        if sets.first().is_none_or(|s| !s.is_empty()) {
            return Err(tn_core::CoreError::InvalidData(
                "attribute set index must start with the empty set".into(),
            )
            .into());
        }
        let lookup = sets.iter().enumerate().map(|(i, s)| (s.clone(), i as u32)).collect();
        Ok(Self { sets, lookup })
    }
}

impl Default for AttributeSetIndex {
    fn default() -> Self {
        Self::new()
    }
}

// ── TypeIndex ─────────────────────────────────────────────────────────────────

/// A [`TypeFunc`] paired with the set index it feeds.
///
/// The set index is shared between versions produced by [`next`](Self::next)
/// and copied only when one of them adds a new set.
#[derive(Clone, Debug)]
pub struct TypeIndex {
    func: TypeFunc,
    sets: Arc<AttributeSetIndex>,
}

/// Index used for edge attributes.
pub type EdgeTypeIndex = TypeIndex;
/// Index used for turn-cost table attributes.
pub type TurnCostTypeIndex = TypeIndex;

impl TypeIndex {
    pub fn new(func: TypeFunc) -> Self {
        Self { func, sets: Arc::new(AttributeSetIndex::new()) }
    }

    pub(crate) fn from_parts(func: TypeFunc, sets: AttributeSetIndex) -> Self {
        Self { func, sets: Arc::new(sets) }
    }

    /// A new version of this index using `func`, with its id bumped past the
    /// current one.  The known sets are shared.
    pub fn next<F>(&self, func: F) -> Self
    where
        F: Fn(&[Attribute]) -> Vec<Attribute> + Send + Sync + 'static,
    {
        Self {
            func: TypeFunc::new(self.func.id + 1, func),
            sets: Arc::clone(&self.sets),
        }
    }

    #[inline]
    pub fn func(&self) -> &TypeFunc {
        &self.func
    }

    /// Version id of the current type function.
    #[inline]
    pub fn func_id(&self) -> u32 {
        self.func.id
    }

    /// Type id for raw `attributes` (the function is applied first).
    pub fn get(&mut self, attributes: &[Attribute]) -> u32 {
        let reduced = self.func.apply(attributes);
        if let Some(id) = self.sets.find(&reduced) {
            return id;
        }
        Arc::make_mut(&mut self.sets).get(&reduced)
    }

    /// Type id for raw `attributes` if it is already known.
    pub fn find(&self, attributes: &[Attribute]) -> Option<u32> {
        self.sets.find(&self.func.apply(attributes))
    }

    pub fn get_by_id(&self, id: u32) -> NetworkResult<&[Attribute]> {
        self.sets.get_by_id(id)
    }

    pub fn sets(&self) -> &AttributeSetIndex {
        &self.sets
    }
}

impl Default for TypeIndex {
    fn default() -> Self {
        Self::new(TypeFunc::identity())
    }
}
