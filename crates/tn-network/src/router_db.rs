//! `RouterDb`: the shared, concurrently readable network container.

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::debug;

use tn_profile::Profile;

use crate::data_use::{DataUseListener, DataUseNotifier};
use crate::io::ReadOptions;
use crate::{NetworkConfig, NetworkResult, RoutingNetwork, RoutingNetworkWriter};

/// Owns the latest network snapshot and the registered profiles.
///
/// # Concurrency
///
/// * Readers call [`latest`](Self::latest) and keep the returned `Arc` for as
///   long as they need a consistent view; a snapshot never changes.
/// * One writer at a time: [`writer`](Self::writer) blocks until any other
///   writer is dropped.  Readers are never blocked by a writer except for the
///   pointer swap when it publishes.
pub struct RouterDb {
    latest: RwLock<Arc<RoutingNetwork>>,
    write_lock: Mutex<()>,
    profiles: RwLock<FxHashMap<String, Arc<dyn Profile>>>,
    usage: Arc<DataUseNotifier>,
}

impl RouterDb {
    pub fn new(config: &NetworkConfig) -> NetworkResult<Self> {
        let network = RoutingNetwork::new(config)?;
        Ok(Self::from_network(network))
    }

    fn from_network(network: RoutingNetwork) -> Self {
        let usage = Arc::clone(&network.usage);
        Self {
            latest: RwLock::new(Arc::new(network)),
            write_lock: Mutex::new(()),
            profiles: RwLock::new(FxHashMap::default()),
            usage,
        }
    }

    /// The current snapshot.
    pub fn latest(&self) -> Arc<RoutingNetwork> {
        Arc::clone(&self.latest.read())
    }

    /// Open the write scope.  Changes become visible when the writer drops.
    pub fn writer(&self) -> RoutingNetworkWriter<'_> {
        let guard = self.write_lock.lock();
        RoutingNetworkWriter::new(guard, &self.latest)
    }

    // ── Profiles ──────────────────────────────────────────────────────────

    /// Register `profile` under its name, replacing any profile of that name.
    pub fn add_profile(&self, profile: Arc<dyn Profile>) {
        let name = profile.name().to_string();
        debug!(profile = %name, "profile registered");
        self.profiles.write().insert(name, profile);
    }

    pub fn profile(&self, name: &str) -> Option<Arc<dyn Profile>> {
        self.profiles.read().get(name).cloned()
    }

    /// Names of the registered profiles, sorted.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    // ── Data use ──────────────────────────────────────────────────────────

    pub fn usage(&self) -> &Arc<DataUseNotifier> {
        &self.usage
    }

    pub fn add_listener(&self, listener: Arc<dyn DataUseListener>) {
        self.usage.add_listener(listener);
    }

    // ── Persistence ───────────────────────────────────────────────────────

    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> NetworkResult<()> {
        self.latest().write_to(writer)
    }

    /// A router db holding the network read from `reader`.  Profiles are
    /// code and must be registered again.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R, options: &ReadOptions) -> NetworkResult<Self> {
        let network = RoutingNetwork::read_from(reader, options)?;
        Ok(Self::from_network(network))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> NetworkResult<()> {
        self.latest().save(path)
    }

    pub fn load(path: impl AsRef<Path>, options: &ReadOptions) -> NetworkResult<Self> {
        Ok(Self::from_network(RoutingNetwork::load(path, options)?))
    }
}

impl std::fmt::Debug for RouterDb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterDb")
            .field("zoom", &self.latest().zoom())
            .field("profiles", &self.profile_names())
            .finish_non_exhaustive()
    }
}
