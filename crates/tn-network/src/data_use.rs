//! Data-use notifications.
//!
//! Listeners learn which parts of the network a reader is about to use, so
//! an external provider (a lazy tile loader, say) can fetch data before the
//! search needs it.  Both callbacks default to no-ops.
//!
//! Listener failures never reach the reader: the notifier logs them at
//! `warn` level and carries on, and the search proceeds with whatever data is
//! already loaded.

use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use tn_core::{BoundingBox, VertexId};

use crate::RoutingNetwork;

/// Error type listeners may return.
pub type ListenerError = Box<dyn Error + Send + Sync>;

#[async_trait]
pub trait DataUseListener: Send + Sync {
    /// A reader is about to use `vertex`.
    async fn vertex_touched(
        &self,
        _network: &RoutingNetwork,
        _vertex: VertexId,
    ) -> Result<(), ListenerError> {
        Ok(())
    }

    /// A reader is about to use the area `bbox`.  Long-running work should
    /// poll `cancel` and return early once it fires.
    async fn box_touched(
        &self,
        _network: &RoutingNetwork,
        _bbox: BoundingBox,
        _cancel: &CancellationToken,
    ) -> Result<(), ListenerError> {
        Ok(())
    }
}

/// Broadcasts touches to every registered listener, in registration order.
#[derive(Default)]
pub struct DataUseNotifier {
    listeners: RwLock<Vec<Arc<dyn DataUseListener>>>,
}

impl DataUseNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn DataUseListener>) {
        self.listeners.write().push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Snapshot of the listener list; the lock is never held across an await.
    fn snapshot(&self) -> Vec<Arc<dyn DataUseListener>> {
        self.listeners.read().clone()
    }

    pub async fn notify_vertex(&self, network: &RoutingNetwork, vertex: VertexId) {
        for listener in self.snapshot() {
            if let Err(error) = listener.vertex_touched(network, vertex).await {
                warn!(%vertex, %error, "data-use listener failed on vertex touch");
            }
        }
    }

    /// Notify every listener of `bbox`, stopping between listeners once
    /// `cancel` fires.
    pub async fn notify_box(
        &self,
        network: &RoutingNetwork,
        bbox: BoundingBox,
        cancel: &CancellationToken,
    ) {
        for listener in self.snapshot() {
            if cancel.is_cancelled() {
                return;
            }
            if let Err(error) = listener.box_touched(network, bbox, cancel).await {
                warn!(?bbox, %error, "data-use listener failed on box touch");
            }
        }
    }
}

impl std::fmt::Debug for DataUseNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataUseNotifier").field("listeners", &self.listener_count()).finish()
    }
}
