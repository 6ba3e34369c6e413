//! Live subscriber set
//!
//! The set is an immutable map behind an `ArcSwap`. A broadcast sweep loads
//! the current map once and delivers to exactly those connections; joins and
//! removals publish a new map and never disturb a sweep in progress.

use arc_swap::ArcSwap;
use dashmap::DashMap;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::connection::{Connection, ConnectionId};

type ConnectionSet = HashMap<ConnectionId, Arc<dyn Connection>>;

/// Result of one broadcast sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Connections whose send failed; already removed from the set
    pub failed: Vec<ConnectionId>,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: ArcSwap<ConnectionSet>,
    /// Inbound drain task per connection
    drains: DashMap<ConnectionId, JoinHandle<()>>,
}

impl ConnectionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a subscriber.
    ///
    /// `inbound` is drained and ignored; when it closes, the connection is
    /// disconnected.
    pub fn accept(
        self: &Arc<Self>,
        connection: Arc<dyn Connection>,
        mut inbound: mpsc::Receiver<String>,
    ) -> ConnectionId {
        let id = connection.id();
        self.connections.rcu(|current| {
            let mut next = ConnectionSet::clone(current);
            next.insert(id, Arc::clone(&connection));
            next
        });

        let registry: Weak<Self> = Arc::downgrade(self);
        let drain = tokio::spawn(async move {
            while inbound.recv().await.is_some() {}
            log::debug!("[Registry] client {} hung up", id);
            if let Some(registry) = registry.upgrade() {
                registry.remove(&[id]);
            }
        });
        if let Some(previous) = self.drains.insert(id, drain) {
            previous.abort();
        }

        log::info!("[Registry] client {} connected ({} live)", id, self.len());
        id
    }

    /// Remove a subscriber. Removing an absent connection is a no-op.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let removed = self.remove(&[id]) > 0;
        if removed {
            log::info!("[Registry] client {} disconnected ({} live)", id, self.len());
        }
        removed
    }

    /// Deliver `payload` to every connection in the current set.
    ///
    /// A failed delivery does not stop the sweep; all failed connections are
    /// pruned together once it is over.
    pub async fn broadcast(&self, payload: &str) -> BroadcastReport {
        let sweep = self.connections.load_full();
        if sweep.is_empty() {
            return BroadcastReport::default();
        }

        let results = join_all(
            sweep
                .iter()
                .map(|(id, connection)| async move { (*id, connection.send(payload).await) }),
        )
        .await;

        let mut report = BroadcastReport::default();
        for (id, result) in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    log::warn!("[Registry] send to {} failed: {}", id, e);
                    report.failed.push(id);
                }
            }
        }

        if !report.failed.is_empty() {
            let removed = self.remove(&report.failed);
            log::info!(
                "[Registry] pruned {} failed client(s) ({} live)",
                removed,
                self.len()
            );
        }
        report
    }

    /// Close every connection and empty the set.
    ///
    /// Best effort: each close runs regardless of the others failing.
    /// Returns the number of closes that failed.
    pub async fn close_all(&self) -> usize {
        let closing = self.connections.swap(Arc::new(ConnectionSet::new()));

        let drains: Vec<ConnectionId> = self.drains.iter().map(|e| *e.key()).collect();
        for id in drains {
            if let Some((_, drain)) = self.drains.remove(&id) {
                drain.abort();
            }
        }

        let results = join_all(closing.values().map(|connection| async move {
            (connection.id(), connection.close().await)
        }))
        .await;

        let mut failures = 0;
        for (id, result) in results {
            if let Err(e) = result {
                log::warn!("[Registry] closing {} failed: {}", id, e);
                failures += 1;
            }
        }

        log::info!(
            "[Registry] closed {} connection(s), {} failed",
            closing.len(),
            failures
        );
        failures
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.load().contains_key(&id)
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.load().keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.connections.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.load().is_empty()
    }

    /// Remove `ids` in one replacement, returning how many were present
    fn remove(&self, ids: &[ConnectionId]) -> usize {
        let mut removed = 0;
        self.connections.rcu(|current| {
            let mut next = ConnectionSet::clone(current);
            removed = ids.iter().filter(|id| next.remove(id).is_some()).count();
            next
        });

        for id in ids {
            if let Some((_, drain)) = self.drains.remove(id) {
                drain.abort();
            }
        }
        removed
    }
}
