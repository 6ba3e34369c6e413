//! Price observers
//!
//! Observers are held by `Weak` reference: registering does not keep an
//! observer alive, and dropped observers are pruned on the next notify.
//! Every call runs inside its own failure boundary, so an error or panic in
//! one observer never reaches the others or the calling loop.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use futures_util::FutureExt;
use meridian_core::LiveTicker;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::error::ObserverError;

/// Callback invoked with every new live ticker
#[async_trait]
pub trait PriceObserver: Send + Sync {
    async fn on_price(&self, ticker: &LiveTicker) -> Result<(), ObserverError>;

    fn name(&self) -> &str {
        "PriceObserver"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

#[derive(Clone)]
struct Entry {
    id: ObserverId,
    observer: Weak<dyn PriceObserver>,
}

impl Entry {
    fn is(&self, observer: &Arc<dyn PriceObserver>) -> bool {
        std::ptr::addr_eq(self.observer.as_ptr(), Arc::as_ptr(observer))
    }
}

/// Registration list of price observers
#[derive(Default)]
pub struct ObserverSet {
    entries: ArcSwap<Vec<Entry>>,
    next_id: AtomicU64,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `observer`. Registering the same observer again returns the
    /// id it already has.
    pub fn add(&self, observer: &Arc<dyn PriceObserver>) -> ObserverId {
        let fresh = ObserverId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut assigned = fresh;

        self.entries.rcu(|current| {
            let mut next = Vec::clone(current);
            match next.iter().find(|e| e.is(observer)) {
                Some(existing) => assigned = existing.id,
                None => {
                    assigned = fresh;
                    next.push(Entry {
                        id: fresh,
                        observer: Arc::downgrade(observer),
                    });
                }
            }
            next
        });

        assigned
    }

    /// Unregister an observer; `false` if it was not registered
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut removed = false;
        self.entries.rcu(|current| {
            let mut next = Vec::clone(current);
            let before = next.len();
            next.retain(|e| e.id != id);
            removed = next.len() != before;
            next
        });
        removed
    }

    /// Live observers (dropped ones are not counted)
    pub fn len(&self) -> usize {
        self.entries
            .load()
            .iter()
            .filter(|e| e.observer.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every live observer in registration order.
    ///
    /// Returns the number of observers that failed.
    pub async fn notify(&self, ticker: &LiveTicker) -> usize {
        let entries = self.entries.load_full();
        let mut failures = 0;
        let mut dropped = Vec::new();

        for entry in entries.iter() {
            let Some(observer) = entry.observer.upgrade() else {
                dropped.push(entry.id);
                continue;
            };

            let outcome = AssertUnwindSafe(observer.on_price(ticker))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(ObserverError::Panicked(panic_message(panic))));

            if let Err(e) = outcome {
                log::error!(
                    "[Observers] {} failed on {}: {}",
                    observer.name(),
                    ticker.symbol,
                    e
                );
                failures += 1;
            }
        }

        for id in dropped {
            self.remove(id);
        }
        failures
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
