//! Echo guard: recognise the platform's notifications for our own writes.
//!
//! Committing a quantity to a sibling makes the platform emit an
//! inventory-level change for that sibling, which would start another run
//! for the same SKU. Those runs converge (every sibling already holds the
//! value) but cost three catalog calls each. A guard lets the orchestrator
//! skip them.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use skusync_core::{InventoryItemId, LocationId};
use skusync_events::ChangeEvent;

use crate::reconcile::QuantityAssignment;

pub trait EchoGuard: Send + Sync + 'static {
    /// Whether `event` is the echo of a write recorded earlier. A positive
    /// answer consumes the record.
    fn is_echo(&self, event: &ChangeEvent) -> bool;

    /// Remember writes applied on behalf of `trigger`.
    fn record(&self, trigger: &ChangeEvent, applied: &[&QuantityAssignment]);
}

/// Never suppresses anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEchoGuard;

impl EchoGuard for NoEchoGuard {
    fn is_echo(&self, _event: &ChangeEvent) -> bool {
        false
    }

    fn record(&self, _trigger: &ChangeEvent, _applied: &[&QuantityAssignment]) {}
}

/// Remembers `(item, location) -> quantity` of recent writes for `ttl`.
///
/// The trigger record itself is not remembered: re-asserting its own value
/// does not change it, so the platform has nothing to echo. A record is
/// dropped as soon as any newer level for its key is seen, since a write to
/// a sibling that already held the value never produces an echo.
#[derive(Debug)]
pub struct RecentCommitGuard {
    ttl: Duration,
    recent: Mutex<HashMap<(InventoryItemId, LocationId), (i64, Instant)>>,
}

impl RecentCommitGuard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            recent: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EchoGuard for RecentCommitGuard {
    fn is_echo(&self, event: &ChangeEvent) -> bool {
        let key = (event.item_id().clone(), event.location_id().clone());
        let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);

        let seen = recent
            .get(&key)
            .map(|(quantity, at)| (*quantity, at.elapsed() > self.ttl));

        match seen {
            Some((quantity, expired)) => {
                recent.remove(&key);
                !expired && quantity == event.new_quantity()
            }
            None => false,
        }
    }

    fn record(&self, trigger: &ChangeEvent, applied: &[&QuantityAssignment]) {
        let now = Instant::now();
        let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);

        recent.retain(|_, (_, at)| at.elapsed() <= self.ttl);
        // The trigger carries the current level of its own key.
        recent.remove(&(trigger.item_id().clone(), trigger.location_id().clone()));
        for a in applied {
            if &a.item_id == trigger.item_id() {
                continue;
            }
            recent.insert((a.item_id.clone(), a.location_id.clone()), (a.quantity, now));
        }
    }
}
