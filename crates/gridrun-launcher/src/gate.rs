//! Per-timestamp launch exclusion.
//!
//! At most one launch attempt holds the permit for a timestamp. Callers for
//! the same timestamp queue behind the holder; different timestamps never
//! wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use gridrun_core::Timestamp;

type Slots = Arc<Mutex<HashMap<Timestamp, Slot>>>;

struct Slot {
    lock: Arc<AsyncMutex<()>>,
    /// Holder plus waiters.
    users: usize,
}

/// Registry of in-flight launches keyed by timestamp.
#[derive(Clone, Default)]
pub struct LaunchGate {
    slots: Slots,
}

/// Exclusive right to launch one timestamp. Released on drop.
pub struct LaunchPermit {
    // Declared first so the lock is released before the registration.
    _guard: OwnedMutexGuard<()>,
    registration: Registration,
}

impl LaunchPermit {
    pub fn timestamp(&self) -> &Timestamp {
        &self.registration.timestamp
    }
}

/// Counts one user of a slot; removes the slot when the last user leaves.
struct Registration {
    timestamp: Timestamp,
    slots: Slots,
}

impl Drop for Registration {
    fn drop(&mut self) {
        let mut slots = lock(&self.slots);
        if let Some(slot) = slots.get_mut(&self.timestamp) {
            slot.users = slot.users.saturating_sub(1);
            if slot.users == 0 {
                slots.remove(&self.timestamp);
            }
        }
    }
}

fn lock(slots: &Slots) -> MutexGuard<'_, HashMap<Timestamp, Slot>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LaunchGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, timestamp: Timestamp) -> (Arc<AsyncMutex<()>>, Registration) {
        let mut slots = lock(&self.slots);
        let slot = slots.entry(timestamp).or_insert_with(|| Slot {
            lock: Arc::new(AsyncMutex::new(())),
            users: 0,
        });
        slot.users += 1;

        (
            slot.lock.clone(),
            Registration {
                timestamp,
                slots: self.slots.clone(),
            },
        )
    }

    /// Wait for the permit of `timestamp`.
    ///
    /// Dropping the returned future before it completes leaves the gate
    /// unchanged.
    pub async fn acquire(&self, timestamp: Timestamp) -> LaunchPermit {
        let (slot_lock, registration) = self.register(timestamp);
        let guard = slot_lock.lock_owned().await;
        debug!(timestamp = %timestamp, "Launch permit acquired");

        LaunchPermit {
            _guard: guard,
            registration,
        }
    }

    /// Take the permit of `timestamp` if nobody holds it.
    pub fn try_acquire(&self, timestamp: Timestamp) -> Option<LaunchPermit> {
        let (slot_lock, registration) = self.register(timestamp);
        let guard = slot_lock.try_lock_owned().ok()?;

        Some(LaunchPermit {
            _guard: guard,
            registration,
        })
    }

    /// Number of timestamps with a holder or a waiter.
    pub fn in_flight(&self) -> usize {
        lock(&self.slots).len()
    }
}
