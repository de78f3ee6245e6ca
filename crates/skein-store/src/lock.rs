//! Per-artefact lock table
//!
//! One mutex per artefact id, created on first use and retained for the
//! engine's lifetime. Acquisition is bounded: a caller that cannot take
//! the lock within the timeout gets `None` and surfaces `Busy` instead of
//! blocking indefinitely.

use dashmap::DashMap;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use skein_artefact::ArtefactId;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type LockGuard = ArcMutexGuard<RawMutex, ()>;

#[derive(Debug, Default)]
pub(crate) struct LockTable {
    locks: DashMap<ArtefactId, Arc<Mutex<()>>>,
}

impl LockTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bounded acquisition of the lock for one artefact
    ///
    /// Waiters are queued fairly, so same-artefact requests commit in
    /// submission order. Returns `None` when the wait exceeds `timeout`.
    pub(crate) fn acquire(&self, id: &ArtefactId, timeout: Duration) -> Option<LockGuard> {
        // Clone the Arc out of the shard before waiting, so a long wait
        // never holds the map shard.
        let lock = {
            let entry = self.locks.entry(id.clone()).or_default();
            Arc::clone(entry.value())
        };
        lock.try_lock_arc_for(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_artefact::ArtefactKind;

    fn id(slug: &str) -> ArtefactId {
        ArtefactId::new(ArtefactKind::Task, slug).unwrap()
    }

    #[test]
    fn second_acquire_times_out_while_held() {
        let table = LockTable::new();
        let guard = table.acquire(&id("a"), Duration::from_millis(10));
        assert!(guard.is_some());
        assert!(table.acquire(&id("a"), Duration::from_millis(10)).is_none());
    }

    #[test]
    fn release_makes_the_lock_available_again() {
        let table = LockTable::new();
        drop(table.acquire(&id("a"), Duration::from_millis(10)).unwrap());
        assert!(table.acquire(&id("a"), Duration::from_millis(10)).is_some());
    }

    #[test]
    fn different_artefacts_lock_independently() {
        let table = LockTable::new();
        let _a = table.acquire(&id("a"), Duration::from_millis(10)).unwrap();
        assert!(table.acquire(&id("b"), Duration::from_millis(10)).is_some());
    }
}
