//! Bounded in-memory request logs.
//!
//! # Design Decisions
//! - FIFO eviction: appending past capacity drops the oldest entry
//! - A single mutex guards each log, so append and eviction are one step
//! - Snapshots copy out; callers never hold the lock

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::capture::record::LogRecord;
use crate::config::LogsConfig;
use crate::observability::metrics;

/// A fixed-capacity ordered log, oldest entry first.
#[derive(Debug)]
pub struct BoundedLog<T> {
    entries: Mutex<VecDeque<T>>,
    capacity: usize,
}

impl<T: Clone> BoundedLog<T> {
    /// Create an empty log. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an entry, returning how many old entries were evicted.
    pub fn append(&self, entry: T) -> usize {
        let mut entries = self.lock();
        entries.push_back(entry);
        let mut evicted = 0;
        while entries.len() > self.capacity {
            entries.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Copy of the current contents, oldest to newest.
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().iter().cloned().collect()
    }

    /// Copy of the current contents, newest first.
    pub fn snapshot_newest_first(&self) -> Vec<T> {
        self.lock().iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic mid-append cannot leave the deque half-updated, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The pair of logs shared by every handler.
#[derive(Debug)]
pub struct LogStore {
    requests: BoundedLog<Arc<LogRecord>>,
    attacks: BoundedLog<Arc<LogRecord>>,
    captured_total: AtomicU64,
}

impl LogStore {
    pub fn new(config: &LogsConfig) -> Self {
        Self {
            requests: BoundedLog::new(config.request_capacity),
            attacks: BoundedLog::new(config.attack_capacity),
            captured_total: AtomicU64::new(0),
        }
    }

    /// Append a record to the full log, and to the attack log if flagged.
    pub fn record(&self, record: LogRecord) -> Arc<LogRecord> {
        let record = Arc::new(record);
        self.captured_total.fetch_add(1, Ordering::Relaxed);

        let evicted = self.requests.append(Arc::clone(&record));
        metrics::record_evictions("requests", evicted);

        if record.is_attack {
            let evicted = self.attacks.append(Arc::clone(&record));
            metrics::record_evictions("attacks", evicted);
        }
        record
    }

    pub fn requests(&self) -> &BoundedLog<Arc<LogRecord>> {
        &self.requests
    }

    pub fn attacks(&self) -> &BoundedLog<Arc<LogRecord>> {
        &self.attacks
    }

    /// Requests captured since startup, including evicted ones.
    pub fn captured_total(&self) -> u64 {
        self.captured_total.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::record::InboundRequest;
    use axum::http::HeaderMap;
    use std::thread;

    fn record(body: &str) -> LogRecord {
        let headers = HeaderMap::new();
        LogRecord::build(&InboundRequest {
            method: "POST",
            path: "/login",
            query: None,
            headers: &headers,
            body: body.as_bytes(),
            remote_addr: None,
        })
    }

    #[test]
    fn test_keeps_most_recent_entries() {
        let log = BoundedLog::new(3);
        for i in 0..10 {
            log.append(i);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.snapshot(), vec![7, 8, 9]);
        assert_eq!(log.snapshot_newest_first(), vec![9, 8, 7]);
    }

    #[test]
    fn test_append_reports_evictions() {
        let log = BoundedLog::new(2);
        assert_eq!(log.append("a"), 0);
        assert_eq!(log.append("b"), 0);
        assert_eq!(log.append("c"), 1);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let log = BoundedLog::new(4);
        log.append(1);
        let mut snapshot = log.snapshot();
        snapshot.push(2);
        assert_eq!(log.snapshot(), vec![1]);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let log = Arc::new(BoundedLog::new(800));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..100 {
                        log.append(t * 100 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut entries = log.snapshot();
        assert_eq!(entries.len(), 800);
        entries.sort_unstable();
        entries.dedup();
        assert_eq!(entries.len(), 800);
    }

    #[test]
    fn test_attack_goes_to_both_logs() {
        let store = LogStore::new(&LogsConfig::default());
        store.record(record("username=alice"));
        let flagged = store.record(record("' OR '1'='1"));

        assert_eq!(store.requests().len(), 2);
        assert_eq!(store.attacks().len(), 1);
        assert_eq!(store.attacks().snapshot()[0].id, flagged.id);
        assert_eq!(store.captured_total(), 2);
    }

    #[test]
    fn test_logs_have_independent_capacities() {
        let store = LogStore::new(&LogsConfig {
            request_capacity: 5,
            attack_capacity: 2,
        });
        for _ in 0..6 {
            store.record(record("DROP TABLE users"));
        }
        assert_eq!(store.requests().len(), 5);
        assert_eq!(store.attacks().len(), 2);
        assert_eq!(store.captured_total(), 6);
    }
}
