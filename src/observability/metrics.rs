//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Lock-free, shareable across threads

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of the snapshot and collection layers.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    write_trx_reused: AtomicU64,
    write_trx_opened: AtomicU64,
    read_trx_opened: AtomicU64,
    reverts: AtomicU64,
    snapshots_resolved: AtomicU64,
    snapshots_absent: AtomicU64,
    documents_added: AtomicU64,
    ingestion_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_write_trx_reused(&self) {
        self.write_trx_reused.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_write_trx_opened(&self) {
        self.write_trx_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_read_trx_opened(&self) {
        self.read_trx_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reverts(&self) {
        self.reverts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_snapshots_resolved(&self) {
        self.snapshots_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_snapshots_absent(&self) {
        self.snapshots_absent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_documents_added(&self) {
        self.documents_added.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_ingestion_failures(&self) {
        self.ingestion_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Current values of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            write_trx_reused: self.write_trx_reused.load(Ordering::Relaxed),
            write_trx_opened: self.write_trx_opened.load(Ordering::Relaxed),
            read_trx_opened: self.read_trx_opened.load(Ordering::Relaxed),
            reverts: self.reverts.load(Ordering::Relaxed),
            snapshots_resolved: self.snapshots_resolved.load(Ordering::Relaxed),
            snapshots_absent: self.snapshots_absent.load(Ordering::Relaxed),
            documents_added: self.documents_added.load(Ordering::Relaxed),
            ingestion_failures: self.ingestion_failures.load(Ordering::Relaxed),
        }
    }

    /// All counters as one JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub write_trx_reused: u64,
    pub write_trx_opened: u64,
    pub read_trx_opened: u64,
    pub reverts: u64,
    pub snapshots_resolved: u64,
    pub snapshots_absent: u64,
    pub documents_added: u64,
    pub ingestion_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();
        registry.increment_write_trx_reused();
        registry.increment_write_trx_reused();
        registry.increment_reverts();
        registry.increment_snapshots_absent();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.write_trx_reused, 2);
        assert_eq!(snapshot.reverts, 1);
        assert_eq!(snapshot.snapshots_absent, 1);
        assert_eq!(snapshot.write_trx_opened, 0);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_documents_added();

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["documents_added"], 1);
        assert_eq!(parsed["reverts"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_snapshots_resolved();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.snapshot().snapshots_resolved, 800);
    }
}
