use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion activity.
#[derive(Default)]
pub struct IngestMetrics {
    documents_ingested: AtomicU64,
    passages_indexed: AtomicU64,
    last_passage_count: AtomicU64,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an ingested document and the number of passages produced for it.
    pub fn record_document(&self, passage_count: u64) {
        self.documents_ingested.fetch_add(1, Ordering::Relaxed);
        self.passages_indexed
            .fetch_add(passage_count, Ordering::Relaxed);
        self.last_passage_count
            .store(passage_count, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_ingested: self.documents_ingested.load(Ordering::Relaxed),
            passages_indexed: self.passages_indexed.load(Ordering::Relaxed),
            last_passage_count: self.last_passage_count.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of ingestion counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of documents ingested since startup.
    pub documents_ingested: u64,
    /// Total passage count produced across all ingested documents.
    pub passages_indexed: u64,
    /// Passage count of the most recent ingestion.
    pub last_passage_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_passages() {
        let metrics = IngestMetrics::new();
        metrics.record_document(2);
        metrics.record_document(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_ingested, 2);
        assert_eq!(snapshot.passages_indexed, 5);
        assert_eq!(snapshot.last_passage_count, 3);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let metrics = IngestMetrics::new();
        assert_eq!(metrics.snapshot().documents_ingested, 0);
        assert_eq!(metrics.snapshot().passages_indexed, 0);
    }
}
