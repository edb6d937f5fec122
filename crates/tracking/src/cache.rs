//! Bounded in-memory buffer of deferred experiments.
//!
//! Records are kept in insertion order, which is also the order they are
//! sent in. The cache never drops or sends anything on its own; the facade
//! decides when to flush and clears the cache only once the server has
//! accepted the batch.

use crate::ExperimentRecord;

/// Ordered queue of experiments awaiting a batch request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentCache {
    entries: Vec<ExperimentRecord>,
    capacity: usize,
}

impl ExperimentCache {
    /// Creates an empty cache that reports full at `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record at the back.
    pub fn push(&mut self, record: ExperimentRecord) {
        self.entries.push(record);
    }

    /// Returns `true` once the number of queued records has reached capacity.
    ///
    /// Stays `true` above capacity, which happens when a flush failed and more
    /// records were queued afterwards.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Flush threshold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued records in flush order.
    pub fn entries(&self) -> &[ExperimentRecord] {
        &self.entries
    }

    /// Drops every queued record.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fields, FieldValue, ModelId};

    fn record(lr: f64) -> ExperimentRecord {
        ExperimentRecord::new(ModelId::new(1), fields! { "lr" => lr }, fields! { "acc" => 0.5 })
    }

    #[test]
    fn test_fills_up_to_capacity() {
        let mut cache = ExperimentCache::new(2);
        assert!(cache.is_empty());
        assert!(!cache.is_full());

        cache.push(record(0.1));
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_full());

        cache.push(record(0.2));
        assert!(cache.is_full());

        cache.push(record(0.3));
        assert!(cache.is_full());
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut cache = ExperimentCache::new(10);
        for lr in [0.3, 0.1, 0.2] {
            cache.push(record(lr));
        }

        let order: Vec<_> = cache
            .entries()
            .iter()
            .map(|r| r.parameters.get("lr").cloned())
            .collect();
        assert_eq!(
            order,
            vec![
                Some(FieldValue::Float(0.3)),
                Some(FieldValue::Float(0.1)),
                Some(FieldValue::Float(0.2)),
            ]
        );
    }

    #[test]
    fn test_clear_empties_but_keeps_capacity() {
        let mut cache = ExperimentCache::new(3);
        cache.push(record(0.1));
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 3);
    }
}
