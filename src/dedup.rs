//! # Removing repeated measurements of the same sample
//!
//! Some samples were assayed more than once for QC. Only the calls from the first
//! measurement batch seen for a sample are kept; calls from any later batch of the
//! same sample are set aside as duplicates. Every row ends up in exactly one of the two.
use std::collections::HashMap;

/// Rows that carry a sample identity and the batch it was measured in.
pub trait MeasuredSample {
    fn sample_id(&self) -> &str;
    fn measurement_batch(&self) -> &str;
}

#[derive(Debug)]
pub struct Deduplicated<R> {
    pub accepted: Vec<R>,
    pub duplicates: Vec<R>,
}

#[derive(Debug, Default)]
pub struct SampleDeduplicator {
    first_seen: HashMap<String, String>,
}

impl SampleDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation of `sample_id` in `batch` and report whether it belongs to
    /// the first batch seen for that sample. The first observation always does.
    pub fn accept(&mut self, sample_id: &str, batch: &str) -> bool {
        match self.first_seen.get(sample_id) {
            Some(first) => first == batch,
            None => {
                self.first_seen
                    .insert(sample_id.to_owned(), batch.to_owned());
                true
            }
        }
    }

    /// Split `rows` into accepted rows and duplicates, preserving input order in both.
    pub fn partition<R: MeasuredSample>(&mut self, rows: Vec<R>) -> Deduplicated<R> {
        let mut accepted = Vec::with_capacity(rows.len());
        let mut duplicates = Vec::new();
        for row in rows {
            if self.accept(row.sample_id(), row.measurement_batch()) {
                accepted.push(row);
            } else {
                duplicates.push(row);
            }
        }

        Deduplicated {
            accepted,
            duplicates,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.first_seen.len()
    }
}
