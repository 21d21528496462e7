//! # Per-sample CNV calls
//!
//! A [`CallRecord`] is one row of the per-sample CNV table after validation: the typed
//! fields the analysis needs plus the untouched raw row, which is kept so that rejected
//! duplicates can be written back out with all their passthrough columns.
//! Once duplicates are removed, records are reduced to [`SampleCall`]s.
use csv::StringRecord;

use crate::{
    cnv::{GenomicInterval, Sample},
    dedup::MeasuredSample,
};

#[derive(Debug, Clone)]
pub struct CallRecord {
    pub family: String,
    pub sample_id: String,
    /// Sentrix id of the assay run that produced this call
    pub batch: String,
    pub affected: bool,
    pub interval: GenomicInterval,
    pub raw: StringRecord,
}

impl CallRecord {
    pub fn sample(&self) -> Sample {
        Sample::new(&self.sample_id, self.affected)
    }
    pub fn into_sample_call(self) -> SampleCall {
        SampleCall {
            sample: Sample {
                id: self.sample_id,
                affected: self.affected,
            },
            interval: self.interval,
        }
    }
}

impl MeasuredSample for CallRecord {
    fn sample_id(&self) -> &str {
        &self.sample_id
    }
    fn measurement_batch(&self) -> &str {
        &self.batch
    }
}

/// A CNV call observed in a sample, stripped of everything that only matters for deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCall {
    pub sample: Sample,
    pub interval: GenomicInterval,
}

impl SampleCall {
    pub fn new(sample: Sample, interval: GenomicInterval) -> Self {
        Self { sample, interval }
    }
}
