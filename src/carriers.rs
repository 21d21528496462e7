//! # Mapping reference CNV regions to the samples that carry them
//!
//! Every call of a family is intersected with the family's reference regions. A sample
//! carries a region when at least one of its calls overlaps it. Regions without carriers
//! never show up in a [`RegionCarriers`] map.
use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::trace;

use crate::{
    calls::SampleCall,
    cnv::{CopyNumberVariant, Sample},
    index::GenomicIntervalIndex,
};

/// Carriers per reference region, with regions in the order they were first hit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionCarriers {
    regions: IndexMap<CopyNumberVariant, BTreeSet<Sample>>,
}

impl RegionCarriers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_carrier(&mut self, region: &CopyNumberVariant, sample: &Sample) {
        if let Some(carriers) = self.regions.get_mut(region) {
            carriers.insert(sample.clone());
        } else {
            self.regions
                .insert(region.clone(), BTreeSet::from([sample.clone()]));
        }
    }

    pub fn get(&self, region: &CopyNumberVariant) -> Option<&BTreeSet<Sample>> {
        self.regions.get(region)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CopyNumberVariant, &BTreeSet<Sample>)> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Intersect `calls` with the reference regions in `reference`. A family without
/// reference regions, or a call on a contig the reference does not cover, contributes nothing.
pub fn map_carriers(
    reference: Option<&GenomicIntervalIndex<CopyNumberVariant>>,
    calls: &[SampleCall],
) -> RegionCarriers {
    let mut carriers = RegionCarriers::new();
    let Some(reference) = reference else {
        return carriers;
    };

    for call in calls {
        let hits = reference.query_interval(&call.interval);
        if hits.is_empty() {
            trace!("No reference region overlaps {} in {}", call.interval, call.sample.id);
        }
        for region in hits {
            carriers.add_carrier(region, &call.sample);
        }
    }

    carriers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnv::GenomicInterval;

    fn region(seqname: &str, start: u64, end: u64, genes: &str) -> CopyNumberVariant {
        CopyNumberVariant::from_gene_string(
            GenomicInterval::new(seqname, start, end).unwrap(),
            1,
            genes,
        )
    }

    fn call(sample: &str, affected: bool, seqname: &str, start: u64, end: u64) -> SampleCall {
        SampleCall::new(
            Sample::new(sample, affected),
            GenomicInterval::new(seqname, start, end).unwrap(),
        )
    }

    fn reference(regions: &[CopyNumberVariant]) -> GenomicIntervalIndex<CopyNumberVariant> {
        regions
            .iter()
            .map(|r| (r.interval.clone(), r.clone()))
            .collect()
    }

    #[test]
    fn carriers_of_single_region() {
        let gene_a = region("chr1", 100, 200, "GENE_A");
        let index = reference(&[gene_a.clone()]);
        let calls = vec![
            call("S1", true, "chr1", 150, 160),
            call("S2", false, "chr1", 190, 210),
            call("S3", true, "chr1", 300, 310),
        ];

        let carriers = map_carriers(Some(&index), &calls);
        assert_eq!(1, carriers.len());
        assert_eq!(
            &BTreeSet::from([Sample::new("S1", true), Sample::new("S2", false)]),
            carriers.get(&gene_a).unwrap()
        );
    }

    #[test]
    fn repeated_overlaps_count_once() {
        let gene_a = region("chr1", 100, 200, "GENE_A");
        let index = reference(&[gene_a.clone()]);
        let calls = vec![
            call("S1", true, "chr1", 100, 110),
            call("S1", true, "chr1", 120, 130),
        ];
        let carriers = map_carriers(Some(&index), &calls);
        assert_eq!(1, carriers.get(&gene_a).unwrap().len());
    }

    #[test]
    fn regions_in_first_hit_order() {
        let a = region("chr1", 100, 200, "A");
        let b = region("chr2", 100, 200, "B");
        let unused = region("chr3", 1, 2, "C");
        let index = reference(&[a.clone(), b.clone(), unused]);
        let calls = vec![
            call("S1", true, "chr2", 150, 150),
            call("S2", false, "chr1", 150, 150),
            call("S3", false, "chrX", 150, 150),
        ];
        let carriers = map_carriers(Some(&index), &calls);
        let order: Vec<&CopyNumberVariant> = carriers.iter().map(|(r, _)| r).collect();
        assert_eq!(vec![&b, &a], order);
    }

    #[test]
    fn no_reference_for_family() {
        let calls = vec![call("S1", true, "chr1", 1, 10)];
        assert!(map_carriers(None, &calls).is_empty());
    }
}
