//! # Sample/CNV relationship graphs
//!
//! A [`RelationshipGraph`] is bipartite: sample nodes are keyed by sample id, region nodes
//! by a number assigned in order of first appearance, and every edge links a sample to a
//! region it carries. Samples and regions are deduplicated by value, edges are a set.
//! Serialization lives in [`crate::io::graph`].
use indexmap::{IndexMap, IndexSet};

use crate::{
    association::AssociationResult,
    carriers::RegionCarriers,
    cnv::{CopyNumberVariant, Sample},
};

/// Numeric annotations of a region node, where known.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionAttributes {
    pub chi2: Option<f64>,
    pub p_value: Option<f64>,
    /// PennCNV confidence score of the call
    pub confidence: Option<f64>,
}

/// A region together with its carriers, as read from an association report or computed directly.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub region: CopyNumberVariant,
    pub attributes: RegionAttributes,
    pub carriers: Vec<Sample>,
}

impl From<&AssociationResult> for RegionSummary {
    fn from(result: &AssociationResult) -> Self {
        Self {
            region: result.region.clone(),
            attributes: RegionAttributes {
                chi2: Some(result.chi2),
                p_value: Some(result.p_value),
                confidence: None,
            },
            carriers: result.carriers.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    // sample id -> affected
    samples: IndexMap<String, bool>,
    regions: IndexMap<CopyNumberVariant, RegionAttributes>,
    // (sample index, region index)
    edges: IndexSet<(usize, usize)>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_carriers(carriers: &RegionCarriers) -> Self {
        let mut graph = Self::new();
        for (region, samples) in carriers.iter() {
            graph.add_region(region, RegionAttributes::default(), samples.iter());
        }
        graph
    }

    pub fn from_summaries<'a, I>(summaries: I) -> Self
    where
        I: IntoIterator<Item = &'a RegionSummary>,
    {
        let mut graph = Self::new();
        for summary in summaries {
            graph.add_region(&summary.region, summary.attributes, summary.carriers.iter());
        }
        graph
    }

    /// Add a region node (if not yet present) and link it to each of `carriers`.
    /// Attributes of a region that is already in the graph are kept.
    pub fn add_region<'a, I>(
        &mut self,
        region: &CopyNumberVariant,
        attributes: RegionAttributes,
        carriers: I,
    ) -> usize
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        let region_idx = match self.regions.get_index_of(region) {
            Some(idx) => idx,
            None => self.regions.insert_full(region.clone(), attributes).0,
        };
        for sample in carriers {
            let sample_idx = self.add_sample(sample);
            self.edges.insert((sample_idx, region_idx));
        }
        region_idx
    }

    pub fn add_sample(&mut self, sample: &Sample) -> usize {
        match self.samples.get_index_of(&sample.id) {
            Some(idx) => idx,
            None => self.samples.insert_full(sample.id.clone(), sample.affected).0,
        }
    }

    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.samples
            .iter()
            .map(|(id, affected)| Sample::new(id, *affected))
    }

    /// Region nodes with their numeric ids.
    pub fn regions(&self) -> impl Iterator<Item = (usize, &CopyNumberVariant, &RegionAttributes)> {
        self.regions
            .iter()
            .enumerate()
            .map(|(idx, (region, attributes))| (idx, region, attributes))
    }

    /// Edges as (sample id, region id) pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&str, usize)> {
        self.edges.iter().filter_map(|(sample_idx, region_idx)| {
            self.samples
                .get_index(*sample_idx)
                .map(|(id, _)| (id.as_str(), *region_idx))
        })
    }

    pub fn n_sample_nodes(&self) -> usize {
        self.samples.len()
    }

    pub fn n_region_nodes(&self) -> usize {
        self.regions.len()
    }

    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnv::GenomicInterval;

    fn region(start: u64, genes: &str) -> CopyNumberVariant {
        CopyNumberVariant::from_gene_string(
            GenomicInterval::new("chr1", start, start + 10).unwrap(),
            1,
            genes,
        )
    }

    fn summary(region: CopyNumberVariant, carriers: &[(&str, bool)]) -> RegionSummary {
        RegionSummary {
            region,
            attributes: RegionAttributes {
                chi2: Some(1.5),
                p_value: Some(0.2),
                confidence: Some(30.),
            },
            carriers: carriers
                .iter()
                .map(|(id, affected)| Sample::new(id, *affected))
                .collect(),
        }
    }

    #[test]
    fn nodes_are_unique() {
        let rows = vec![
            summary(region(1, "A"), &[("S1", true), ("S2", false)]),
            summary(region(1, "A"), &[("S1", true), ("S3", true)]),
            summary(region(50, "B;C"), &[("S2", false)]),
        ];
        let graph = RelationshipGraph::from_summaries(&rows);

        assert_eq!(3, graph.n_sample_nodes());
        assert_eq!(2, graph.n_region_nodes());
        assert_eq!(4, graph.n_edges());
        let samples: Vec<Sample> = graph.samples().collect();
        assert_eq!(Sample::new("S1", true), samples[0]);
        let edges: Vec<(&str, usize)> = graph.edges().collect();
        assert_eq!(vec![("S1", 0), ("S2", 0), ("S3", 0), ("S2", 1)], edges);
    }

    #[test]
    fn gene_order_separates_regions() {
        let rows = vec![
            summary(region(1, "A;B"), &[("S1", true)]),
            summary(region(1, "B;A"), &[("S1", true)]),
        ];
        let graph = RelationshipGraph::from_summaries(&rows);
        assert_eq!(2, graph.n_region_nodes());
        assert_eq!(1, graph.n_sample_nodes());
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let rows = vec![
            summary(region(1, "A"), &[("S1", true), ("S2", false)]),
            summary(region(50, "B"), &[("S2", false)]),
        ];
        let first = RelationshipGraph::from_summaries(&rows);
        let second = RelationshipGraph::from_summaries(&rows);
        assert_eq!(
            first.edges().collect::<Vec<_>>(),
            second.edges().collect::<Vec<_>>()
        );
        assert_eq!(
            first.samples().collect::<Vec<_>>(),
            second.samples().collect::<Vec<_>>()
        );
    }

    #[test]
    fn from_carriers_has_no_statistics() {
        let mut carriers = RegionCarriers::new();
        carriers.add_carrier(&region(1, "A"), &Sample::new("S1", true));
        let graph = RelationshipGraph::from_carriers(&carriers);
        let (_, _, attributes) = graph.regions().next().unwrap();
        assert_eq!(&RegionAttributes::default(), attributes);
    }
}
