//! # cnv-analysis
//!
//! This library serves as the backbone for the `cnv-analysis` binary, a family-based
//! case/control analysis of copy number variants (CNVs).
//!
//! Given a merged table of reference CNV regions per family and a table of per-sample CNV calls,
//! calls are deduplicated per sample, each family is split into cases and controls, and every
//! reference region is tested for association of carrier status with affected status.
//! Results can be exported as sample/CNV relationship graphs.
pub mod annotate;
pub mod association;
pub mod calls;
pub mod carriers;
pub mod cli;
pub mod cnv;
pub mod cohort;
pub mod dedup;
pub mod filter;
pub mod graph;
pub mod index;
pub mod io;
pub mod stats;
pub mod utils;

use std::path::PathBuf;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, info, trace};
use rayon::prelude::*;

use crate::{
    association::{AssociationEngine, AssociationResult},
    cohort::FamilyCalls,
    dedup::{Deduplicated, SampleDeduplicator},
    graph::{RegionSummary, RelationshipGraph},
    io::{
        calls::{read_sample_calls, write_duplicates},
        graph::{write_family_graphs, GraphFormat},
        merged::{read_merged_cnvs, ReferenceIndex},
        report::read_report,
    },
    stats::ContingencyTest,
};

/// The per-family work of the case/control analysis happens in this `run` function.
/// It is meant to be called from inside a rayon parallel iterator, one family per call.
/// Every call of the family is intersected with the family's reference regions, and each
/// region that is carried by at least one member is tested for association.
/// A family without reference regions yields no results.
pub fn run<T: ContingencyTest>(
    family: &FamilyCalls,
    reference: Option<&ReferenceIndex>,
    engine: &AssociationEngine<T>,
    tidx: usize,
) -> Result<Vec<AssociationResult>> {
    let family_id = &family.cohort.family_id;
    trace!("Processing family {family_id} on thread {tidx}");

    if reference.is_none() {
        debug!("No merged CNVs for family {family_id}, skipping");
    }
    let carriers = carriers::map_carriers(reference, &family.calls);
    let results = engine
        .evaluate(&family.cohort, &carriers)
        .with_context(|| format!("Association test failed for family {family_id}"))?;

    trace!("Finished family {family_id} on thread {tidx}");
    Ok(results)
}

/// Everything the case/control analysis produces besides log output.
#[derive(Debug)]
pub struct CaseControlOutput {
    /// Association results, families in order of first appearance in the per-sample table
    pub results: Vec<AssociationResult>,
    pub duplicates_path: PathBuf,
    pub n_duplicates: usize,
    pub n_families: usize,
}

/// Run the case/control analysis for the merged CNV table at `merged_path`
/// and the per-sample CNV calls at `calls_path`.
/// Rows of samples measured more than once are written next to `calls_path` (see
/// [`io::calls::duplicates_path`]) and left out of the analysis.
/// Families are processed in parallel on the global rayon thread pool.
pub fn case_control(merged_path: &str, calls_path: &str) -> Result<CaseControlOutput> {
    let references = read_merged_cnvs(merged_path)?;
    let table = read_sample_calls(calls_path)?;

    let mut deduplicator = SampleDeduplicator::new();
    let Deduplicated {
        accepted,
        duplicates,
    } = deduplicator.partition(table.records);
    info!(
        "Kept {} CNV calls from {} samples, {} calls are from repeated measurements",
        accepted.len(),
        deduplicator.n_samples(),
        duplicates.len()
    );
    let duplicates_path = write_duplicates(calls_path, &table.header, &duplicates)?;

    let families = cohort::build_families(accepted)?;
    info!("Built cohorts for {} families", families.len());

    let engine = AssociationEngine::default();
    info!("Starting case/control analysis");
    let per_family = families
        .par_iter()
        .map(|family| {
            let tidx = rayon::current_thread_index().unwrap_or(0);
            run(
                family,
                references.get(&family.cohort.family_id),
                &engine,
                tidx,
            )
        })
        .collect::<Result<Vec<Vec<AssociationResult>>>>()?;
    let results: Vec<AssociationResult> = per_family.into_iter().flatten().collect();
    info!(
        "Finished case/control analysis: {} family/CNV results",
        results.len()
    );

    Ok(CaseControlOutput {
        results,
        duplicates_path,
        n_duplicates: duplicates.len(),
        n_families: families.len(),
    })
}

/// Build one relationship graph per family from grouped region summaries.
pub fn family_graphs(
    families: &IndexMap<String, Vec<RegionSummary>>,
) -> IndexMap<String, RelationshipGraph> {
    families
        .iter()
        .map(|(family, summaries)| (family.clone(), RelationshipGraph::from_summaries(summaries)))
        .collect()
}

/// Group association results by family, in order of first appearance.
pub fn summarise_results(results: &[AssociationResult]) -> IndexMap<String, Vec<RegionSummary>> {
    let mut families: IndexMap<String, Vec<RegionSummary>> = IndexMap::new();
    for result in results {
        families
            .entry(result.family_id.clone())
            .or_default()
            .push(RegionSummary::from(result));
    }
    families
}

/// Write one graph per family to `outdir`. Returns the number of graphs written.
pub fn write_graphs(
    families: &IndexMap<String, Vec<RegionSummary>>,
    outdir: &str,
    format: GraphFormat,
) -> Result<usize> {
    let graphs = family_graphs(families);
    write_family_graphs(
        outdir,
        graphs.iter().map(|(family, graph)| (family.as_str(), graph)),
        format,
    )
}

/// Draw the relationship graphs of every family in the association report at `report_path`.
pub fn graph_report(report_path: &str, outdir: &str, format: GraphFormat) -> Result<usize> {
    let families = read_report(report_path)?;
    write_graphs(&families, outdir, format)
}

#[cfg(test)]
mod tests {
    use csv::StringRecord;

    use super::*;
    use crate::{
        calls::CallRecord,
        cnv::{CopyNumberVariant, GenomicInterval, Sample},
    };

    fn call(family: &str, sample: &str, affected: bool, start: u64, end: u64) -> CallRecord {
        CallRecord {
            family: family.into(),
            sample_id: sample.into(),
            batch: "B1".into(),
            affected,
            interval: GenomicInterval::new("chr1", start, end).unwrap(),
            raw: StringRecord::new(),
        }
    }

    fn reference() -> ReferenceIndex {
        let region = CopyNumberVariant::from_gene_string(
            GenomicInterval::new("chr1", 100, 200).unwrap(),
            1,
            "GENE_A;GENE_B",
        );
        [(region.interval.clone(), region)].into_iter().collect()
    }

    #[test]
    fn run_single_family() {
        let families = cohort::build_families(vec![
            call("F1", "S1", true, 150, 160),
            call("F1", "S2", false, 190, 210),
            call("F1", "S3", true, 300, 400),
        ])
        .unwrap();
        let reference = reference();

        let results = run(
            &families[0],
            Some(&reference),
            &AssociationEngine::default(),
            0,
        )
        .unwrap();
        assert_eq!(1, results.len());
        let result = &results[0];
        assert_eq!([[1, 1], [1, 0]], result.table.as_array());
        assert_eq!(0., result.chi2);
        assert_eq!(1., result.p_value);
        assert_eq!(
            vec![Sample::new("S1", true), Sample::new("S2", false)],
            result.carriers
        );
    }

    #[test]
    fn family_without_reference() {
        let families = cohort::build_families(vec![call("F9", "S1", true, 150, 160)]).unwrap();
        let results = run(&families[0], None, &AssociationEngine::default(), 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn graphs_grouped_by_family() {
        let families = cohort::build_families(vec![
            call("F1", "S1", true, 150, 160),
            call("F1", "S2", false, 190, 210),
            call("F2", "S4", true, 100, 100),
        ])
        .unwrap();
        let reference = reference();
        let engine = AssociationEngine::default();
        let results: Vec<AssociationResult> = families
            .iter()
            .flat_map(|family| run(family, Some(&reference), &engine, 0).unwrap())
            .collect();

        let summaries = summarise_results(&results);
        assert_eq!(vec!["F1", "F2"], summaries.keys().collect::<Vec<&String>>());
        let graphs = family_graphs(&summaries);
        assert_eq!(2, graphs["F1"].n_sample_nodes());
        assert_eq!(2, graphs["F1"].n_edges());
        assert_eq!(1, graphs["F2"].n_region_nodes());
    }
}
