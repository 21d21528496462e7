use std::collections::HashMap;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::{
    cnv::{CopyNumberVariant, GenomicInterval},
    index::GenomicIntervalIndex,
    io::tsv_reader,
};

/// Reference regions of one family, indexed per chromosome.
pub type ReferenceIndex = GenomicIntervalIndex<CopyNumberVariant>;

#[derive(Debug, Deserialize)]
struct MergedCnvRecord {
    family: String,
    chr: String,
    start: u64,
    end: u64,
    copy_number: usize,
    genes: String,
}

impl MergedCnvRecord {
    fn into_cnv(self) -> Result<CopyNumberVariant> {
        let interval = GenomicInterval::new(&self.chr, self.start, self.end)?;
        Ok(CopyNumberVariant::from_gene_string(
            interval,
            self.copy_number,
            &self.genes,
        ))
    }
}

/// Read the merged (collapsed) CNV table at `merged_path` and build one reference index per family.
/// Expected columns are `family, chr, start, end, copy_number, genes`, with `;`-joined genes.
pub fn read_merged_cnvs(merged_path: &str) -> Result<HashMap<String, ReferenceIndex>> {
    let mut reader = tsv_reader(merged_path)?;

    let mut families: HashMap<String, Vec<(GenomicInterval, CopyNumberVariant)>> =
        HashMap::new();
    let mut n = 0;
    for result in reader.deserialize() {
        let record: MergedCnvRecord = result
            .with_context(|| format!("Failed to deserialize CNV record in {merged_path}"))?;
        let family = record.family.clone();
        let cnv = record
            .into_cnv()
            .with_context(|| format!("Invalid CNV record in {merged_path}"))?;
        families
            .entry(family)
            .or_default()
            .push((cnv.interval.clone(), cnv));
        n += 1;
    }

    info!(
        "Read {n} CNVs for {} families from {merged_path}",
        families.len()
    );

    Ok(families
        .into_iter()
        .map(|(family, cnvs)| (family, cnvs.into_iter().collect()))
        .collect())
}
