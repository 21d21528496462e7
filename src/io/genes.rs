use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Deserialize;

use crate::{
    cnv::GenomicInterval,
    index::GenomicIntervalIndex,
    io::{tsv_reader, SkippedRow},
};

/// A gene with its clinical tier (1 is the most relevant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneTier {
    pub symbol: String,
    pub tier: i64,
}

#[derive(Debug, Deserialize)]
struct GeneRecord {
    chromosome: String,
    #[serde(rename = "GRCh37 start")]
    start: u64,
    #[serde(rename = "GRCh37 end")]
    end: u64,
    symbol: String,
    tier: i64,
}

/// Gene coordinates indexed per chromosome, plus the rows that could not be used.
#[derive(Debug)]
pub struct GeneTiers {
    pub index: GenomicIntervalIndex<GeneTier>,
    pub skipped: Vec<SkippedRow>,
}

/// Read gene coordinates and tiers from the table at `genes_path`.
/// The table is an auxiliary annotation source: rows with a missing or unparsable field
/// are skipped rather than failing the run, and the reason is kept in [`GeneTiers::skipped`].
pub fn read_gene_tiers(genes_path: &str) -> Result<GeneTiers> {
    let mut reader = tsv_reader(genes_path)?;
    let header = reader
        .headers()
        .with_context(|| format!("Could not read header of {genes_path}"))?
        .clone();

    let mut genes = Vec::new();
    let mut skipped = Vec::new();
    for result in reader.records() {
        let raw = result.with_context(|| format!("Failed to read gene row in {genes_path}"))?;
        let line = raw.position().map_or(0, |pos| pos.line());

        let parsed = raw
            .deserialize::<GeneRecord>(Some(&header))
            .map_err(anyhow::Error::from)
            .and_then(|gene| {
                let interval = GenomicInterval::new(&gene.chromosome, gene.start, gene.end)?;
                Ok((
                    interval,
                    GeneTier {
                        symbol: gene.symbol,
                        tier: gene.tier,
                    },
                ))
            });
        match parsed {
            Ok(gene) => genes.push(gene),
            Err(e) => {
                debug!("Skipping gene on line {line} of {genes_path}: {e}");
                skipped.push(SkippedRow {
                    line,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!("Read {} genes from {genes_path}", genes.len());
    if !skipped.is_empty() {
        warn!(
            "Skipped {} gene rows in {genes_path} with missing or malformed fields",
            skipped.len()
        );
    }

    Ok(GeneTiers {
        index: genes.into_iter().collect(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn malformed_rows_are_skipped_with_reason() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("genes.tsv");
        fs::write(
            &path,
            "chromosome\tGRCh37 start\tGRCh37 end\tsymbol\ttier\n\
             chr1\t100\t200\tAPC\t1\n\
             chr1\tNA\t200\tBROKEN\t1\n\
             chr1\t300\t400\tMUTYH\tunknown\n\
             chr2\t500\t400\tBACKWARDS\t2\n\
             chr2\t10\t20\tMSH2\t2\n",
        )
        .unwrap();

        let genes = read_gene_tiers(path.to_str().unwrap()).unwrap();
        assert_eq!(2, genes.index.len());
        assert_eq!(
            vec![3, 4, 5],
            genes.skipped.iter().map(|s| s.line).collect::<Vec<u64>>()
        );
        assert!(genes.skipped.iter().all(|s| !s.reason.is_empty()));
        let hits = genes.index.query("chr2", 15, 15);
        assert_eq!("MSH2", hits[0].symbol);
        assert_eq!(2, hits[0].tier);
    }

    #[test]
    fn unreadable_file_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.tsv");
        assert!(read_gene_tiers(path.to_str().unwrap()).is_err());
    }
}
