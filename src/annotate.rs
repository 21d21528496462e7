use std::io::Write;

use anyhow::{bail, Context, Result};
use csv::StringRecord;
use log::{debug, info};

use crate::{
    cnv::GenomicInterval,
    index::GenomicIntervalIndex,
    io::{genes::GeneTier, tsv_reader, tsv_writer},
};

/// Columns appended to every annotated CNV row, one per gene tier.
pub const TIER_COLUMNS: [&str; 3] = ["tier 1 genes", "tier 2 genes", "tier 3 genes"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct AnnotationSummary {
    pub n_rows: usize,
    pub n_annotated: usize,
}

/// Position of a named column in `header`, failing if it is absent.
pub fn column_index(header: &StringRecord, name: &str) -> Result<usize> {
    match header.iter().position(|field| field == name) {
        Some(idx) => Ok(idx),
        None => bail!("Missing column '{name}'"),
    }
}

fn parse_coordinate(record: &StringRecord, idx: usize, name: &str) -> Result<u64> {
    let value = record.get(idx).unwrap_or_default();
    value
        .trim()
        .parse()
        .with_context(|| format!("Could not parse {name} '{value}' as a coordinate"))
}

fn cnv_interval(
    record: &StringRecord,
    chr_idx: usize,
    start_idx: usize,
    end_idx: usize,
) -> Result<GenomicInterval> {
    let start = parse_coordinate(record, start_idx, "start")?;
    let end = parse_coordinate(record, end_idx, "end")?;
    GenomicInterval::new(record.get(chr_idx).unwrap_or_default(), start, end)
}

/// Symbols of `tier`-tier genes among `genes`, `;`-joined.
fn tier_symbols(genes: &[&GeneTier], tier: i64) -> String {
    genes
        .iter()
        .filter(|gene| gene.tier == tier)
        .map(|gene| gene.symbol.as_str())
        .collect::<Vec<&str>>()
        .join(";")
}

/// Annotate each CNV in `cnv_path` with the tiered genes it overlaps.
/// Rows that overlap no gene are dropped; the others are written to `writer`
/// with the [`TIER_COLUMNS`] appended.
pub fn annotate_cnvs<W: Write>(
    genes: &GenomicIntervalIndex<GeneTier>,
    cnv_path: &str,
    writer: W,
) -> Result<AnnotationSummary> {
    let mut reader = tsv_reader(cnv_path)?;
    let header = reader
        .headers()
        .with_context(|| format!("Could not read header of {cnv_path}"))?
        .clone();
    let columns = ["chr", "start", "end"]
        .iter()
        .map(|name| column_index(&header, name))
        .collect::<Result<Vec<usize>>>()
        .with_context(|| format!("Invalid CNV table {cnv_path}"))?;
    let (chr_idx, start_idx, end_idx) = (columns[0], columns[1], columns[2]);

    let mut writer = tsv_writer(writer);
    let mut out_header = header.clone();
    out_header.extend(TIER_COLUMNS);
    writer
        .write_record(&out_header)
        .context("Could not write annotated CNV header")?;

    let mut summary = AnnotationSummary::default();
    for result in reader.records() {
        let record = result.with_context(|| format!("Failed to read CNV row in {cnv_path}"))?;
        let line = record.position().map_or(0, |pos| pos.line());
        let interval = cnv_interval(&record, chr_idx, start_idx, end_idx)
            .with_context(|| format!("Invalid CNV on line {line} of {cnv_path}"))?;
        summary.n_rows += 1;

        let hits = genes.query_interval(&interval);
        if hits.is_empty() {
            debug!("No genes overlap {interval}");
            continue;
        }

        let mut annotated = record.clone();
        for tier in 1..=3 {
            annotated.push_field(&tier_symbols(&hits, tier));
        }
        writer
            .write_record(&annotated)
            .with_context(|| format!("Could not write annotated CNV {interval}"))?;
        summary.n_annotated += 1;
    }
    writer.flush().context("Could not flush annotated CNVs")?;

    info!(
        "Annotated {} of {} CNVs from {cnv_path}",
        summary.n_annotated, summary.n_rows
    );
    Ok(summary)
}
