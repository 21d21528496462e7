use std::io::Write;

use anyhow::{Context, Result};
use log::info;

use crate::{
    annotate::column_index,
    io::{tsv_reader, tsv_writer},
};

pub const YOUNGEST_AFFECTED_COLUMN: &str = "cancer_CRC_affected_youngest_affected_in_family";
pub const POPULATION_COLUMN: &str = "population_sample";

/// Copy the rows of `cnv_path` that belong to the youngest affected member of a family
/// or to a population sample. Returns `(rows read, rows kept)`.
pub fn filter_families<W: Write>(cnv_path: &str, writer: W) -> Result<(usize, usize)> {
    let mut reader = tsv_reader(cnv_path)?;
    let header = reader
        .headers()
        .with_context(|| format!("Could not read header of {cnv_path}"))?
        .clone();
    let youngest_idx = column_index(&header, YOUNGEST_AFFECTED_COLUMN)
        .with_context(|| format!("Invalid CNV table {cnv_path}"))?;
    let population_idx = column_index(&header, POPULATION_COLUMN)
        .with_context(|| format!("Invalid CNV table {cnv_path}"))?;

    let mut writer = tsv_writer(writer);
    writer
        .write_record(&header)
        .context("Could not write filtered CNV header")?;

    let (mut n_read, mut n_kept) = (0, 0);
    for result in reader.records() {
        let record = result.with_context(|| format!("Failed to read CNV row in {cnv_path}"))?;
        n_read += 1;
        if record.get(youngest_idx) == Some("1") || record.get(population_idx) == Some("1") {
            writer
                .write_record(&record)
                .context("Could not write filtered CNV row")?;
            n_kept += 1;
        }
    }
    writer.flush().context("Could not flush filtered CNVs")?;

    info!("Kept {n_kept} of {n_read} CNV rows from {cnv_path}");
    Ok((n_read, n_kept))
}
