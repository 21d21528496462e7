use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use csv::StringRecord;
use log::info;
use serde::Deserialize;

use crate::{
    calls::CallRecord,
    cnv::{affected_from_flag, GenomicInterval},
    io::{tsv_reader, tsv_writer},
};

/// The per-sample CNV table: its header and every row, in file order.
#[derive(Debug)]
pub struct CallTable {
    pub header: StringRecord,
    pub records: Vec<CallRecord>,
}

/// Columns of the per-sample table that the analysis uses. Any other column is passed through.
#[derive(Debug, Deserialize)]
struct CallFields {
    #[serde(rename = "master_sample_sheet_FAMILY_ID")]
    family: String,
    sample_id: String,
    sentrix_id: String,
    #[serde(rename = "ped_Affected")]
    ped_affected: String,
    chr: String,
    coord_start: u64,
    coord_end: u64,
}

/// Read every CNV call in the per-sample table at `calls_path`.
pub fn read_sample_calls(calls_path: &str) -> Result<CallTable> {
    let mut reader = tsv_reader(calls_path)?;
    let header = reader
        .headers()
        .with_context(|| format!("Could not read header of {calls_path}"))?
        .clone();

    let mut records = Vec::new();
    for result in reader.records() {
        let raw = result.with_context(|| format!("Failed to read CNV call in {calls_path}"))?;
        let line = raw.position().map_or(0, |pos| pos.line());
        let fields: CallFields = raw.deserialize(Some(&header)).with_context(|| {
            format!("Failed to deserialize CNV call on line {line} of {calls_path}")
        })?;
        let interval = GenomicInterval::new(&fields.chr, fields.coord_start, fields.coord_end)
            .with_context(|| format!("Invalid CNV call on line {line} of {calls_path}"))?;

        records.push(CallRecord {
            family: fields.family,
            sample_id: fields.sample_id,
            batch: fields.sentrix_id,
            affected: affected_from_flag(&fields.ped_affected),
            interval,
            raw,
        });
    }

    info!("Read {} CNV calls from {calls_path}", records.len());
    Ok(CallTable { header, records })
}

/// Path of the duplicates table written next to the per-sample table, e.g. `calls.tsv` -> `calls.dups.tsv`.
pub fn duplicates_path<P: AsRef<Path>>(calls_path: P) -> PathBuf {
    calls_path.as_ref().with_extension("dups.tsv")
}

/// Write the rows in `duplicates`, under the input `header`, to the sibling file of `calls_path`.
pub fn write_duplicates(
    calls_path: &str,
    header: &StringRecord,
    duplicates: &[CallRecord],
) -> Result<PathBuf> {
    let path = duplicates_path(calls_path);
    let file = File::create(&path)
        .with_context(|| format!("Could not create duplicates file {}", path.display()))?;
    let mut writer = tsv_writer(BufWriter::new(file));
    let context = || format!("Could not write duplicates to {}", path.display());

    writer.write_record(header).with_context(context)?;
    for record in duplicates {
        writer.write_record(&record.raw).with_context(context)?;
    }
    writer.flush().with_context(context)?;

    info!(
        "Wrote {} duplicate CNV calls to {}",
        duplicates.len(),
        path.display()
    );
    Ok(path)
}
