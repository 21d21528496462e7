use std::io::Write;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::info;
use serde::Deserialize;

use crate::{
    association::AssociationResult,
    cnv::{CopyNumberVariant, GenomicInterval, Sample},
    graph::{RegionAttributes, RegionSummary},
    io::{tsv_reader, tsv_writer},
    utils::format_float,
};

pub const REPORT_HEADER: [&str; 13] = [
    "chr",
    "start",
    "end",
    "family",
    "positive cases",
    "negative cases",
    "positive controls",
    "negative controls",
    "chi2",
    "p-value",
    "copynumber",
    "genes",
    "samples",
];

/// Write one report row per association result, preceded by [`REPORT_HEADER`].
pub fn write_report<W: Write>(writer: W, results: &[AssociationResult]) -> Result<()> {
    let mut writer = tsv_writer(writer);
    writer
        .write_record(REPORT_HEADER)
        .context("Could not write report header")?;

    for result in results {
        writer
            .write_record(report_row(result))
            .with_context(|| {
                format!(
                    "Could not write report row for {} in family {}",
                    result.region, result.family_id
                )
            })?;
    }
    writer.flush().context("Could not flush report")?;

    Ok(())
}

fn report_row(result: &AssociationResult) -> [String; 13] {
    let region = &result.region;
    let samples: Vec<String> = result
        .carriers
        .iter()
        .map(Sample::to_report_entry)
        .collect();
    [
        region.interval.seqname.clone(),
        region.interval.start.to_string(),
        region.interval.end.to_string(),
        result.family_id.clone(),
        result.table.positive_cases.to_string(),
        result.table.negative_cases.to_string(),
        result.table.positive_controls.to_string(),
        result.table.negative_controls.to_string(),
        format_float(result.chi2),
        format_float(result.p_value),
        region.copy_number.to_string(),
        region.gene_string(),
        samples.join("|"),
    ]
}

/// Columns of a report that are needed to draw relationship graphs.
/// `penncnv_conf` is optional; reports annotated with PennCNV confidence scores carry it.
#[derive(Debug, Deserialize)]
struct ReportRecord {
    chr: String,
    start: u64,
    end: u64,
    family: String,
    chi2: f64,
    #[serde(rename = "p-value")]
    p_value: f64,
    copynumber: usize,
    genes: String,
    samples: String,
    #[serde(default)]
    penncnv_conf: Option<f64>,
}

impl ReportRecord {
    fn into_summary(self) -> Result<RegionSummary> {
        let interval = GenomicInterval::new(&self.chr, self.start, self.end)?;
        let carriers = self
            .samples
            .split('|')
            .filter(|entry| !entry.is_empty())
            .map(Sample::from_report_entry)
            .collect::<Result<Vec<Sample>>>()?;

        Ok(RegionSummary {
            region: CopyNumberVariant::from_gene_string(interval, self.copynumber, &self.genes),
            attributes: RegionAttributes {
                chi2: Some(self.chi2),
                p_value: Some(self.p_value),
                confidence: self.penncnv_conf,
            },
            carriers,
        })
    }
}

/// Read an association report and group its rows by family, in order of first appearance.
pub fn read_report(report_path: &str) -> Result<IndexMap<String, Vec<RegionSummary>>> {
    let mut reader = tsv_reader(report_path)?;

    let mut families: IndexMap<String, Vec<RegionSummary>> = IndexMap::new();
    let mut n = 0;
    for result in reader.deserialize() {
        let record: ReportRecord = result
            .with_context(|| format!("Failed to deserialize report row in {report_path}"))?;
        let family = record.family.clone();
        let summary = record
            .into_summary()
            .with_context(|| format!("Invalid report row for family {family} in {report_path}"))?;
        families.entry(family).or_default().push(summary);
        n += 1;
    }

    info!(
        "Read {n} report rows for {} families from {report_path}",
        families.len()
    );
    Ok(families)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::association::ContingencyTable;

    fn result() -> AssociationResult {
        AssociationResult {
            family_id: "F1".into(),
            region: CopyNumberVariant::from_gene_string(
                GenomicInterval::new("chr1", 100, 200).unwrap(),
                1,
                "GENE_A;GENE_B",
            ),
            table: ContingencyTable {
                positive_cases: 1,
                negative_cases: 1,
                positive_controls: 1,
                negative_controls: 0,
            },
            chi2: 0.,
            p_value: 1.,
            carriers: vec![Sample::new("S1", true), Sample::new("S2", false)],
        }
    }

    #[test]
    fn report_layout() {
        let mut buffer = Vec::new();
        write_report(&mut buffer, &[result()]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(REPORT_HEADER.join("\t"), lines[0]);
        assert_eq!(
            "chr1\t100\t200\tF1\t1\t1\t1\t0\t0.0\t1.0\t1\tGENE_A;GENE_B\tS1;CASE|S2;CONTROL",
            lines[1]
        );
    }

    #[test]
    fn written_report_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.tsv");
        let mut buffer = Vec::new();
        write_report(&mut buffer, &[result()]).unwrap();
        fs::write(&path, buffer).unwrap();

        let families = read_report(path.to_str().unwrap()).unwrap();
        let rows = &families["F1"];
        assert_eq!(1, rows.len());
        assert_eq!(result().region, rows[0].region);
        assert_eq!(result().carriers, rows[0].carriers);
        assert_eq!(Some(1.), rows[0].attributes.p_value);
        assert_eq!(None, rows[0].attributes.confidence);
    }

    #[test]
    fn confidence_column_is_optional() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.tsv");
        fs::write(
            &path,
            "chr\tstart\tend\tfamily\tchi2\tp-value\tcopynumber\tpenncnv_conf\tgenes\tsamples\n\
             chr2\t5\t50\tF7\t3.5\t0.06\t3\t41.2\tGENE_C\tS9;CASE\n",
        )
        .unwrap();

        let families = read_report(path.to_str().unwrap()).unwrap();
        let row = &families["F7"][0];
        assert_eq!(Some(41.2), row.attributes.confidence);
        assert_eq!(vec![Sample::new("S9", true)], row.carriers);
    }

    #[test]
    fn bad_sample_entry_is_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.tsv");
        fs::write(
            &path,
            "chr\tstart\tend\tfamily\tchi2\tp-value\tcopynumber\tgenes\tsamples\n\
             chr2\t5\t50\tF7\t3.5\t0.06\t3\tGENE_C\tS9\n",
        )
        .unwrap();
        assert!(read_report(path.to_str().unwrap()).is_err());
    }
}
