//! # Structs to represent copy number variants and the samples carrying them
//!
//! [`GenomicInterval`] is a stretch of a contig with inclusive start and end coordinates.
//! [`CopyNumberVariant`] couples an interval with a copy number and the genes it covers;
//! the full value (including gene order) is its identity, so it can be used as a map key.
//! [`Sample`] is a genotyped family member with a binary affection status.
use std::fmt;

use anyhow::{bail, Result};

/// Label used for affected samples in reports and graphs.
pub const CASE: &str = "CASE";
/// Label used for unaffected samples in reports and graphs.
pub const CONTROL: &str = "CONTROL";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenomicInterval {
    pub seqname: String,
    // start and end are both inclusive: [start, end]
    pub start: u64,
    pub end: u64,
}

impl GenomicInterval {
    pub fn new(seqname: &str, start: u64, end: u64) -> Result<Self> {
        if start > end {
            bail!("Interval {seqname}:{start}-{end} has a start position after its end position");
        }
        Ok(Self {
            seqname: seqname.to_owned(),
            start,
            end,
        })
    }
    /// Check whether this interval overlaps `[start, end]` (both inclusive).
    /// The contig is not considered.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        self.start <= end && self.end >= start
    }
}

impl fmt::Display for GenomicInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.seqname, self.start, self.end)
    }
}

/// A reference CNV region. Two CNVs are equal only if interval, copy number
/// and the ordered gene list all agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CopyNumberVariant {
    pub interval: GenomicInterval,
    pub copy_number: usize,
    pub genes: Vec<String>,
}

impl CopyNumberVariant {
    pub fn new(interval: GenomicInterval, copy_number: usize, genes: Vec<String>) -> Self {
        Self {
            interval,
            copy_number,
            genes,
        }
    }
    /// Build a CNV from a `;`-joined gene string, as found in CNV tables.
    pub fn from_gene_string(interval: GenomicInterval, copy_number: usize, genes: &str) -> Self {
        Self::new(
            interval,
            copy_number,
            genes.split(';').map(String::from).collect(),
        )
    }
    /// The first gene is the label for the region. Empty if no genes are known.
    pub fn canonical_gene(&self) -> &str {
        self.genes.first().map(String::as_str).unwrap_or("")
    }
    pub fn gene_string(&self) -> String {
        self.genes.join(";")
    }
    /// Copy number class of the region, e.g. `CNV3` for a duplication on a diploid contig.
    pub fn copy_number_class(&self) -> String {
        format!("CNV{}", self.copy_number)
    }
}

impl fmt::Display for CopyNumberVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (CN {}, {})",
            self.interval,
            self.copy_number,
            self.gene_string()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sample {
    pub id: String,
    pub affected: bool,
}

impl Sample {
    pub fn new(id: &str, affected: bool) -> Self {
        Self {
            id: id.to_owned(),
            affected,
        }
    }
    /// Parse a report entry of the form `id;CASE` or `id;CONTROL`.
    pub fn from_report_entry(entry: &str) -> Result<Self> {
        let Some((id, label)) = entry.rsplit_once(';') else {
            bail!("Sample entry '{entry}' is not of the form 'id;CASE' or 'id;CONTROL'");
        };
        match label {
            CASE => Ok(Self::new(id, true)),
            CONTROL => Ok(Self::new(id, false)),
            _ => bail!("Sample entry '{entry}' has unknown affection status '{label}'"),
        }
    }
    pub fn label(&self) -> &'static str {
        if self.affected {
            CASE
        } else {
            CONTROL
        }
    }
    pub fn to_report_entry(&self) -> String {
        format!("{};{}", self.id, self.label())
    }
}

/// Pedigree affection flags mark cases with exactly `Yes`; any other value is a control.
pub fn affected_from_flag(flag: &str) -> bool {
    flag == "Yes"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_start_after_end() {
        assert!(GenomicInterval::new("chr1", 20, 10).is_err());
        assert!(GenomicInterval::new("chr1", 10, 10).is_ok());
    }

    #[test]
    fn inclusive_overlap() {
        let iv = GenomicInterval::new("chr1", 100, 200).unwrap();
        assert!(iv.overlaps(200, 300));
        assert!(iv.overlaps(50, 100));
        assert!(iv.overlaps(150, 160));
        assert!(!iv.overlaps(201, 300));
        assert!(!iv.overlaps(10, 99));
    }

    #[test]
    fn cnv_identity_includes_gene_order() {
        let iv = GenomicInterval::new("chr2", 1, 5).unwrap();
        let a = CopyNumberVariant::from_gene_string(iv.clone(), 1, "A;B");
        let b = CopyNumberVariant::from_gene_string(iv.clone(), 1, "B;A");
        let c = CopyNumberVariant::from_gene_string(iv, 1, "A;B");
        assert_ne!(a, b);
        assert_eq!(a, c);
        assert_eq!("A", a.canonical_gene());
        assert_eq!("CNV1", a.copy_number_class());
    }

    #[test]
    fn report_entries() {
        let s = Sample::from_report_entry("S1;CASE").unwrap();
        assert_eq!(Sample::new("S1", true), s);
        assert_eq!("S1;CASE", s.to_report_entry());
        let s = Sample::from_report_entry("S2;CONTROL").unwrap();
        assert!(!s.affected);
        assert!(Sample::from_report_entry("S3").is_err());
        assert!(Sample::from_report_entry("S3;MAYBE").is_err());
    }

    #[test]
    fn affection_flag() {
        assert!(affected_from_flag("Yes"));
        assert!(!affected_from_flag("No"));
        assert!(!affected_from_flag("yes"));
        assert!(!affected_from_flag(""));
    }
}
