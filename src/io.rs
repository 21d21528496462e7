//! # Reading and writing tab-delimited CNV tables and graph documents
//!
//! All tables are tab-delimited with a header row. Rows are converted to typed records
//! once, as they are read; everything past this module works on typed values only.
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use csv::{Reader, ReaderBuilder, Writer, WriterBuilder};

pub mod calls;
pub mod genes;
pub mod graph;
pub mod merged;
pub mod report;

/// A row that was left out of the analysis, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

/// Open a tab-delimited table with a header row.
pub fn tsv_reader<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
    ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .from_path(&path)
        .with_context(|| format!("Could not read table {}", path.as_ref().display()))
}

pub fn tsv_writer<W: Write>(writer: W) -> Writer<W> {
    WriterBuilder::new().delimiter(b'\t').from_writer(writer)
}

/// Write to the file at `path`, or to stdout if no path is given.
pub fn output_writer(path: Option<&str>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Could not create output file {path}"))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}
