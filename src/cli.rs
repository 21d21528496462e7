//! # Command line interface for `cnv-analysis`
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::io::graph::GraphFormat;

#[derive(Parser)]
#[command(
    name = "cnv-analysis",
    author,
    version,
    about = "Family-based case/control analysis of copy number variants",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Record program progress in LOG_FILE, at debug level
    #[arg(long, global = true, value_name = "LOG_FILE")]
    pub log: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Test CNV regions for association with affected status within families
    CaseControl {
        /// Merged CNVs per family. Expected columns: family, chr, start, end, copy_number, genes
        #[arg(long, value_name = "MERGED_CNV_FILE")]
        merged: String,

        /// CNV calls of all samples. Repeated measurements are written to <stem>.dups.tsv next to this file
        #[arg(long, value_name = "ALL_CNV_FILE")]
        all: String,

        /// Association report. Written to stdout if not given
        #[arg(short, long)]
        output: Option<String>,

        /// Also write one relationship graph per family to this directory
        #[arg(long, value_name = "DIR")]
        graphs: Option<String>,

        /// Format of the relationship graphs
        #[arg(long, value_enum, default_value_t = GraphFormat::Graphml)]
        graph_format: GraphFormat,

        /// Number of threads to use
        #[arg(long, default_value_t = 1, value_parser = threads_in_range)]
        threads: usize,
    },
    /// Draw one relationship graph per family from an association report
    Graph {
        /// Association report, as written by `cnv-analysis case-control`
        report: String,

        /// Output directory, created if missing
        #[arg(long, default_value = "out")]
        out: String,

        /// Graph format
        #[arg(long, value_enum, default_value_t = GraphFormat::Graphml)]
        format: GraphFormat,
    },
    /// Annotate CNVs with the tiered genes they overlap. CNVs without overlapping genes are dropped
    Annotate {
        /// Gene coordinates. Expected columns: chromosome, GRCh37 start, GRCh37 end, symbol, tier
        #[arg(long, value_name = "GENES_FILE")]
        genes: String,

        /// CNVs to annotate. Expected columns: chr, start, end
        #[arg(long, value_name = "CNV_FILE")]
        cnvs: String,

        /// Annotated CNVs. Written to stdout if not given
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Keep CNVs of the youngest affected member of each family and of population samples
    Filter {
        /// Input CNV file
        #[arg(value_name = "CNV_FILE")]
        cnvs: String,

        /// Filtered CNVs. Written to stdout if not given
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn threads_in_range(s: &str) -> Result<usize> {
    let threads = s
        .parse()
        .context("Could not parse value passed to --threads to integer")?;
    if threads < 1 {
        bail!("--threads must be at least 1");
    }
    Ok(threads)
}
