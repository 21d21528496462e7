use std::{env, fs::File, process};

use anyhow::{Context, Result};
use clap::Parser;
use cnv_analysis::{
    self, annotate,
    cli::{Cli, Commands},
    filter,
    io::{genes::read_gene_tiers, output_writer, report::write_report},
    utils,
};
use env_logger::{Builder, Env, Target};
use log::{error, info, LevelFilter};
use rayon::ThreadPoolBuilder;

fn main() {
    // parse command line; clap exits with status 2 on invalid input
    let config = Cli::parse();

    if let Err(e) = init_logging(config.log.as_deref()) {
        eprintln!("cnv-analysis ERROR: {e:#}, exiting");
        process::exit(utils::EXIT_FILE_IO_ERROR);
    }
    info!("Program started");
    info!(
        "Command line: {}",
        env::args().collect::<Vec<String>>().join(" ")
    );

    if let Err(e) = dispatch(config.command) {
        error!("{e:?}");
        eprintln!("cnv-analysis ERROR: {e:#}, exiting");
        process::exit(utils::exit_status(&e));
    }
}

/// Initialize the logger. If the log level is not set via `RUST_LOG`, set it to 'info' by default.
/// With a log file, everything down to 'debug' is recorded there instead of on stderr.
fn init_logging(log_path: Option<&str>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(path) = log_path {
        let file = File::create(path).with_context(|| format!("Could not create log file {path}"))?;
        builder
            .filter_level(LevelFilter::Debug)
            .target(Target::Pipe(Box::new(file)));
    }
    builder.init();

    Ok(())
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::CaseControl {
            merged,
            all,
            output,
            graphs,
            graph_format,
            threads,
        } => {
            ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()?;

            let analysis = cnv_analysis::case_control(&merged, &all)?;
            info!(
                "Tested {} family/CNV pairs in {} families",
                analysis.results.len(),
                analysis.n_families
            );

            let writer = output_writer(output.as_deref())?;
            write_report(writer, &analysis.results)?;

            if let Some(outdir) = graphs {
                let summaries = cnv_analysis::summarise_results(&analysis.results);
                let n = cnv_analysis::write_graphs(&summaries, &outdir, graph_format)?;
                info!("Wrote {n} family graphs to {outdir}");
            }
        }
        Commands::Graph {
            report,
            out,
            format,
        } => {
            let n = cnv_analysis::graph_report(&report, &out, format)?;
            info!("Wrote {n} family graphs to {out}");
        }
        Commands::Annotate {
            genes,
            cnvs,
            output,
        } => {
            let gene_tiers = read_gene_tiers(&genes)?;
            let writer = output_writer(output.as_deref())?;
            annotate::annotate_cnvs(&gene_tiers.index, &cnvs, writer)?;
        }
        Commands::Filter { cnvs, output } => {
            let writer = output_writer(output.as_deref())?;
            filter::filter_families(&cnvs, writer)?;
        }
    }

    info!("Program finished");
    Ok(())
}
