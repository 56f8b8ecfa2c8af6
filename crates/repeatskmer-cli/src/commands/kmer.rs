use super::{load_sequence_records, summarize};
use crate::cli::{KmerArgs, RegionArgs};
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::ui::Console;
use crate::utils::progress::CliProgressHandler;
use repeatskmer::engine::progress::ProgressReporter;
use repeatskmer::workflows;
use tracing::info;

pub fn run(args: KmerArgs, threads: Option<usize>, console: &Console) -> Result<()> {
    let config = build_config(&args.config, &args.counting, &RegionArgs::default(), threads)?;
    let records = load_sequence_records(&args.input)?;

    let progress_handler = CliProgressHandler::new(console.clone());
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(
        k = config.pipeline.kmer.k,
        mode = %config.pipeline.kmer.mode,
        "Invoking the k-mer counting workflow..."
    );
    let result = workflows::kmer_table::run_from_sequences(records, &config.pipeline, &reporter)?;

    result
        .table
        .write_to_path(&args.output, config.pipeline.table.separator)
        .map_err(|e| CliError::Output {
            path: args.output.clone(),
            source: e.into(),
        })?;

    summarize(&result.report, console);
    console.println(format!(
        "✓ {} row(s) x {} column(s) written to: {}",
        result.table.len(),
        result.table.header().len(),
        args.output.display()
    ));
    Ok(())
}
