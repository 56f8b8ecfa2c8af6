use super::{load_region_records, structure_source, summarize};
use crate::cli::PipelineArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::ui::Console;
use crate::utils::progress::CliProgressHandler;
use repeatskmer::core::io::regions::write_sequence_table_to_path;
use repeatskmer::engine::progress::ProgressReporter;
use repeatskmer::workflows;
use tracing::info;

pub fn run(args: PipelineArgs, threads: Option<usize>, console: &Console) -> Result<()> {
    let config = build_config(&args.config, &args.counting, &args.region, threads)?;
    let records = load_region_records(&args.regions)?;
    let source = structure_source(&args.structures)?;

    let progress_handler = CliProgressHandler::new(console.clone());
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!(
        records = records.len(),
        k = config.pipeline.kmer.k,
        mode = %config.pipeline.kmer.mode,
        "Invoking the reconstruction and k-mer counting workflow..."
    );
    let result = workflows::kmer_table::run_from_records(
        records,
        config.region_mode,
        &source,
        &config.pipeline,
        &reporter,
    )?;

    if let Some(path) = &args.sequences_output {
        write_sequence_table_to_path(&result.regions, path).map_err(|e| CliError::Output {
            path: path.clone(),
            source: e.into(),
        })?;
        console.println(format!("✓ Sequences written to: {}", path.display()));
    }

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
