use super::{load_region_records, structure_source, summarize};
use crate::cli::{CountingArgs, SequencesArgs};
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::ui::Console;
use crate::utils::progress::CliProgressHandler;
use repeatskmer::core::io::regions::write_sequence_table_to_path;
use repeatskmer::engine::progress::ProgressReporter;
use repeatskmer::workflows;
use tracing::info;

pub fn run(args: SequencesArgs, threads: Option<usize>, console: &Console) -> Result<()> {
    let config = build_config(&args.config, &CountingArgs::default(), &args.region, threads)?;
    let records = load_region_records(&args.regions)?;
    let source = structure_source(&args.structures)?;

    let progress_handler = CliProgressHandler::new(console.clone());
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the sequence reconstruction workflow...");
    let result = workflows::sequences::run_from_records(
        records,
        config.region_mode,
        &source,
        &config.pipeline,
        &reporter,
    )?;

    write_sequence_table_to_path(&result.regions, &args.output).map_err(|e| CliError::Output {
        path: args.output.clone(),
        source: e.into(),
    })?;

    summarize(&result.report, console);
    console.println(format!(
        "✓ {} sequence(s) written to: {}",
        result.regions.len(),
        args.output.display()
    ));
    Ok(())
}
