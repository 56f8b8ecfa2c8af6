pub mod kmer;
pub mod pipeline;
pub mod sequences;

use crate::error::{CliError, Result};
use crate::ui::Console;
use repeatskmer::core::io::regions::{self, SequenceRecord};
use repeatskmer::core::models::region::RegionRecord;
use repeatskmer::engine::report::BatchReport;
use repeatskmer::engine::source::{CachedSource, DirectorySource};
use std::path::Path;
use tracing::{info, warn};

fn load_region_records(path: &Path) -> Result<Vec<RegionRecord>> {
    info!("Loading region records from {:?}", path);
    regions::read_region_records_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn load_sequence_records(path: &Path) -> Result<Vec<SequenceRecord>> {
    info!("Loading sequence table from {:?}", path);
    regions::read_sequence_records_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn structure_source(dir: &Path) -> Result<CachedSource<DirectorySource>> {
    if !dir.is_dir() {
        return Err(CliError::Argument(format!(
            "Structure directory does not exist: {}",
            dir.display()
        )));
    }
    Ok(CachedSource::new(DirectorySource::new(dir)))
}

/// Prints a one-line outcome plus every per-region problem at warn level.
fn summarize(report: &BatchReport, console: &Console) {
    for diagnostic in &report.diagnostics {
        warn!("{}", diagnostic);
    }
    console.println(format!(
        "Processed {} region(s): {} reconstructed, {} failed, {} warning(s).",
        report.processed,
        report.reconstructed,
        report.failed,
        report.warning_count()
    ));
}
