use crate::core::io::regions::SequenceRecord;
use crate::core::models::region::{Region, RegionRecord};
use crate::engine::config::{PipelineConfig, TableConfig};
use crate::engine::error::EngineError;
use crate::engine::kmer::{KmerCountRow, KmerCounter};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::reconstruct::SequenceReconstructor;
use crate::engine::regions::{RegionMode, prepare_regions};
use crate::engine::report::BatchReport;
use crate::engine::source::StructureSource;
use crate::engine::table::{KmerTable, KmerTableWriter};
use crate::engine::tasks::region_batch;
use crate::workflows::sequences::{reconstruct_one, report_dropped};
use tracing::{error, info, instrument};

#[derive(Debug, Clone)]
pub struct KmerTableResult {
    pub table: KmerTable,
    /// Regions with their reconstructed sequences, when the run started from
    /// structures. Empty for runs over an existing sequence table.
    pub regions: Vec<Region>,
    pub report: BatchReport,
}

/// Reconstructs every region, counts its k-mers and collects the rows into a
/// dynamic-schema table, all in input order.
#[instrument(skip_all, name = "kmer_table_workflow")]
pub fn run<S: StructureSource + ?Sized>(
    regions: Vec<Region>,
    source: &S,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<KmerTableResult, EngineError> {
    let counter = KmerCounter::new(config.kmer.k, config.kmer.mode)?;
    info!(
        regions = regions.len(),
        k = counter.k(),
        mode = %counter.mode(),
        "Starting reconstruction and k-mer counting."
    );
    reporter.report(Progress::PhaseStart {
        name: "Reconstruction & Counting",
    });

    let reconstructor = SequenceReconstructor::new(source);
    let mut writer = KmerTableWriter::from_config(&config.table);
    let mut report = BatchReport::default();
    let mut finished = Vec::with_capacity(regions.len());

    region_batch::run(
        regions,
        &config.execution,
        reporter,
        |region| {
            let outcome = reconstruct_one(&reconstructor, region);
            let counts = counter.count(outcome.region.sequence());
            (outcome, counts)
        },
        |_, (mut outcome, counts)| {
            outcome.record_into(&mut report, reporter);
            let row = KmerCountRow {
                region_id: outcome.region.row_id().to_string(),
                label: outcome.region.label.clone(),
                sequence: outcome.region.sequence().map(str::to_string),
                counts,
            };
            write_count_row(&mut writer, &row, &config.table, &mut report);
            finished.push(outcome.region);
        },
    )?;

    let table = writer.finalize()?;
    reporter.report(Progress::PhaseFinish);
    report.log_summary();
    Ok(KmerTableResult {
        table,
        regions: finished,
        report,
    })
}

/// Prepares raw region records, then reconstructs and counts the resulting
/// regions. Regions discarded during preparation appear in the report as
/// dropped.
pub fn run_from_records<S: StructureSource + ?Sized>(
    records: Vec<RegionRecord>,
    mode: RegionMode,
    source: &S,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<KmerTableResult, EngineError> {
    let prepared = prepare_regions(records, mode);
    report_dropped(&prepared.dropped, reporter);
    let mut result = run(prepared.regions, source, config, reporter)?;
    result.report.record_dropped(&prepared.dropped);
    Ok(result)
}

/// Counts k-mers over already reconstructed sequences.
#[instrument(skip_all, name = "kmer_counting_workflow")]
pub fn run_from_sequences(
    records: Vec<SequenceRecord>,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<KmerTableResult, EngineError> {
    let counter = KmerCounter::new(config.kmer.k, config.kmer.mode)?;
    info!(
        sequences = records.len(),
        k = counter.k(),
        mode = %counter.mode(),
        "Starting k-mer counting."
    );
    reporter.report(Progress::PhaseStart {
        name: "K-mer Counting",
    });

    let mut writer = KmerTableWriter::from_config(&config.table);
    let mut report = BatchReport::default();

    region_batch::run(
        records,
        &config.execution,
        reporter,
        |record| {
            let counts = counter.count(record.sequence.as_deref());
            KmerCountRow {
                region_id: record.unit_id.unwrap_or(record.region_id),
                label: record.label,
                sequence: record.sequence,
                counts,
            }
        },
        |_, row| {
            report.processed += 1;
            write_count_row(&mut writer, &row, &config.table, &mut report);
        },
    )?;

    let table = writer.finalize()?;
    reporter.report(Progress::PhaseFinish);
    report.log_summary();
    Ok(KmerTableResult {
        table,
        regions: Vec::new(),
        report,
    })
}

fn write_count_row(
    writer: &mut KmerTableWriter,
    row: &KmerCountRow,
    config: &TableConfig,
    report: &mut BatchReport,
) {
    if config.skip_empty_sequences && !row.has_sequence() {
        return;
    }
    match writer.write_row(row.fields(), &row.counts) {
        Ok(()) => report.rows_written += 1,
        Err(e) => error!(region = %row.region_id, "Failed to add table row: {}", e),
    }
}
