use crate::core::models::region::{Region, RegionRecord};
use crate::engine::config::PipelineConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::reconstruct::SequenceReconstructor;
use crate::engine::regions::{DroppedRegion, RegionMode, prepare_regions};
use crate::engine::report::{BatchReport, DiagnosticKind, RegionDiagnostic};
use crate::engine::source::StructureSource;
use crate::engine::tasks::region_batch;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct SequenceResult {
    /// Regions in input order; failed ones keep `sequence() == None`.
    pub regions: Vec<Region>,
    pub report: BatchReport,
}

/// What reconstructing a single region produced.
pub(crate) struct RegionOutcome {
    pub region: Region,
    pub diagnostics: Vec<RegionDiagnostic>,
    pub failed: bool,
}

impl RegionOutcome {
    pub(crate) fn record_into(&mut self, report: &mut BatchReport, reporter: &ProgressReporter) {
        report.processed += 1;
        if self.failed {
            report.failed += 1;
            reporter.report(Progress::RegionFailed {
                region_id: self.region.row_id().to_string(),
            });
        } else {
            report.reconstructed += 1;
        }
        report.diagnostics.append(&mut self.diagnostics);
    }
}

pub(crate) fn reconstruct_one<S: StructureSource + ?Sized>(
    reconstructor: &SequenceReconstructor<'_, S>,
    region: Region,
) -> RegionOutcome {
    if region.sequence().is_some() {
        debug!(region = %region.row_id(), "Sequence already known, skipping reconstruction.");
        return RegionOutcome {
            region,
            diagnostics: Vec::new(),
            failed: false,
        };
    }

    match reconstructor.reconstruct_region(&region) {
        Ok(reconstruction) => {
            let diagnostics = reconstruction
                .warnings
                .into_iter()
                .map(|w| RegionDiagnostic {
                    region_id: region.row_id().to_string(),
                    kind: DiagnosticKind::Warning(w),
                })
                .collect();
            RegionOutcome {
                region: region.with_sequence(Some(reconstruction.sequence)),
                diagnostics,
                failed: false,
            }
        }
        Err(e) => {
            warn!(region = %region.row_id(), "Reconstruction failed: {}", e);
            let diagnostics = vec![RegionDiagnostic {
                region_id: region.row_id().to_string(),
                kind: DiagnosticKind::Failed(e),
            }];
            RegionOutcome {
                region,
                diagnostics,
                failed: true,
            }
        }
    }
}

/// Reconstructs the sequence of every region in parallel.
///
/// A region whose structure cannot be retrieved is kept with no sequence and
/// reported; it never aborts the batch.
#[instrument(skip_all, name = "sequence_workflow")]
pub fn run<S: StructureSource + ?Sized>(
    regions: Vec<Region>,
    source: &S,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<SequenceResult, EngineError> {
    info!(
        regions = regions.len(),
        workers = config.execution.workers,
        "Starting sequence reconstruction."
    );
    reporter.report(Progress::PhaseStart {
        name: "Sequence Reconstruction",
    });

    let reconstructor = SequenceReconstructor::new(source);
    let mut report = BatchReport::default();
    let mut finished = Vec::with_capacity(regions.len());

    region_batch::run(
        regions,
        &config.execution,
        reporter,
        |region| reconstruct_one(&reconstructor, region),
        |_, mut outcome| {
            outcome.record_into(&mut report, reporter);
            finished.push(outcome.region);
        },
    )?;

    reporter.report(Progress::PhaseFinish);
    report.log_summary();
    Ok(SequenceResult {
        regions: finished,
        report,
    })
}

/// Prepares raw region records and reconstructs the resulting regions.
/// Regions discarded during preparation appear in the report as dropped.
pub fn run_from_records<S: StructureSource + ?Sized>(
    records: Vec<RegionRecord>,
    mode: RegionMode,
    source: &S,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> Result<SequenceResult, EngineError> {
    let prepared = prepare_regions(records, mode);
    report_dropped(&prepared.dropped, reporter);
    let mut result = run(prepared.regions, source, config, reporter)?;
    result.report.record_dropped(&prepared.dropped);
    Ok(result)
}

pub(crate) fn report_dropped(dropped: &[DroppedRegion], reporter: &ProgressReporter) {
    if !dropped.is_empty() {
        reporter.report(Progress::Message(format!(
            "{} region(s) dropped during preparation",
            dropped.len()
        )));
    }
}
