use crate::engine::reconstruct::{ReconstructionError, ReconstructionWarning};
use crate::engine::regions::DroppedRegion;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The region was left out before reconstruction.
    Dropped(String),
    /// No structure could be retrieved; the region has no sequence.
    Failed(ReconstructionError),
    Warning(ReconstructionWarning),
}

/// Something worth telling the user about a single region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDiagnostic {
    pub region_id: String,
    pub kind: DiagnosticKind,
}

impl fmt::Display for RegionDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::Dropped(reason) => write!(f, "{}: dropped ({})", self.region_id, reason),
            DiagnosticKind::Failed(e) => write!(f, "{}: failed ({})", self.region_id, e),
            DiagnosticKind::Warning(w) => write!(f, "{}: {}", self.region_id, w),
        }
    }
}

/// Outcome counters and per-region diagnostics of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub reconstructed: usize,
    pub failed: usize,
    pub rows_written: usize,
    pub diagnostics: Vec<RegionDiagnostic>,
}

impl BatchReport {
    pub fn record_dropped(&mut self, dropped: &[DroppedRegion]) {
        self.diagnostics
            .extend(dropped.iter().map(|d| RegionDiagnostic {
                region_id: d.region_id.clone(),
                kind: DiagnosticKind::Dropped(d.reason.to_string()),
            }));
    }

    pub fn failures(&self) -> impl Iterator<Item = &RegionDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.kind, DiagnosticKind::Failed(_)))
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.kind, DiagnosticKind::Warning(_)))
            .count()
    }

    pub fn log_summary(&self) {
        info!(
            processed = self.processed,
            reconstructed = self.reconstructed,
            failed = self.failed,
            rows = self.rows_written,
            warnings = self.warning_count(),
            "Batch finished."
        );
        if self.failed > 0 {
            warn!(
                "{} region(s) could not be reconstructed and have empty sequences.",
                self.failed
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::region::RegionError;

    #[test]
    fn report_separates_failures_from_warnings() {
        let mut report = BatchReport::default();
        report.record_dropped(&[DroppedRegion {
            region_id: "bad".into(),
            reason: RegionError::InvalidRegionId("bad".into()),
        }]);
        report.diagnostics.push(RegionDiagnostic {
            region_id: "r1".into(),
            kind: DiagnosticKind::Failed(ReconstructionError::RetrievalFailure {
                structure_id: "9zzz".into(),
                primary: "no pdb".into(),
                fallback: "no cif".into(),
            }),
        });
        report.diagnostics.push(RegionDiagnostic {
            region_id: "r2".into(),
            kind: DiagnosticKind::Warning(ReconstructionWarning::LengthMismatch {
                expected: 3,
                actual: 2,
            }),
        });

        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(
            report.diagnostics[2].to_string(),
            "r2: sequence has 2 residues but the window spans 3"
        );
        assert!(report.diagnostics[0].to_string().starts_with("bad: dropped"));
    }
}
