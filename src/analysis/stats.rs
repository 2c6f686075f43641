// Aggregate statistics over validation records

use crate::analysis::record::{RecordStatus, ValidationRecord};
use crate::analysis::tree::TreeWarning;
use serde::{Deserialize, Serialize};

/// Run-wide counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total: usize,
    pub passing: usize,
    pub failing: usize,
    pub missing_front_matter: usize,
    pub malformed: usize,
    pub unreadable: usize,
    /// Front-matter parse warnings plus tree warnings
    pub warnings: usize,
    pub total_headers: usize,
}

impl AnalysisStats {
    /// Reduce records (and walk warnings) into counts
    pub fn from_records(records: &[ValidationRecord], tree_warnings: &[TreeWarning]) -> Self {
        let count = |status: RecordStatus| records.iter().filter(|r| r.status == status).count();

        let total = records.len();
        let passing = records.iter().filter(|r| r.passed).count();

        Self {
            total,
            passing,
            failing: total - passing,
            missing_front_matter: count(RecordStatus::NoFrontMatter),
            malformed: count(RecordStatus::Malformed),
            unreadable: count(RecordStatus::Unreadable),
            warnings: records.iter().map(|r| r.warnings.len()).sum::<usize>() + tree_warnings.len(),
            total_headers: records.iter().map(|r| r.headers.len()).sum(),
        }
    }

    /// Passing share in percent, 0 when nothing was analyzed
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passing as f64 / self.total as f64 * 100.0
        }
    }
}
