// Export writer
//
// Writes the requested report formats into the output directory. Each format
// is attempted independently; a failed write never stops the others.

use crate::analysis::AnalysisResult;
use crate::config::ExportFormat;
use crate::error::{Error, Result};
use crate::output::csv::render_csv;
use crate::output::html::HtmlGenerator;
use crate::output::json::render_json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File stem shared by every export of one run
pub const EXPORT_STEM: &str = "architecture_analysis";

/// Writes report files for one analysis result
pub struct ReportExporter {
    output_dir: PathBuf,
}

impl ReportExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path for a format, stamped with the analysis time
    pub fn path_for(&self, result: &AnalysisResult, format: ExportFormat) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.{}",
            EXPORT_STEM,
            result.timestamp.format("%Y%m%d_%H%M%S"),
            format.extension()
        ))
    }

    /// Write every requested format, collecting per-format failures
    pub fn export(&self, result: &AnalysisResult, formats: &[ExportFormat]) -> ExportReport {
        let mut report = ExportReport::default();
        if formats.is_empty() {
            return report;
        }

        if let Err(e) = fs::create_dir_all(&self.output_dir) {
            warn!(dir = %self.output_dir.display(), "cannot create output directory: {}", e);
            for &format in formats {
                let error = Error::write(
                    &self.output_dir,
                    std::io::Error::new(e.kind(), e.to_string()),
                );
                report.failures.push((format, error));
            }
            return report;
        }

        for &format in formats {
            let path = self.path_for(result, format);
            match self.export_one(result, format, &path) {
                Ok(()) => {
                    info!(format = %format, path = %path.display(), "export written");
                    report.written.push((format, path));
                }
                Err(e) => {
                    warn!(format = %format, "export failed: {}", e);
                    report.failures.push((format, e));
                }
            }
        }

        report
    }

    fn export_one(&self, result: &AnalysisResult, format: ExportFormat, path: &Path) -> Result<()> {
        let content = match format {
            ExportFormat::Json => render_json(result)?,
            ExportFormat::Csv => render_csv(result),
            ExportFormat::Html => HtmlGenerator::new()?.render(result)?,
        };
        fs::write(path, content).map_err(|e| Error::write(path, e))
    }
}

/// What an export pass wrote and what it could not
#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<(ExportFormat, PathBuf)>,
    pub failures: Vec<(ExportFormat, Error)>,
}

impl ExportReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Exported {} file(s), {} failure(s)",
            self.written.len(),
            self.failures.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::config::{Config, ExportTarget};
    use tempfile::TempDir;

    const PASSING: &str = "---\nphase: 1\nstep: 1\ntask: Build\ntask_id: T1\ntitle: First\nprevious_task: PHASE0\nnext_task: T2\nversion: 1\nagent: dev\norchestrator: lead\n---\n## Goal\n";

    fn sample_result(dir: &TempDir) -> AnalysisResult {
        fs::write(dir.path().join("a.md"), PASSING).unwrap();
        fs::write(dir.path().join("b.md"), PASSING.replace("T1", "T2")).unwrap();
        fs::write(dir.path().join("c.md"), "---\ntitle: partial\n---\n").unwrap();
        Analyzer::new(Config::default())
            .unwrap()
            .analyze(dir.path())
            .unwrap()
    }

    #[test]
    fn test_export_json_counts() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let result = sample_result(&src);

        let exporter = ReportExporter::new(out.path().join("exports"));
        let report = exporter.export(&result, &[ExportFormat::Json]);

        assert!(report.is_success());
        assert_eq!(report.written.len(), 1);
        let (format, path) = &report.written[0];
        assert_eq!(*format, ExportFormat::Json);
        assert!(path.starts_with(out.path().join("exports")));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["summary"]["total"], 3);
        assert_eq!(json["summary"]["passing"], 2);
        assert_eq!(json["summary"]["failing"], 1);
    }

    #[test]
    fn test_export_all_formats() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let result = sample_result(&src);

        let exporter = ReportExporter::new(out.path());
        let report = exporter.export(&result, &ExportTarget::All.formats());

        assert!(report.is_success());
        assert_eq!(report.written.len(), 3);
        for (_, path) in &report.written {
            assert!(path.exists());
        }
        assert!(report.summary().contains("3 file(s)"));
    }

    #[test]
    fn test_export_filename_pattern() {
        let src = TempDir::new().unwrap();
        let result = sample_result(&src);
        let exporter = ReportExporter::new("exports");

        let path = exporter.path_for(&result, ExportFormat::Csv);
        let name = path.file_name().unwrap().to_str().unwrap();

        assert!(name.starts_with("architecture_analysis_"));
        assert!(name.ends_with(".csv"));
        // architecture_analysis_YYYYmmdd_HHMMSS.csv
        assert_eq!(name.len(), "architecture_analysis_".len() + 15 + ".csv".len());
    }

    #[test]
    fn test_export_unwritable_dir() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let result = sample_result(&src);

        let blocker = out.path().join("not_a_dir");
        fs::write(&blocker, "file").unwrap();

        let exporter = ReportExporter::new(&blocker);
        let report = exporter.export(&result, &[ExportFormat::Json, ExportFormat::Csv]);

        assert!(!report.is_success());
        assert!(report.written.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(report.failures[0].1, Error::Write { .. }));
    }

    #[test]
    fn test_export_nothing_requested() {
        let src = TempDir::new().unwrap();
        let result = sample_result(&src);
        let out = TempDir::new().unwrap();

        let report = ReportExporter::new(out.path().join("never")).export(&result, &[]);
        assert!(report.is_success());
        assert!(!out.path().join("never").exists());
    }
}
