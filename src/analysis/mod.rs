// Analysis module: walks a folder and validates every markdown file in it

pub mod record;
pub mod schema;
pub mod stats;
pub mod tree;
pub mod workflow;

pub use record::*;
pub use schema::*;
pub use stats::*;
pub use tree::*;
pub use workflow::*;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::parser::{extract_headers, parse_front_matter, FrontMatterState};
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A subfolder holding markdown files that a shallow run did not analyze
#[derive(Debug, Clone, Serialize)]
pub struct SubfolderHint {
    pub name: String,
    pub path: PathBuf,
    pub markdown_files: usize,
}

/// Result of analyzing a folder
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub root_path: PathBuf,
    pub recursive: bool,
    pub timestamp: DateTime<Local>,
    /// Full directory tree, present even when no markdown was found
    pub tree: FileNode,
    /// One record per markdown file, in tree order
    pub records: Vec<ValidationRecord>,
    pub tree_warnings: Vec<TreeWarning>,
    pub stats: AnalysisStats,
    pub required_fields: RequiredFieldSet,
    pub workflow: WorkflowSummary,
    /// Only filled when a shallow run found no markdown
    pub subfolder_hints: Vec<SubfolderHint>,
}

impl AnalysisResult {
    pub fn has_markdown(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn failing_records(&self) -> impl Iterator<Item = &ValidationRecord> {
        self.records.iter().filter(|r| !r.passed)
    }
}

/// Main analyzer that orchestrates walk, parse and validation
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: Config,
    walker: TreeWalker,
    validator: SchemaValidator,
    verbose: bool,
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let walker = TreeWalker::from_config(&config.scan)?;
        let validator = SchemaValidator::new(RequiredFieldSet::from_config(&config.schema));

        Ok(Self {
            config,
            walker,
            validator,
            verbose: false,
        })
    }

    /// Create analyzer with a progress bar while parsing
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Walk the tree only, without reading any file
    pub fn walk(&self, root: &Path) -> Result<WalkOutcome> {
        self.walker.walk(root)
    }

    /// Analyze the folder at the given path
    pub fn analyze(&self, root: &Path) -> Result<AnalysisResult> {
        let timestamp = Local::now();

        // Step 1: Build the tree
        let WalkOutcome { root: tree, warnings } = self.walker.walk(root)?;
        let files = tree.markdown_files();
        info!(root = %root.display(), files = files.len(), "walked folder");

        // Step 2: Parse and validate files; collect keeps tree order
        let progress = self.progress_bar(files.len());
        let records: Vec<ValidationRecord> = files
            .par_iter()
            .map(|node| {
                let record = self.analyze_file(node);
                if let Some(ref pb) = progress {
                    pb.set_message(node.name.clone());
                    pb.inc(1);
                }
                record
            })
            .collect();
        if let Some(pb) = progress {
            pb.finish_with_message("Parsing complete");
        }

        // Step 3: Aggregate
        let stats = AnalysisStats::from_records(&records, &warnings);
        let workflow = WorkflowSummary::build(&records, &self.config.workflow);
        let subfolder_hints = if records.is_empty() && !self.config.scan.recursive {
            self.subfolder_hints(&tree)
        } else {
            Vec::new()
        };

        Ok(AnalysisResult {
            root_path: root.to_path_buf(),
            recursive: self.config.scan.recursive,
            timestamp,
            tree,
            records,
            tree_warnings: warnings,
            stats,
            required_fields: self.validator.required().clone(),
            workflow,
            subfolder_hints,
        })
    }

    /// Read, parse and validate one markdown file; never fails the run
    pub fn analyze_file(&self, node: &FileNode) -> ValidationRecord {
        let mut record = ValidationRecord {
            name: node.name.clone(),
            path: node.path.clone(),
            relative_path: node.relative_path.clone(),
            status: RecordStatus::Unreadable,
            passed: false,
            front_matter: None,
            missing_fields: Vec::new(),
            headers: Vec::new(),
            warnings: Vec::new(),
            error: None,
        };

        let content = match std::fs::read_to_string(&node.path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %node.path.display(), error = %e, "cannot read file");
                return self.failed_record(
                    record,
                    RecordStatus::Unreadable,
                    format!("Error reading file: {}", e),
                );
            }
        };

        record.headers = extract_headers(&content);

        let state = match parse_front_matter(&content) {
            Ok(state) => state,
            Err(e @ Error::MalformedFrontMatter { .. }) => {
                warn!(path = %node.path.display(), "unterminated front matter");
                return self.failed_record(record, RecordStatus::Malformed, e.to_string());
            }
            Err(e) => {
                warn!(path = %node.path.display(), error = %e, "cannot parse front matter");
                return self.failed_record(record, RecordStatus::Unreadable, e.to_string());
            }
        };

        let check = self.validator.validate(state.front_matter());
        record.status = match (&state, check.passed()) {
            (FrontMatterState::Absent, _) => RecordStatus::NoFrontMatter,
            (_, true) => RecordStatus::Pass,
            (_, false) => RecordStatus::MissingFields,
        };
        record.passed = record.status.passed();
        record.missing_fields = check.missing;

        if let Some(fm) = state.into_front_matter() {
            for w in &fm.warnings {
                warn!(path = %node.relative_path, "{}", w);
            }
            record.warnings = fm.warnings.clone();
            record.front_matter = Some(fm);
        }

        debug!(path = %node.relative_path, status = ?record.status, "validated file");
        record
    }

    /// A record that could not be validated lists every required field as missing
    fn failed_record(
        &self,
        mut record: ValidationRecord,
        status: RecordStatus,
        error: String,
    ) -> ValidationRecord {
        record.status = status;
        record.passed = false;
        record.missing_fields = self.validator.required().as_slice().to_vec();
        record.error = Some(error);
        record
    }

    /// Immediate subdirectories that hold markdown files
    fn subfolder_hints(&self, tree: &FileNode) -> Vec<SubfolderHint> {
        tree.children
            .iter()
            .filter(|c| c.is_dir())
            .filter_map(|dir| {
                let count = self.walker.count_markdown(&dir.path);
                (count > 0).then(|| SubfolderHint {
                    name: dir.name.clone(),
                    path: dir.path.clone(),
                    markdown_files: count,
                })
            })
            .collect()
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.verbose || len == 0 {
            return None;
        }

        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VALID: &str = "---\nphase: 1\nstep: 1\ntask: 1\ntask_id: P1-S1-T1\ntitle: Setup\n\
previous_task: PHASE-START\nnext_task: P1-S1-T2\nversion: 1.0\nagent: builder\norchestrator: main\n---\n\
# Setup\n## Goal\n## Steps\n";

    fn analyzer(recursive: bool) -> Analyzer {
        let mut config = Config::default();
        config.scan.recursive = recursive;
        Analyzer::new(config).unwrap()
    }

    #[test]
    fn test_analyze_valid_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("task.md"), VALID).unwrap();

        let result = analyzer(false).analyze(dir.path()).unwrap();
        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.status, RecordStatus::Pass);
        assert!(record.passed);
        assert!(record.missing_fields.is_empty());
        assert_eq!(record.headers, vec!["Goal", "Steps"]);
        assert_eq!(result.stats.passing, 1);
    }

    #[test]
    fn test_analyze_missing_fields() {
        let dir = TempDir::new().unwrap();
        let content = VALID
            .replace("task_id: P1-S1-T1\n", "")
            .replace("agent: builder\n", "");
        fs::write(dir.path().join("task.md"), content).unwrap();

        let result = analyzer(false).analyze(dir.path()).unwrap();
        let record = &result.records[0];
        assert_eq!(record.status, RecordStatus::MissingFields);
        assert_eq!(record.verdict(), "fail");
        assert_eq!(record.missing_fields, vec!["task_id", "agent"]);
    }

    #[test]
    fn test_analyze_no_front_matter() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("plain.md"), "# Plain\n## Section\n").unwrap();

        let result = analyzer(false).analyze(dir.path()).unwrap();
        let record = &result.records[0];
        assert_eq!(record.status, RecordStatus::NoFrontMatter);
        assert!(record.front_matter.is_none());
        assert_eq!(record.missing_fields.len(), 10);
        assert_eq!(result.stats.missing_front_matter, 1);
    }

    #[test]
    fn test_analyze_malformed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.md"), "---\ntitle: x\n## Section\n").unwrap();

        let result = analyzer(false).analyze(dir.path()).unwrap();
        let record = &result.records[0];
        assert_eq!(record.status, RecordStatus::Malformed);
        assert!(!record.passed);
        assert!(record.error.as_deref().unwrap().contains("line 1"));
        assert_eq!(record.headers, vec!["Section"]);
        assert_eq!(record.missing_fields.len(), 10);
        assert_eq!(result.stats.malformed, 1);
        assert_eq!(result.stats.missing_front_matter, 0);
    }

    #[test]
    fn test_unreadable_file_does_not_abort() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), VALID).unwrap();
        fs::write(dir.path().join("b.md"), [0xff, 0xfe, 0x00]).unwrap();

        let result = analyzer(false).analyze(dir.path()).unwrap();
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].status, RecordStatus::Pass);
        assert_eq!(result.records[1].status, RecordStatus::Unreadable);
        assert!(result.records[1].error.is_some());
        assert_eq!(result.records[1].missing_fields.len(), 10);
        assert_eq!(result.stats.unreadable, 1);
    }

    #[test]
    fn test_failed_record_lists_every_required_field() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), VALID).unwrap();
        let analyzer = analyzer(false);
        let passing = analyzer.analyze(dir.path()).unwrap().records.remove(0);
        assert!(passing.missing_fields.is_empty());

        let failed = analyzer.failed_record(passing, RecordStatus::Unreadable, "boom".to_string());
        assert_eq!(failed.status, RecordStatus::Unreadable);
        assert!(!failed.passed);
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert_eq!(failed.missing_fields, analyzer.config().schema.required_fields);
    }

    #[test]
    fn test_records_follow_tree_order() {
        let dir = TempDir::new().unwrap();
        for name in ["c.md", "a.md", "b.md"] {
            fs::write(dir.path().join(name), VALID).unwrap();
        }
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/0.md"), VALID).unwrap();

        let result = analyzer(true).analyze(dir.path()).unwrap();
        let order: Vec<&str> = result.records.iter().map(|r| r.relative_path.as_str()).collect();
        assert_eq!(order, vec!["a.md", "b.md", "c.md", "sub/0.md"]);
    }

    #[test]
    fn test_no_markdown_keeps_tree_and_hints() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("phase1")).unwrap();
        fs::write(dir.path().join("phase1/one.md"), VALID).unwrap();
        fs::write(dir.path().join("phase1/two.md"), VALID).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();

        let result = analyzer(false).analyze(dir.path()).unwrap();
        assert!(!result.has_markdown());
        assert_eq!(result.tree.children.len(), 3);
        assert_eq!(result.subfolder_hints.len(), 1);
        assert_eq!(result.subfolder_hints[0].name, "phase1");
        assert_eq!(result.subfolder_hints[0].markdown_files, 2);
    }

    #[test]
    fn test_empty_folder() {
        let dir = TempDir::new().unwrap();
        let result = analyzer(false).analyze(dir.path()).unwrap();
        assert!(result.records.is_empty());
        assert!(result.tree.children.is_empty());
        assert_eq!(result.stats.total, 0);
    }

    #[test]
    fn test_duplicate_keys_are_counted_as_warnings() {
        let dir = TempDir::new().unwrap();
        let content = VALID.replace("agent: builder\n", "agent: builder\nagent: reviewer\n");
        fs::write(dir.path().join("dup.md"), content).unwrap();

        let result = analyzer(false).analyze(dir.path()).unwrap();
        let record = &result.records[0];
        assert!(record.passed);
        assert_eq!(record.field("agent").as_deref(), Some("reviewer"));
        assert_eq!(record.warnings.len(), 1);
        assert_eq!(result.stats.warnings, 1);
    }

    #[test]
    fn test_custom_schema_from_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("doc.md"), "---\ntitle: Only\n---\n").unwrap();

        let mut config = Config::default();
        config.schema.required_fields = vec!["title".to_string()];
        let result = Analyzer::new(config).unwrap().analyze(dir.path()).unwrap();
        assert!(result.records[0].passed);
        assert_eq!(result.required_fields.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.live.refresh_secs = 0;
        assert!(Analyzer::new(config).is_err());
    }
}
