use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "archmark.toml";

/// Front-matter fields every workflow document must carry
pub const DEFAULT_REQUIRED_FIELDS: [&str; 10] = [
    "phase",
    "step",
    "task",
    "task_id",
    "title",
    "previous_task",
    "next_task",
    "version",
    "agent",
    "orchestrator",
];

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub schema: SchemaConfig,
    pub output: OutputConfig,
    pub live: LiveConfig,
    pub workflow: WorkflowConfig,
}

/// Tree walking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub recursive: bool,
    /// Keep dot-prefixed entries
    pub include_hidden: bool,
    /// Glob patterns matched against entry names and root-relative paths
    pub ignore: Vec<String>,
    /// File extensions treated as markdown (case-insensitive)
    pub extensions: Vec<String>,
}

/// Front-matter schema settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    pub required_fields: Vec<String>,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub export: Option<ExportTarget>,
}

/// Live HTML report settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    pub refresh_secs: u64,
}

/// Workflow dependency settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// `previous_task` references starting with one of these count as resolved
    pub previous_prefixes: Vec<String>,
    /// `next_task` references starting with one of these count as resolved
    pub next_prefixes: Vec<String>,
}

/// Requested export target
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportTarget {
    Json,
    Csv,
    Html,
    All,
}

/// A single export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Html,
}

impl ExportTarget {
    /// Expand the target into concrete formats, in export order
    pub fn formats(self) -> Vec<ExportFormat> {
        match self {
            ExportTarget::Json => vec![ExportFormat::Json],
            ExportTarget::Csv => vec![ExportFormat::Csv],
            ExportTarget::Html => vec![ExportFormat::Html],
            ExportTarget::All => vec![ExportFormat::Json, ExportFormat::Csv, ExportFormat::Html],
        }
    }
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            include_hidden: false,
            ignore: vec![
                "node_modules".to_string(),
                "target".to_string(),
                "__pycache__".to_string(),
            ],
            extensions: vec!["md".to_string(), "markdown".to_string()],
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            required_fields: DEFAULT_REQUIRED_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./exports"),
            export: None,
        }
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from("."),
            refresh_secs: 30,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            previous_prefixes: vec!["PHASE".to_string()],
            next_prefixes: vec!["P".to_string()],
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Merge CLI arguments into config (CLI takes precedence)
    pub fn merge_cli(
        &mut self,
        recursive: bool,
        export: Option<ExportTarget>,
        output_dir: Option<PathBuf>,
        live: bool,
    ) {
        if recursive {
            self.scan.recursive = true;
        }

        if export.is_some() {
            self.output.export = export;
        }

        if let Some(dir) = output_dir {
            self.output.directory = dir;
        }

        if live {
            self.live.enabled = true;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let fields = &self.schema.required_fields;
        if fields.is_empty() {
            return Err(Error::config_validation("at least one required field must be listed"));
        }

        let mut seen = HashSet::new();
        for field in fields {
            if field.trim().is_empty() {
                return Err(Error::config_validation("required field names cannot be blank"));
            }
            if !seen.insert(field.as_str()) {
                return Err(Error::config_validation(format!(
                    "required field '{}' is listed twice",
                    field
                )));
            }
        }

        if self.scan.extensions.is_empty() {
            return Err(Error::config_validation("at least one markdown extension required"));
        }

        if self.live.refresh_secs == 0 {
            return Err(Error::config_validation("refresh_secs must be at least 1"));
        }

        for pattern in &self.scan.ignore {
            glob::Pattern::new(pattern)?;
        }

        Ok(())
    }
}
