// JSON export
//
// Serializes borrowed views of the analysis result; nothing is cloned.

use crate::analysis::{
    AnalysisResult, AnalysisStats, FileNode, RequiredFieldSet, TreeWarning, ValidationRecord,
    WorkflowSummary,
};
use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// Top-level JSON document
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub metadata: JsonMetadata<'a>,
    pub summary: JsonSummary<'a>,
    pub tree: &'a FileNode,
    pub records: &'a [ValidationRecord],
    pub tree_warnings: &'a [TreeWarning],
    pub workflow: &'a WorkflowSummary,
}

#[derive(Debug, Serialize)]
pub struct JsonMetadata<'a> {
    pub generator: String,
    pub timestamp: String,
    pub folder_path: &'a Path,
    pub recursive: bool,
}

#[derive(Debug, Serialize)]
pub struct JsonSummary<'a> {
    #[serde(flatten)]
    pub stats: &'a AnalysisStats,
    pub success_rate: f64,
    pub required_fields: &'a RequiredFieldSet,
    pub files_with_errors: Vec<&'a str>,
    pub files_missing_fields: Vec<&'a str>,
}

impl<'a> JsonReport<'a> {
    pub fn new(result: &'a AnalysisResult) -> Self {
        let files_with_errors = result
            .records
            .iter()
            .filter(|r| r.error.is_some() || !r.warnings.is_empty())
            .map(|r| r.relative_path.as_str())
            .collect();
        let files_missing_fields = result
            .records
            .iter()
            .filter(|r| !r.missing_fields.is_empty())
            .map(|r| r.relative_path.as_str())
            .collect();

        Self {
            metadata: JsonMetadata {
                generator: format!("archmark {}", env!("CARGO_PKG_VERSION")),
                timestamp: result.timestamp.to_rfc3339(),
                folder_path: &result.root_path,
                recursive: result.recursive,
            },
            summary: JsonSummary {
                stats: &result.stats,
                success_rate: result.stats.success_rate(),
                required_fields: &result.required_fields,
                files_with_errors,
                files_missing_fields,
            },
            tree: &result.tree,
            records: &result.records,
            tree_warnings: &result.tree_warnings,
            workflow: &result.workflow,
        }
    }
}

/// Render the result as pretty-printed JSON
pub fn render_json(result: &AnalysisResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonReport::new(result))?)
}
