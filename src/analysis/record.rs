// Per-file validation outcome

use crate::parser::FrontMatter;
use serde::Serialize;
use std::path::PathBuf;

/// What happened to one markdown file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Front matter present with every required field
    Pass,
    /// Front matter present, some required fields absent or empty
    MissingFields,
    /// No opening marker on the first non-empty line
    NoFrontMatter,
    /// Opening marker without a closing one
    Malformed,
    /// The file could not be read
    Unreadable,
}

impl RecordStatus {
    pub fn passed(self) -> bool {
        self == RecordStatus::Pass
    }

    /// Machine-readable name, matching the serialized form
    pub fn code(self) -> &'static str {
        match self {
            RecordStatus::Pass => "pass",
            RecordStatus::MissingFields => "missing_fields",
            RecordStatus::NoFrontMatter => "no_front_matter",
            RecordStatus::Malformed => "malformed",
            RecordStatus::Unreadable => "unreadable",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordStatus::Pass => "pass",
            RecordStatus::MissingFields => "missing fields",
            RecordStatus::NoFrontMatter => "no front matter",
            RecordStatus::Malformed => "malformed",
            RecordStatus::Unreadable => "unreadable",
        }
    }
}

/// Validation result for a single markdown file
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRecord {
    pub name: String,
    pub path: PathBuf,
    pub relative_path: String,
    pub status: RecordStatus,
    pub passed: bool,
    pub front_matter: Option<FrontMatter>,
    pub missing_fields: Vec<String>,
    pub headers: Vec<String>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

impl ValidationRecord {
    pub fn verdict(&self) -> &'static str {
        if self.passed {
            "pass"
        } else {
            "fail"
        }
    }

    /// Front-matter value as text, if present and non-empty
    pub fn field(&self, key: &str) -> Option<String> {
        self.front_matter.as_ref().and_then(|fm| fm.text(key))
    }
}
