//! archmark - Analyze markdown architecture documents
//!
//! Walks a folder of markdown files, parses each file's front matter and
//! level-2 headers, validates the front matter against a required field set
//! and reports the result on the console or as JSON, CSV and HTML exports.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;

// Re-export main types
pub use analysis::{AnalysisResult, Analyzer, RecordStatus, ValidationRecord};
pub use config::Config;
pub use error::{Error, Result};
