//! CLI argument parsing

use crate::config::ExportTarget;
use clap::Parser;
use std::path::PathBuf;

/// Analyze markdown architecture documents and validate their front matter
#[derive(Parser, Debug)]
#[command(name = "archmark")]
#[command(about = "Analyze markdown architecture documents and validate their front matter")]
#[command(version)]
pub struct Args {
    /// Folder containing the markdown files
    pub folder: PathBuf,

    /// Verbose output (debug logging and a progress bar)
    #[arg(short, long)]
    pub verbose: bool,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Print the folder structure tree
    #[arg(short = 's', long)]
    pub show_structure: bool,

    /// Export the report to files
    #[arg(short, long, value_enum)]
    pub export: Option<ExportTarget>,

    /// Directory for exported files [default: ./exports]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Write a live HTML report that refreshes while files change
    #[arg(long)]
    pub export_html: bool,

    /// Config file path [default: archmark.toml]
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["archmark", "./docs"]).unwrap();
        assert_eq!(args.folder, PathBuf::from("./docs"));
        assert!(!args.verbose);
        assert!(!args.recursive);
        assert!(!args.show_structure);
        assert!(args.export.is_none());
        assert!(args.output_dir.is_none());
        assert!(!args.export_html);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_all_options() {
        let args = Args::try_parse_from([
            "archmark", "./plan",
            "-v", "-r", "-s",
            "--export", "all",
            "--output-dir", "/tmp/out",
            "--export-html",
            "--config", "custom.toml",
        ])
        .unwrap();

        assert_eq!(args.folder, PathBuf::from("./plan"));
        assert!(args.verbose);
        assert!(args.recursive);
        assert!(args.show_structure);
        assert_eq!(args.export, Some(ExportTarget::All));
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
        assert!(args.export_html);
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_short_export_flag() {
        let args = Args::try_parse_from(["archmark", "docs", "-e", "csv", "-o", "out"]).unwrap();
        assert_eq!(args.export, Some(ExportTarget::Csv));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_unknown_export_format_rejected() {
        assert!(Args::try_parse_from(["archmark", "docs", "--export", "xml"]).is_err());
    }

    #[test]
    fn test_folder_required() {
        assert!(Args::try_parse_from(["archmark"]).is_err());
    }
}
