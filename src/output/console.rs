// Plain-text console report
//
// Everything renders to a String; the CLI decides where it goes.

use crate::analysis::{AnalysisResult, AnalysisStats, FileNode, NodeKind, ValidationRecord};
use std::collections::HashMap;
use std::fmt::Write;

/// A labelled node for box-drawing tree output
#[derive(Debug, Clone, Default)]
struct TextTree {
    label: String,
    children: Vec<TextTree>,
}

impl TextTree {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    fn leaf_list(label: impl Into<String>, items: &[String]) -> Self {
        let mut node = Self::new(label);
        node.children = items.iter().map(|i| Self::new(i.clone())).collect();
        node
    }

    fn render(&self) -> String {
        let mut out = format!("{}\n", self.label);
        for (i, child) in self.children.iter().enumerate() {
            child.render_into(&mut out, "", i + 1 == self.children.len());
        }
        out
    }

    fn render_into(&self, out: &mut String, prefix: &str, last: bool) {
        let branch = if last { "└── " } else { "├── " };
        let _ = writeln!(out, "{}{}{}", prefix, branch, self.label);

        let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
        for (i, child) in self.children.iter().enumerate() {
            child.render_into(out, &child_prefix, i + 1 == self.children.len());
        }
    }
}

/// Full console report for a run
pub fn render_report(result: &AnalysisResult, show_structure: bool) -> String {
    let mut out = String::new();

    if show_structure {
        out.push_str(&render_structure(result));
        out.push('\n');
    }

    if result.has_markdown() {
        out.push_str(&render_architecture(result));
        out.push('\n');
        out.push_str(&render_summary_table(result));
        let details = render_validation_details(result);
        if !details.is_empty() {
            out.push('\n');
            out.push_str(&details);
        }
    } else {
        out.push_str(&render_no_markdown(result));
    }

    if !result.tree_warnings.is_empty() {
        out.push_str("\nSkipped while walking:\n");
        for w in &result.tree_warnings {
            let _ = writeln!(out, "  - {} ({:?}): {}", w.path.display(), w.kind, w.message);
        }
    }

    out.push('\n');
    out.push_str(&render_final_summary(&result.stats));
    out
}

/// Directory layout, with markdown counts on directories
pub fn render_structure(result: &AnalysisResult) -> String {
    let hints: HashMap<&str, usize> = result
        .subfolder_hints
        .iter()
        .map(|h| (h.name.as_str(), h.markdown_files))
        .collect();

    let mut root = TextTree::new(format!("{}/ (folder structure)", result.tree.name));
    root.children = result
        .tree
        .children
        .iter()
        .map(|c| structure_node(c, &hints))
        .collect();
    root.render()
}

fn structure_node(node: &FileNode, hints: &HashMap<&str, usize>) -> TextTree {
    match node.kind {
        NodeKind::Directory => {
            let count = if node.depth == 1 && node.children.is_empty() {
                hints.get(node.name.as_str()).copied().unwrap_or(0)
            } else {
                node.markdown_count()
            };
            let label = if count > 0 {
                format!("{}/ ({} markdown files)", node.name, count)
            } else {
                format!("{}/", node.name)
            };
            let mut tree = TextTree::new(label);
            tree.children = node.children.iter().map(|c| structure_node(c, hints)).collect();
            tree
        }
        _ => TextTree::new(node.name.clone()),
    }
}

/// Markdown files in their directories, with front matter and headers
pub fn render_architecture(result: &AnalysisResult) -> String {
    let records: HashMap<&str, &ValidationRecord> = result
        .records
        .iter()
        .map(|r| (r.relative_path.as_str(), r))
        .collect();

    let mut root = TextTree::new(format!("{}/", result.tree.name));
    root.children = architecture_children(&result.tree, &records, result);
    root.render()
}

fn architecture_children(
    dir: &FileNode,
    records: &HashMap<&str, &ValidationRecord>,
    result: &AnalysisResult,
) -> Vec<TextTree> {
    let mut children = Vec::new();
    for child in &dir.children {
        match child.kind {
            NodeKind::Directory if !child.markdown_files().is_empty() => {
                let mut tree = TextTree::new(format!("{}/", child.name));
                tree.children = architecture_children(child, records, result);
                children.push(tree);
            }
            NodeKind::Markdown => {
                if let Some(record) = records.get(child.relative_path.as_str()) {
                    children.push(file_tree(record, result));
                }
            }
            _ => {}
        }
    }
    children
}

fn file_tree(record: &ValidationRecord, result: &AnalysisResult) -> TextTree {
    let marker = if record.passed { "PASS" } else { "FAIL" };
    let mut node = TextTree::new(format!("[{}] {}", marker, record.name));

    let mut fm_node = TextTree::new("Front matter");
    match &record.front_matter {
        Some(fm) => {
            for field in fm.fields() {
                let extra = if result.required_fields.contains(&field.key) {
                    ""
                } else {
                    " (extra)"
                };
                fm_node
                    .children
                    .push(TextTree::new(format!("{}: {}{}", field.key, field.value, extra)));
            }
        }
        None => fm_node.children.push(TextTree::new(record.status.label())),
    }
    if !record.missing_fields.is_empty() {
        fm_node
            .children
            .push(TextTree::leaf_list("Missing required fields", &record.missing_fields));
    }
    if !record.warnings.is_empty() {
        fm_node.children.push(TextTree::leaf_list("Warnings", &record.warnings));
    }
    if let Some(err) = &record.error {
        fm_node.children.push(TextTree::new(format!("Error: {}", err)));
    }
    node.children.push(fm_node);

    if record.headers.is_empty() {
        node.children.push(TextTree::new("No ## headers found"));
    } else {
        node.children
            .push(TextTree::leaf_list("Headers (##)", &record.headers));
    }
    node
}

/// One row per file
pub fn render_summary_table(result: &AnalysisResult) -> String {
    let headings = ["File", "Status", "Headers", "Missing", "Warnings"];
    let rows: Vec<[String; 5]> = result
        .records
        .iter()
        .map(|r| {
            [
                r.relative_path.clone(),
                r.status.label().to_string(),
                r.headers.len().to_string(),
                r.missing_fields.len().to_string(),
                r.warnings.len().to_string(),
            ]
        })
        .collect();

    let mut widths = headings.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::from("Analysis Summary\n");
    let heading_cells: Vec<String> = headings.iter().map(|h| h.to_string()).collect();
    let _ = writeln!(out, "{}", line(&heading_cells));
    let _ = writeln!(
        out,
        "{}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in &rows {
        let _ = writeln!(out, "{}", line(&row[..]));
    }
    out
}

/// Problems for every failing file; empty when everything passed
pub fn render_validation_details(result: &AnalysisResult) -> String {
    let mut out = String::new();
    for record in result.failing_records() {
        if out.is_empty() {
            out.push_str("Front Matter Validation Details\n");
        }
        let _ = writeln!(out, "\n[FAIL] {} ({})", record.relative_path, record.status.label());
        if let Some(err) = &record.error {
            let _ = writeln!(out, "  Error: {}", err);
        }
        if !record.warnings.is_empty() {
            out.push_str("  Warnings:\n");
            for w in &record.warnings {
                let _ = writeln!(out, "    - {}", w);
            }
        }
        if !record.missing_fields.is_empty() {
            out.push_str("  Missing required fields:\n");
            for f in &record.missing_fields {
                let _ = writeln!(out, "    - {}", f);
            }
        }
    }
    out
}

/// Notice plus hints when the folder held no markdown
pub fn render_no_markdown(result: &AnalysisResult) -> String {
    let mut out = String::from("No markdown files found in the specified folder.\n");
    if result.subfolder_hints.is_empty() {
        return out;
    }

    out.push_str("\nFound subfolders with markdown files:\n");
    for hint in &result.subfolder_hints {
        let _ = writeln!(out, "  - {}: {} files", hint.name, hint.markdown_files);
    }
    out.push_str("\nTip: use --recursive (-r) to analyze all subfolders:\n");
    let _ = writeln!(out, "  archmark \"{}\" --recursive", result.root_path.display());
    out.push_str("Or analyze a subfolder directly:\n");
    for hint in &result.subfolder_hints {
        let _ = writeln!(out, "  archmark \"{}\"", hint.path.display());
    }
    out
}

pub fn render_final_summary(stats: &AnalysisStats) -> String {
    let mut out = String::from("Final Summary:\n");
    let _ = writeln!(out, "  Valid files: {}/{}", stats.passing, stats.total);
    let _ = writeln!(out, "  Failed: {}", stats.failing);
    let _ = writeln!(out, "  Missing front matter: {}", stats.missing_front_matter);
    let _ = writeln!(out, "  Malformed: {}", stats.malformed);
    let _ = writeln!(out, "  Unreadable: {}", stats.unreadable);
    let _ = writeln!(out, "  Warnings: {}", stats.warnings);
    let _ = writeln!(out, "  Total headers: {}", stats.total_headers);
    let _ = writeln!(out, "  Success rate: {:.1}%", stats.success_rate());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::config::Config;
    use std::fs;
    use tempfile::TempDir;

    fn analyze(dir: &TempDir, recursive: bool) -> AnalysisResult {
        let mut config = Config::default();
        config.scan.recursive = recursive;
        Analyzer::new(config).unwrap().analyze(dir.path()).unwrap()
    }

    #[test]
    fn test_text_tree_render() {
        let mut root = TextTree::new("root");
        let mut a = TextTree::new("a");
        a.children.push(TextTree::new("a1"));
        root.children.push(a);
        root.children.push(TextTree::new("b"));

        assert_eq!(root.render(), "root\n├── a\n│   └── a1\n└── b\n");
    }

    #[test]
    fn test_architecture_lists_files_and_headers() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("doc.md"), "---\ntitle: Hi\nowner: me\n---\n## One\n").unwrap();

        let result = analyze(&dir, false);
        let text = render_architecture(&result);
        assert!(text.contains("[FAIL] doc.md"));
        assert!(text.contains("title: Hi"));
        assert!(text.contains("owner: me (extra)"));
        assert!(text.contains("Missing required fields"));
        assert!(text.contains("Headers (##)"));
        assert!(text.contains("One"));
    }

    #[test]
    fn test_architecture_skips_directories_without_markdown() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("top.md"), "# t").unwrap();
        fs::create_dir(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/logo.png"), "x").unwrap();
        fs::create_dir(dir.path().join("guides")).unwrap();
        fs::write(dir.path().join("guides/intro.md"), "# i").unwrap();

        let text = render_architecture(&analyze(&dir, true));
        assert!(text.contains("guides/"));
        assert!(!text.contains("assets/"));
    }

    #[test]
    fn test_summary_table_rows() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "# a").unwrap();
        fs::write(dir.path().join("b.md"), "---\nbroken\n").unwrap();

        let table = render_summary_table(&analyze(&dir, false));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("File"));
        assert!(lines[3].contains("no front matter"));
        assert!(lines[4].contains("malformed"));
    }

    #[test]
    fn test_validation_details_only_for_failures() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("plain.md"), "text").unwrap();

        let details = render_validation_details(&analyze(&dir, false));
        assert!(details.contains("[FAIL] plain.md (no front matter)"));
        assert!(details.contains("- orchestrator"));
    }

    #[test]
    fn test_no_markdown_hints() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("phase1")).unwrap();
        fs::write(dir.path().join("phase1/t.md"), "# t").unwrap();

        let result = analyze(&dir, false);
        let report = render_report(&result, true);
        assert!(report.contains("No markdown files found"));
        assert!(report.contains("phase1: 1 files"));
        assert!(report.contains("--recursive"));
        assert!(report.contains("phase1/ (1 markdown files)"));
        assert!(report.contains("Valid files: 0/0"));
    }

    #[test]
    fn test_final_summary() {
        let stats = AnalysisStats {
            total: 3,
            passing: 2,
            failing: 1,
            ..AnalysisStats::default()
        };
        let text = render_final_summary(&stats);
        assert!(text.contains("Valid files: 2/3"));
        assert!(text.contains("Success rate: 66.7%"));
    }
}
