// CSV export

use crate::analysis::AnalysisResult;

const HEADER: [&str; 6] = [
    "path",
    "verdict",
    "status",
    "missing_field_count",
    "missing_fields",
    "header_count",
];

/// One row per record, header row first
pub fn render_csv(result: &AnalysisResult) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER.iter().map(|h| h.to_string()));

    for record in &result.records {
        push_row(
            &mut out,
            [
                record.relative_path.clone(),
                record.verdict().to_string(),
                record.status.code().to_string(),
                record.missing_fields.len().to_string(),
                record.missing_fields.join("; "),
                record.headers.len().to_string(),
            ],
        );
    }
    out
}

fn push_row(out: &mut String, cells: impl IntoIterator<Item = String>) {
    let row: Vec<String> = cells.into_iter().map(|c| escape(&c)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// Quote a cell when it contains a separator, quote or line break
fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
