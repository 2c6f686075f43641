// Template engine for generating HTML output

use crate::analysis::{AnalysisResult, ValidationRecord};
use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Per-file view with front-matter values already rendered to text
#[derive(Debug, Serialize)]
pub struct FileView<'a> {
    pub record: &'a ValidationRecord,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
pub struct FieldView {
    pub key: String,
    pub value: String,
    pub required: bool,
}

impl<'a> FileView<'a> {
    fn new(record: &'a ValidationRecord, analysis: &AnalysisResult) -> Self {
        let fields = record
            .front_matter
            .iter()
            .flat_map(|fm| fm.fields())
            .map(|f| FieldView {
                key: f.key.clone(),
                value: f.value.to_string(),
                required: analysis.required_fields.contains(&f.key),
            })
            .collect();
        Self { record, fields }
    }
}

/// Template engine wrapping Tera with custom filters and templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("base.html", include_str!("../../templates/base.html.tera")),
            ("report.html", include_str!("../../templates/report.html.tera")),
        ])?;

        register_filters(&mut tera);
        Ok(Self { tera })
    }

    /// Render the report page; `refresh_secs` turns on the auto-refresh tag
    pub fn render_report(
        &self,
        analysis: &AnalysisResult,
        refresh_secs: Option<u64>,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("folder_path", &analysis.root_path.display().to_string());
        context.insert("folder_name", &analysis.tree.name);
        context.insert("recursive", &analysis.recursive);
        context.insert(
            "timestamp",
            &analysis.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        context.insert("stats", &analysis.stats);
        context.insert("success_rate", &analysis.stats.success_rate());
        let files: Vec<FileView> = analysis
            .records
            .iter()
            .map(|r| FileView::new(r, analysis))
            .collect();
        context.insert("files", &files);
        context.insert("required_fields", &analysis.required_fields);
        context.insert("workflow", &analysis.workflow);
        context.insert("tree_warnings", &analysis.tree_warnings);
        context.insert("refresh_secs", &refresh_secs);

        Ok(self.tera.render("report.html", &context)?)
    }
}

fn register_filters(tera: &mut Tera) {
    tera.register_filter("pluralize", pluralize);
    tera.register_filter("percent", percent);
    tera.register_filter("slugify", slugify_filter);
}

/// Pluralize a word based on count
fn pluralize(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let count = value.as_u64().unwrap_or(0);
    let singular = args
        .get("singular")
        .and_then(|v| v.as_str())
        .unwrap_or("item");
    let default_plural = format!("{}s", singular);
    let plural = args
        .get("plural")
        .and_then(|v| v.as_str())
        .unwrap_or(&default_plural);

    if count == 1 {
        Ok(Value::String(format!("{} {}", count, singular)))
    } else {
        Ok(Value::String(format!("{} {}", count, plural)))
    }
}

/// Format a number as a one-decimal percentage
fn percent(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let rate = value.as_f64().unwrap_or(0.0);
    Ok(Value::String(format!("{:.1}%", rate)))
}

/// Convert text to an anchor-friendly slug
fn slugify_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value.as_str().unwrap_or("");
    Ok(Value::String(slugify(s)))
}

/// Convert text to URL-friendly slug
pub fn slugify(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("phase1/Task One.md"), "phase1-task-one-md");
        assert_eq!(slugify("  spaced  out  "), "spaced-out");
    }

    #[test]
    fn test_pluralize_singular() {
        let value = Value::Number(1.into());
        let mut args = HashMap::new();
        args.insert("singular".to_string(), Value::String("file".to_string()));

        let result = pluralize(&value, &args).unwrap();
        assert_eq!(result.as_str().unwrap(), "1 file");
    }

    #[test]
    fn test_pluralize_plural() {
        let value = Value::Number(5.into());
        let mut args = HashMap::new();
        args.insert("singular".to_string(), Value::String("header".to_string()));

        let result = pluralize(&value, &args).unwrap();
        assert_eq!(result.as_str().unwrap(), "5 headers");
    }

    #[test]
    fn test_percent() {
        let value = serde_json::json!(66.6666);
        let result = percent(&value, &HashMap::new()).unwrap();
        assert_eq!(result.as_str().unwrap(), "66.7%");
    }

    #[test]
    fn test_engine_loads_embedded_templates() {
        assert!(TemplateEngine::new().is_ok());
    }
}
