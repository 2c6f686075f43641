// Front-matter schema validation

use crate::config::{SchemaConfig, DEFAULT_REQUIRED_FIELDS};
use crate::parser::FrontMatter;
use serde::Serialize;

/// Ordered, immutable set of field names a document must supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequiredFieldSet {
    fields: Vec<String>,
}

impl RequiredFieldSet {
    /// Build a set, dropping repeated names while keeping first-seen order
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !unique.contains(&field) {
                unique.push(field);
            }
        }
        Self { fields: unique }
    }

    pub fn from_config(config: &SchemaConfig) -> Self {
        Self::new(config.required_fields.iter().cloned())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

impl Default for RequiredFieldSet {
    fn default() -> Self {
        Self::new(DEFAULT_REQUIRED_FIELDS)
    }
}

/// Outcome of checking one document's front matter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCheck {
    pub front_matter_present: bool,
    /// Required fields absent or empty, in schema order
    pub missing: Vec<String>,
}

impl SchemaCheck {
    pub fn passed(&self) -> bool {
        self.front_matter_present && self.missing.is_empty()
    }
}

/// Checks front matter against a required field set. Performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator {
    required: RequiredFieldSet,
}

impl SchemaValidator {
    pub fn new(required: RequiredFieldSet) -> Self {
        Self { required }
    }

    pub fn required(&self) -> &RequiredFieldSet {
        &self.required
    }

    /// Absent front matter means every field is missing
    pub fn validate(&self, front_matter: Option<&FrontMatter>) -> SchemaCheck {
        let Some(fm) = front_matter else {
            return SchemaCheck {
                front_matter_present: false,
                missing: self.required.as_slice().to_vec(),
            };
        };

        let missing = self
            .required
            .iter()
            .filter(|field| fm.get(field).map_or(true, |v| v.is_empty()))
            .map(str::to_string)
            .collect();

        SchemaCheck {
            front_matter_present: true,
            missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_front_matter, FrontMatterState};

    fn front_matter(body: &str) -> FrontMatter {
        let content = format!("---\n{}---\n", body);
        match parse_front_matter(&content).unwrap() {
            FrontMatterState::Present(fm) => fm,
            FrontMatterState::Absent => panic!("Expected front matter"),
        }
    }

    const COMPLETE: &str = "phase: 1\nstep: 1\ntask: 1\ntask_id: P1-S1-T1\ntitle: Setup\n\
previous_task: PHASE-START\nnext_task: P1-S1-T2\nversion: 1.0\nagent: builder\norchestrator: main\n";

    #[test]
    fn test_default_field_set() {
        let set = RequiredFieldSet::default();
        assert_eq!(set.len(), 10);
        assert_eq!(set.iter().next(), Some("phase"));
        assert!(set.contains("orchestrator"));
    }

    #[test]
    fn test_field_set_dedups() {
        let set = RequiredFieldSet::new(["a", "b", "a"]);
        assert_eq!(set.as_slice(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_complete_front_matter_passes() {
        let check = SchemaValidator::default().validate(Some(&front_matter(COMPLETE)));
        assert!(check.passed());
        assert!(check.missing.is_empty());
    }

    #[test]
    fn test_missing_fields_in_schema_order() {
        let body = COMPLETE
            .lines()
            .filter(|l| !l.starts_with("task_id") && !l.starts_with("agent"))
            .map(|l| format!("{}\n", l))
            .collect::<String>();
        let check = SchemaValidator::default().validate(Some(&front_matter(&body)));
        assert!(!check.passed());
        assert_eq!(check.missing, vec!["task_id", "agent"]);
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let body = COMPLETE.replace("title: Setup", "title: \"\"").replace("agent: builder", "agent: ~");
        let check = SchemaValidator::default().validate(Some(&front_matter(&body)));
        assert_eq!(check.missing, vec!["title", "agent"]);
    }

    #[test]
    fn test_absent_front_matter_misses_everything() {
        let check = SchemaValidator::default().validate(None);
        assert!(!check.front_matter_present);
        assert!(!check.passed());
        assert_eq!(check.missing.len(), 10);
    }

    #[test]
    fn test_empty_block_is_present_but_fails() {
        let fm = front_matter("");
        let check = SchemaValidator::default().validate(Some(&fm));
        assert!(check.front_matter_present);
        assert_eq!(check.missing.len(), 10);
    }

    #[test]
    fn test_custom_schema() {
        let validator = SchemaValidator::new(RequiredFieldSet::new(["title"]));
        let check = validator.validate(Some(&front_matter("title: Only\n")));
        assert!(check.passed());
    }

    #[test]
    fn test_extra_fields_are_allowed() {
        let body = format!("{}owner: docs\n", COMPLETE);
        assert!(SchemaValidator::default().validate(Some(&front_matter(&body))).passed());
    }
}
