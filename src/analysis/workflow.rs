// Workflow dependency summary
//
// Groups documents into phases and steps from their front matter and checks
// that `previous_task` / `next_task` references point at known tasks.

use crate::analysis::record::ValidationRecord;
use crate::config::WorkflowConfig;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

const UNKNOWN: &str = "Unknown";

/// One document viewed as a workflow task
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowTask {
    pub file: String,
    pub task_id: String,
    pub title: String,
    pub phase: String,
    pub step: String,
    pub agent: String,
    pub previous_task: Option<String>,
    pub next_task: Option<String>,
    pub valid: bool,
}

impl WorkflowTask {
    fn from_record(record: &ValidationRecord) -> Self {
        let or_unknown = |key: &str| record.field(key).unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            file: record.name.clone(),
            task_id: or_unknown("task_id"),
            title: or_unknown("title"),
            phase: or_unknown("phase"),
            step: or_unknown("step"),
            agent: or_unknown("agent"),
            previous_task: record.field("previous_task"),
            next_task: record.field("next_task"),
            valid: record.passed,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.previous_task.is_some() || self.next_task.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStep {
    pub step: String,
    pub tasks: Vec<WorkflowTask>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowPhase {
    pub phase: String,
    pub steps: Vec<WorkflowStep>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowStats {
    pub total_tasks: usize,
    pub connected_tasks: usize,
    pub orphaned_tasks: usize,
    pub phases_count: usize,
    pub valid_tasks: usize,
    pub completion_rate: f64,
}

/// Phase/step layout of all tasks plus dangling references
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowSummary {
    pub phases: Vec<WorkflowPhase>,
    pub orphaned: Vec<WorkflowTask>,
    pub stats: WorkflowStats,
}

impl WorkflowSummary {
    /// Build the summary from records that carry front matter.
    ///
    /// A reference resolves when it names a known `task_id` or starts with
    /// one of the configured prefixes for its direction.
    pub fn build(records: &[ValidationRecord], config: &WorkflowConfig) -> Self {
        let tasks: Vec<WorkflowTask> = records
            .iter()
            .filter(|r| r.front_matter.is_some())
            .map(WorkflowTask::from_record)
            .collect();

        let known: HashSet<&str> = tasks.iter().map(|t| t.task_id.as_str()).collect();
        let resolves = |reference: &Option<String>, prefixes: &[String]| match reference {
            None => true,
            Some(id) => {
                known.contains(id.as_str()) || prefixes.iter().any(|p| id.starts_with(p.as_str()))
            }
        };

        let orphaned: Vec<WorkflowTask> = tasks
            .iter()
            .filter(|t| {
                !(resolves(&t.previous_task, &config.previous_prefixes)
                    && resolves(&t.next_task, &config.next_prefixes))
            })
            .cloned()
            .collect();

        let total_tasks = tasks.len();
        let valid_tasks = tasks.iter().filter(|t| t.valid).count();
        let connected_tasks = tasks.iter().filter(|t| t.is_connected()).count();
        let phases = group_phases(tasks);

        let stats = WorkflowStats {
            total_tasks,
            connected_tasks,
            orphaned_tasks: orphaned.len(),
            phases_count: phases.len(),
            valid_tasks,
            completion_rate: if total_tasks == 0 {
                0.0
            } else {
                valid_tasks as f64 / total_tasks as f64 * 100.0
            },
        };

        Self {
            phases,
            orphaned,
            stats,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stats.total_tasks == 0
    }
}

/// Phases keep first-seen order; steps within a phase are sorted
fn group_phases(tasks: Vec<WorkflowTask>) -> Vec<WorkflowPhase> {
    let mut phases: Vec<WorkflowPhase> = Vec::new();

    for task in tasks {
        let idx = match phases.iter().position(|p| p.phase == task.phase) {
            Some(idx) => idx,
            None => {
                phases.push(WorkflowPhase {
                    phase: task.phase.clone(),
                    steps: Vec::new(),
                });
                phases.len() - 1
            }
        };

        let steps = &mut phases[idx].steps;
        match steps.iter_mut().find(|s| s.step == task.step) {
            Some(step) => step.tasks.push(task),
            None => steps.push(WorkflowStep {
                step: task.step.clone(),
                tasks: vec![task],
            }),
        }
    }

    for phase in &mut phases {
        phase.steps.sort_by(|a, b| step_order(&a.step, &b.step));
    }
    phases
}

/// Numeric steps sort numerically and before everything else
fn step_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
