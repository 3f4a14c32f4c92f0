//! Keyword-based task analysis and productivity insights.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{task::Task, task_priority::TaskPriority, task_status::TaskStatus};

/// Insights look at this many of the newest tasks.
pub const INSIGHT_WINDOW: usize = 100;

const SIMPLE_KEYWORDS: &[&str] = &["fix", "update", "change", "add", "remove"];
const COMPLEX_KEYWORDS: &[&str] = &["implement", "design", "architect", "integrate", "refactor", "migration"];

const TAG_KEYWORDS: &[(&str, &[&str])] = &[
    ("bug", &["bug", "fix", "error", "issue"]),
    ("feature", &["feature", "implement", "add", "new"]),
    ("security", &["security", "auth", "authentication", "encryption"]),
    ("database", &["database", "db", "sql", "query"]),
    ("ui", &["ui", "interface", "frontend", "design"]),
    ("api", &["api", "endpoint", "service", "backend"]),
    ("testing", &["test", "testing", "qa", "verification"]),
    ("deployment", &["deploy", "deployment", "release", "production"]),
];

const BUGFIX_STEPS: &[&str] = &[
    "Reproduce the issue",
    "Identify root cause",
    "Implement fix",
    "Test thoroughly",
    "Deploy to staging",
    "Verify resolution",
];

const FEATURE_STEPS: &[&str] = &[
    "Define requirements clearly",
    "Design the solution",
    "Break into smaller tasks",
    "Implement incrementally",
    "Test each component",
    "Integrate and test end-to-end",
    "Deploy and monitor",
];

const DATABASE_STEPS: &[&str] = &[
    "Backup existing data",
    "Design schema changes",
    "Write migration scripts",
    "Test on staging environment",
    "Execute migration",
    "Verify data integrity",
];

const DEFAULT_STEPS: &[&str] = &[
    "Break task into smaller steps",
    "Research best practices",
    "Plan implementation approach",
    "Execute step by step",
    "Test and validate",
    "Document changes",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalysis {
    pub complexity_score: f64,
    pub estimated_hours: f64,
    pub suggested_priority: TaskPriority,
    pub tags: Vec<&'static str>,
    pub execution_guidance: &'static [&'static str],
}

/// Lower-cased words of the title and description.
struct Words(Vec<String>);

impl Words {
    fn new(title: &str, description: Option<&str>) -> Self {
        let text = format!("{title} {}", description.unwrap_or_default()).to_lowercase();
        Words(
            text.split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// A keyword matches any word it prefixes ("deploy" matches "deploying").
    fn any(&self, keywords: &[&str]) -> bool {
        self.0.iter().any(|w| keywords.iter().any(|k| w.starts_with(k)))
    }
}

pub fn analyze_task(title: &str, description: Option<&str>) -> TaskAnalysis {
    let words = Words::new(title, description);

    let (complexity_score, estimated_hours, suggested_priority) = if words.any(COMPLEX_KEYWORDS) {
        (0.8, 8.0, TaskPriority::High)
    } else if words.any(SIMPLE_KEYWORDS) {
        (0.3, 2.0, TaskPriority::Medium)
    } else {
        (0.5, 4.0, TaskPriority::Medium)
    };

    let mut tags: Vec<&'static str> = TAG_KEYWORDS
        .iter()
        .filter(|(_, keywords)| words.any(keywords))
        .map(|(tag, _)| *tag)
        .collect();
    if tags.is_empty() {
        tags.push("general");
    }

    let execution_guidance = if words.any(&["bug", "fix"]) {
        BUGFIX_STEPS
    } else if words.any(&["implement", "feature"]) {
        FEATURE_STEPS
    } else if words.any(&["database", "sql"]) {
        DATABASE_STEPS
    } else {
        DEFAULT_STEPS
    };

    TaskAnalysis {
        complexity_score,
        estimated_hours,
        suggested_priority,
        tags,
        execution_guidance,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub summary: InsightSummary,
    pub recommendations: Vec<InsightRecommendation>,
    pub patterns: InsightPatterns,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsightRecommendation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
    pub priority: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightPatterns {
    pub most_common_priority: Option<&'static str>,
    pub most_common_complexity: Option<&'static str>,
    /// Mean hours from start to completion over tasks that have both.
    pub average_completion_time: f64,
    pub productive_insights: Vec<&'static str>,
}

/// `tasks` should already be limited to the newest [`INSIGHT_WINDOW`].
pub fn insights(tasks: &[Task]) -> Insights {
    let completed = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
    let in_progress = tasks.iter().filter(|t| t.status == TaskStatus::InProgress).count();
    let completion_rate = if tasks.is_empty() { 0.0 } else { completed as f64 / tasks.len() as f64 };

    let recommendations = vec![
        InsightRecommendation {
            kind: "productivity",
            message: format!(
                "You have {in_progress} tasks in progress. Consider focusing on completing them before starting new ones."
            ),
            priority: if in_progress > 3 { "high" } else { "medium" },
        },
        InsightRecommendation {
            kind: "planning",
            message: "Try to estimate time for your tasks to improve planning accuracy.".to_string(),
            priority: "low",
        },
    ];

    let most_common_priority = most_common(tasks.iter().map(|t| t.priority)).map(|p| p.as_str());
    let most_common_complexity = most_common(tasks.iter().map(|t| t.complexity)).map(|c| c.as_str());
    let average_completion_time = average_completion_hours(tasks);

    let mut productive_insights = Vec::new();
    if most_common_priority == Some("low") {
        productive_insights.push("Consider prioritizing more high-impact tasks");
    }
    if average_completion_time > 5.0 {
        productive_insights.push("Break down large tasks into smaller, manageable pieces");
    }

    Insights {
        summary: InsightSummary {
            total_tasks: tasks.len(),
            completed_tasks: completed,
            in_progress_tasks: in_progress,
            completion_rate,
        },
        recommendations,
        patterns: InsightPatterns {
            most_common_priority,
            most_common_complexity,
            average_completion_time,
            productive_insights,
        },
    }
}

/// Ties go to the value that sorts first.
fn most_common<T: Ord + Copy>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(value, _)| value)
}

fn average_completion_hours(tasks: &[Task]) -> f64 {
    let durations: Vec<f64> = tasks
        .iter()
        .filter_map(|t| Some((t.completed_at? - t.started_at?).num_seconds() as f64 / 3600.0))
        .collect();
    if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<f64>() / durations.len() as f64
    }
}
