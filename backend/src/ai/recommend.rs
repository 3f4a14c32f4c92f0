//! Recommendation strategies. Each is a pure function over the task set.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::scorer::{days_overdue, days_until};
use crate::{task::Task, task_complexity::TaskComplexity, task_priority::TaskPriority};

/// Hours assumed for quick-win ordering when a task has no estimate.
const UNKNOWN_ESTIMATE_HOURS: f64 = 4.0;
const QUICK_WIN_MAX_HOURS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    #[default]
    Priority,
    QuickWins,
    Overdue,
}

impl RecommendationKind {
    /// Unknown or missing names fall back to `Priority`.
    pub fn parse(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some("quick_wins") => RecommendationKind::QuickWins,
            Some("overdue") => RecommendationKind::Overdue,
            _ => RecommendationKind::Priority,
        }
    }

    fn record_type(self) -> &'static str {
        match self {
            RecommendationKind::Priority => "priority",
            RecommendationKind::QuickWins => "quick_win",
            RecommendationKind::Overdue => "overdue",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub task_id: Uuid,
    pub task: Task,
    pub confidence_score: f64,
    pub reasoning: String,
    pub action: &'static str,
    pub metadata: RecommendationMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMetadata {
    pub factors: Vec<&'static str>,
    pub estimated_impact: &'static str,
}

pub fn recommend(tasks: &[Task], kind: RecommendationKind, limit: usize, now: DateTime<Utc>) -> Vec<Recommendation> {
    match kind {
        RecommendationKind::Priority => by_priority(tasks, limit, now),
        RecommendationKind::QuickWins => quick_wins(tasks, limit),
        RecommendationKind::Overdue => overdue(tasks, limit, now),
    }
}

fn record(kind: RecommendationKind, task: &Task, confidence: f64, reasoning: String, action: &'static str, metadata: RecommendationMetadata) -> Recommendation {
    Recommendation {
        id: format!("rec_{}", task.id),
        kind: kind.record_type(),
        task_id: task.id,
        task: task.clone(),
        confidence_score: confidence,
        reasoning,
        action,
        metadata,
    }
}

fn by_priority(tasks: &[Task], limit: usize, now: DateTime<Utc>) -> Vec<Recommendation> {
    let mut ranked: Vec<&Task> = tasks.iter().collect();
    ranked.sort_by(|a, b| b.ai_priority_score.total_cmp(&a.ai_priority_score));
    ranked
        .into_iter()
        .take(limit)
        .map(|task| {
            let metadata = RecommendationMetadata {
                factors: factors(task, now),
                estimated_impact: estimated_impact(task),
            };
            record(
                RecommendationKind::Priority,
                task,
                task.ai_priority_score,
                reasoning(task, now),
                "Work on this task next",
                metadata,
            )
        })
        .collect()
}

fn quick_wins(tasks: &[Task], limit: usize) -> Vec<Recommendation> {
    let estimate = |t: &Task| t.estimated_hours.unwrap_or(UNKNOWN_ESTIMATE_HOURS);
    let mut candidates: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.complexity == TaskComplexity::Simple || t.estimated_hours.is_some_and(|h| h <= QUICK_WIN_MAX_HOURS))
        .collect();
    candidates.sort_by(|a, b| estimate(a).total_cmp(&estimate(b)));
    candidates
        .into_iter()
        .take(limit)
        .map(|task| {
            let hours = task.estimated_hours.map_or_else(|| "low".to_string(), |h| h.to_string());
            record(
                RecommendationKind::QuickWins,
                task,
                0.8,
                format!("Quick win opportunity - estimated {hours} hours"),
                "Complete this for a quick productivity boost",
                RecommendationMetadata {
                    factors: vec!["low_complexity", "short_duration"],
                    estimated_impact: "momentum_boost",
                },
            )
        })
        .collect()
}

fn overdue(tasks: &[Task], limit: usize, now: DateTime<Utc>) -> Vec<Recommendation> {
    let mut late: Vec<(&Task, DateTime<Utc>)> = tasks
        .iter()
        .filter_map(|t| t.due_date.filter(|due| *due < now).map(|due| (t, due)))
        .collect();
    late.sort_by_key(|(_, due)| *due);
    late.into_iter()
        .take(limit)
        .map(|(task, due)| {
            let days_late = days_overdue(due, now);
            record(
                RecommendationKind::Overdue,
                task,
                0.95,
                format!("This task is overdue by {} days", days_late.max(1)),
                "Address this overdue task immediately",
                RecommendationMetadata {
                    factors: vec!["overdue", "deadline_pressure"],
                    estimated_impact: "risk_mitigation",
                },
            )
        })
        .collect()
}

fn reasoning(task: &Task, now: DateTime<Utc>) -> String {
    let mut reasons = Vec::new();
    if task.priority.is_high() {
        reasons.push(format!("High priority ({})", task.priority.as_str()));
    }
    if let Some(days) = task.due_date.map(|due| days_until(due, now)) {
        if days <= 1 {
            reasons.push("Due very soon".to_string());
        } else if days <= 3 {
            reasons.push("Due within 3 days".to_string());
        }
    }
    if task.complexity == TaskComplexity::Simple {
        reasons.push("Low complexity - quick win opportunity".to_string());
    }
    if reasons.is_empty() {
        reasons.push("Good candidate based on current workload".to_string());
    }
    reasons.join(", ")
}

fn factors(task: &Task, now: DateTime<Utc>) -> Vec<&'static str> {
    let mut factors = Vec::new();
    if task.priority.is_high() {
        factors.push("high_priority");
    }
    if task.due_date.is_some_and(|due| days_until(due, now) <= 3) {
        factors.push("urgent_deadline");
    }
    if task.complexity == TaskComplexity::Simple {
        factors.push("low_complexity");
    }
    if task.estimated_hours.is_some_and(|h| h <= QUICK_WIN_MAX_HOURS) {
        factors.push("quick_task");
    }
    factors
}

fn estimated_impact(task: &Task) -> &'static str {
    match (task.priority, task.complexity) {
        (TaskPriority::Critical, _) => "high",
        (TaskPriority::High, _) => "medium",
        (_, TaskComplexity::Simple) => "quick_boost",
        _ => "standard",
    }
}
