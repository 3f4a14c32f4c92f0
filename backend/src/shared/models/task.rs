use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    ai::scorer,
    create_task_request::CreateTaskRequest,
    task_complexity::TaskComplexity,
    task_priority::TaskPriority,
    task_status::TaskStatus,
    task_response::TaskResponse,
    update_task_request::UpdateTaskRequest,
    user::User,
};

/// Stored with postcard, so no field may be skipped during serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub complexity: TaskComplexity,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub ai_priority_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} a task that is {}", .from.as_str())]
pub struct InvalidTransition {
    pub from: TaskStatus,
    pub action: &'static str,
}

impl Task {
    pub fn new(user_id: Uuid, request: CreateTaskRequest, now: DateTime<Utc>) -> Self {
        let mut task = Self {
            id: Uuid::new_v4(),
            user_id,
            title: request.title.trim().to_string(),
            description: request.description,
            status: request.status,
            priority: request.priority,
            complexity: request.complexity,
            estimated_hours: request.estimated_hours,
            actual_hours: None,
            due_date: request.due_date,
            started_at: None,
            completed_at: None,
            ai_priority_score: 0.0,
            created_at: now,
            updated_at: now,
        };
        task.ai_priority_score = scorer::score(&task, now);
        task
    }

    /// Applies the present fields; the score is recomputed only when one of
    /// its inputs (priority, due date, complexity) was supplied.
    pub fn apply_update(&mut self, request: UpdateTaskRequest, now: DateTime<Utc>) {
        let rescore = request.priority.is_some() || request.due_date.is_some() || request.complexity.is_some();

        if let Some(title) = request.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = request.description {
            self.description = Some(description);
        }
        if let Some(status) = request.status {
            self.status = status;
        }
        if let Some(priority) = request.priority {
            self.priority = priority;
        }
        if let Some(complexity) = request.complexity {
            self.complexity = complexity;
        }
        if let Some(hours) = request.estimated_hours {
            self.estimated_hours = Some(hours);
        }
        if let Some(hours) = request.actual_hours {
            self.actual_hours = Some(hours);
        }
        if let Some(due) = request.due_date {
            self.due_date = Some(due);
        }

        if rescore {
            self.ai_priority_score = scorer::score(self, now);
        }
        self.updated_at = now;
    }

    /// todo | blocked → in_progress.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        match self.status {
            TaskStatus::Todo | TaskStatus::Blocked => {
                self.status = TaskStatus::InProgress;
                self.started_at = Some(now);
                self.updated_at = now;
                Ok(())
            }
            from => Err(InvalidTransition { from, action: "start" }),
        }
    }

    /// Anything not already done → done.
    pub fn complete(&mut self, actual_hours: Option<f64>, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        if self.status == TaskStatus::Done {
            return Err(InvalidTransition { from: self.status, action: "complete" });
        }
        self.status = TaskStatus::Done;
        self.completed_at = Some(now);
        if actual_hours.is_some() {
            self.actual_hours = actual_hours;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn to_response(&self, owner: &User) -> TaskResponse {
        TaskResponse {
            task: self.clone(),
            user: owner.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            description: None,
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            complexity: TaskComplexity::Medium,
            estimated_hours: None,
            due_date: None,
        }
    }

    #[test]
    fn new_task_is_scored() {
        let now = Utc::now();
        let task = Task::new(Uuid::new_v4(), request("  Write docs  "), now);
        assert_eq!(task.title, "Write docs");
        assert!((task.ai_priority_score - 0.65).abs() < 1e-9);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn update_rescoring_only_when_inputs_change() {
        let now = Utc::now();
        let mut task = Task::new(Uuid::new_v4(), request("t"), now);
        let original = task.ai_priority_score;

        task.apply_update(
            UpdateTaskRequest { title: Some("renamed".into()), ..Default::default() },
            now,
        );
        assert_eq!(task.ai_priority_score, original);

        task.apply_update(
            UpdateTaskRequest {
                priority: Some(TaskPriority::Critical),
                due_date: Some(now + Duration::days(1)),
                ..Default::default()
            },
            now,
        );
        assert_eq!(task.ai_priority_score, 1.0);
    }

    #[test]
    fn start_from_todo_or_blocked_only() {
        let now = Utc::now();
        let mut task = Task::new(Uuid::new_v4(), request("t"), now);
        task.start(now).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.started_at, Some(now));

        let err = task.start(now).unwrap_err();
        assert_eq!(err.from, TaskStatus::InProgress);
        assert_eq!(err.to_string(), "cannot start a task that is in_progress");

        task.status = TaskStatus::Blocked;
        assert!(task.start(now).is_ok());
    }

    #[test]
    fn complete_records_hours_once() {
        let now = Utc::now();
        let mut task = Task::new(Uuid::new_v4(), request("t"), now);
        task.complete(Some(3.5), now).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.actual_hours, Some(3.5));
        assert_eq!(task.completed_at, Some(now));
        assert!(task.complete(None, now).is_err());
    }

    #[test]
    fn postcard_round_trip() {
        let now = Utc::now();
        let mut task = Task::new(Uuid::new_v4(), request("persist me"), now);
        task.due_date = Some(now + Duration::hours(5));
        let bytes = postcard::to_allocvec(&task).unwrap();
        let back: Task = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(back, task);
    }
}
