use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    app_error::FieldError,
    task_complexity::TaskComplexity,
    task_priority::TaskPriority,
    task_status::TaskStatus,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub complexity: Option<TaskComplexity>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            errors.push(FieldError::new("title", "Title cannot be empty"));
        }
        for (field, value) in [("estimatedHours", self.estimated_hours), ("actualHours", self.actual_hours)] {
            if value.is_some_and(|h| h < 0.0 || !h.is_finite()) {
                errors.push(FieldError::new(field, format!("{field} must be a non-negative number")));
            }
        }
        errors
    }
}
