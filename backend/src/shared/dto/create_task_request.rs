use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    app_error::FieldError,
    task_complexity::TaskComplexity,
    task_priority::TaskPriority,
    task_status::TaskStatus,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub complexity: TaskComplexity,
    pub estimated_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }
        if self.estimated_hours.is_some_and(|h| h < 0.0 || !h.is_finite()) {
            errors.push(FieldError::new("estimatedHours", "estimatedHours must be a non-negative number"));
        }
        errors
    }
}
