use serde::Serialize;

use crate::task_response::TaskResponse;

#[derive(Debug, Serialize)]
pub struct TaskActionResponse {
    pub task: TaskResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl TaskActionResponse {
    pub fn new(task: TaskResponse) -> Self {
        Self { task, message: None }
    }

    pub fn with_message(task: TaskResponse, message: &'static str) -> Self {
        Self { task, message: Some(message) }
    }
}
