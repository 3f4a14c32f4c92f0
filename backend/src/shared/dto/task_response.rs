use serde::Serialize;
use uuid::Uuid;

use crate::task::Task;

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// A task with its owner embedded, as every task endpoint returns it.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    #[serde(flatten)]
    pub task: Task,
    pub user: UserSummary,
}
