use serde::Serialize;

use crate::ado::{transform::WorkItem, wiql::WiqlOptions};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogResponse {
    pub backlog_items: Vec<WorkItem>,
    pub total_count: usize,
    pub project_id: String,
    pub filters: WiqlOptions,
    pub top: usize,
}
