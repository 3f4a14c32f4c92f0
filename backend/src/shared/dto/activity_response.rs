use serde::Serialize;

use crate::ado::client::ActivityItem;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub activity: Vec<ActivityItem>,
    pub total_count: usize,
    pub project_id: String,
}
