use serde::Serialize;

use crate::ado::transform::WorkItem;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemResponse {
    pub work_item: WorkItem,
}
