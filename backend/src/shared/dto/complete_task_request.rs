use serde::Deserialize;

/// Body of `POST /tasks/:id/complete`; the body itself is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    pub actual_hours: Option<f64>,
}
