use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AnalyzeTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}
