use serde::Serialize;

use crate::ai::analysis::{Insights, TaskAnalysis};

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: TaskAnalysis,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub insights: Insights,
}
