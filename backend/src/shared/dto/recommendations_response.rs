use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ai::recommend::{Recommendation, RecommendationKind};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub generated_at: DateTime<Utc>,
}
