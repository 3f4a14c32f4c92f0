use serde::Deserialize;

pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 5;
pub const MAX_RECOMMENDATION_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

impl RecommendationsQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_RECOMMENDATION_LIMIT)
            .clamp(1, MAX_RECOMMENDATION_LIMIT)
    }
}
