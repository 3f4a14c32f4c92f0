use axum::Json;
use serde::Serialize;

/// Success envelope: `{ "success": true, "data": ..., "totalCount"?: n }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, data, total_count: None })
    }

    pub fn with_total(data: T, total: usize) -> Json<Self> {
        Json(Self { success: true, data, total_count: Some(total) })
    }
}
