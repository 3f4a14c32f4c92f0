use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    api_response::ApiResponse,
    app_state::SharedState,
    health_response::{AdoHealth, HealthResponse},
};

pub struct HealthController {}

impl HealthController {
    pub async fn get(State(state): State<SharedState>) -> Json<ApiResponse<HealthResponse>> {
        let ado = &state.settings.ado;
        ApiResponse::ok(HealthResponse {
            status: "healthy",
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            ado: AdoHealth {
                configured: ado.pat().is_some() && ado.organization().is_some(),
                organization: ado.organization().map(str::to_string),
            },
        })
    }
}
