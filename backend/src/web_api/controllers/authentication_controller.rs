use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api_response::ApiResponse,
    app_error::AppError,
    app_state::SharedState,
    authentication::auth,
    web_api::extract::ApiJson,
    login_request::LoginRequest,
    login_response::LoginResponse,
    register_request::RegisterRequest,
};

pub struct AuthenticationController {}

impl AuthenticationController {
    pub async fn register(
        State(state): State<SharedState>,
        ApiJson(payload): ApiJson<RegisterRequest>,
    ) -> Result<(StatusCode, Json<ApiResponse<LoginResponse>>), AppError> {
        let response = auth::register(&state, payload)?;
        Ok((StatusCode::CREATED, ApiResponse::ok(response)))
    }

    pub async fn login(
        State(state): State<SharedState>,
        ApiJson(payload): ApiJson<LoginRequest>,
    ) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
        auth::login(&state, payload).map(ApiResponse::ok)
    }
}
