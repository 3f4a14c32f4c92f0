use std::sync::Arc;
use axum::{Router, middleware, routing::{get, post}};
use crate::{
    ai_controller::AiController,
    app_state::AppState,
    authentication::auth::auth_middleware,
    web_api::rate_limit::ai_rate_limit,
};

pub const ROUTER_PATH: &str = "/ai";

pub fn get_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(format!("{}/recommendations", ROUTER_PATH).as_str(), get(AiController::recommendations))
        .route(format!("{}/analyze-task", ROUTER_PATH).as_str(), post(AiController::analyze_task))
        .route(format!("{}/insights", ROUTER_PATH).as_str(), get(AiController::insights))
        .layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware))
        .layer(middleware::from_fn_with_state(app_state.clone(), ai_rate_limit))
        .with_state(app_state)
}
