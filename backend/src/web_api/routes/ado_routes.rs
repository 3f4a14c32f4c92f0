use std::sync::Arc;
use axum::{Router, routing::{get, post}};
use crate::{ado_controller::AdoController, app_state::AppState};

pub const ROUTER_PATH: &str = "/ado";

/// Public: these routes use the server's configured PAT, not a user login.
pub fn get_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(format!("{}/initialize", ROUTER_PATH).as_str(), post(AdoController::initialize))
        .route(format!("{}/projects", ROUTER_PATH).as_str(), get(AdoController::projects))
        .route(format!("{}/backlog/:project_id", ROUTER_PATH).as_str(), get(AdoController::backlog))
        .route(format!("{}/workitem/:work_item_id", ROUTER_PATH).as_str(), get(AdoController::work_item))
        .route(format!("{}/test-connection", ROUTER_PATH).as_str(), get(AdoController::test_connection))
        .route(format!("{}/activity/:project_id", ROUTER_PATH).as_str(), get(AdoController::activity))
        .with_state(app_state)
}
