use axum::{extract::State, Json};

use crate::{
    activity_response::ActivityResponse,
    ado::{
        client::{ConnectionTest, Project},
        session::AdoSession,
    },
    api_response::ApiResponse,
    app_error::{AppError, FieldError},
    app_state::SharedState,
    backlog_query::BacklogQuery,
    backlog_response::BacklogResponse,
    web_api::extract::{ApiJson, ApiPath, ApiQuery, ConfiguredAdoSession},
    initialize_ado_request::InitializeAdoRequest,
    initialize_ado_response::InitializeAdoResponse,
    work_item_response::WorkItemResponse,
};

pub struct AdoController {}

impl AdoController {
    /// Verifies caller-supplied credentials. Nothing is retained server-side;
    /// the configured PAT keeps serving the other ADO routes.
    pub async fn initialize(
        State(state): State<SharedState>,
        ApiJson(body): ApiJson<InitializeAdoRequest>,
    ) -> Result<Json<ApiResponse<InitializeAdoResponse>>, AppError> {
        let errors = body.validate();
        if !errors.is_empty() {
            return Err(AppError::invalid_input(errors));
        }

        let organization = body.organization.trim().to_string();
        let session = match state.settings.ado.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(base_url) => {
                AdoSession::with_base_url(&organization, base_url.to_string(), &body.access_token, body.auth_mode)
            }
            None => AdoSession::new(&organization, &body.access_token, body.auth_mode),
        };

        let test = state.ado_client.test_connection(&session).await;
        if !test.success {
            return Err(AppError::Authentication { code: "ADO_CONNECTION_FAILED", message: test.message });
        }

        tracing::info!(%organization, mode = ?body.auth_mode, "ADO credentials verified");
        Ok(ApiResponse::ok(InitializeAdoResponse {
            message: "ADO service initialized successfully",
            organization,
            auth_mode: body.auth_mode,
            user_info: test.user_info,
        }))
    }

    pub async fn projects(
        State(state): State<SharedState>,
        ConfiguredAdoSession(session): ConfiguredAdoSession,
    ) -> Result<Json<ApiResponse<Vec<Project>>>, AppError> {
        let projects = state.ado_client.get_projects(&session).await?;
        let total = projects.len();
        Ok(ApiResponse::with_total(projects, total))
    }

    pub async fn backlog(
        State(state): State<SharedState>,
        ConfiguredAdoSession(session): ConfiguredAdoSession,
        ApiPath(project_id): ApiPath<String>,
        ApiQuery(query): ApiQuery<BacklogQuery>,
    ) -> Result<Json<ApiResponse<BacklogResponse>>, AppError> {
        let project_id = require_project_id(project_id)?;
        let (options, top) = query.to_options().map_err(AppError::invalid_input)?;

        let items = state
            .ado_client
            .get_backlog_items(&session, &project_id, &options, top)
            .await?;

        Ok(ApiResponse::ok(BacklogResponse {
            total_count: items.len(),
            backlog_items: items,
            project_id,
            filters: options,
            top,
        }))
    }

    pub async fn work_item(
        State(state): State<SharedState>,
        ConfiguredAdoSession(session): ConfiguredAdoSession,
        ApiPath(raw_id): ApiPath<String>,
    ) -> Result<Json<ApiResponse<WorkItemResponse>>, AppError> {
        let id: u64 = raw_id.trim().parse().map_err(|_| {
            AppError::invalid_input(vec![FieldError::new("workItemId", "Work item ID must be a valid integer")])
        })?;

        let work_item = state.ado_client.get_work_item(&session, id).await?;
        Ok(ApiResponse::ok(WorkItemResponse { work_item }))
    }

    /// Always 200; the envelope's `success` mirrors the test outcome.
    pub async fn test_connection(
        State(state): State<SharedState>,
        ConfiguredAdoSession(session): ConfiguredAdoSession,
    ) -> Json<ApiResponse<ConnectionTest>> {
        let test = state.ado_client.test_connection(&session).await;
        Json(ApiResponse { success: test.success, data: test, total_count: None })
    }

    pub async fn activity(
        State(state): State<SharedState>,
        ConfiguredAdoSession(session): ConfiguredAdoSession,
        ApiPath(project_id): ApiPath<String>,
    ) -> Result<Json<ApiResponse<ActivityResponse>>, AppError> {
        let project_id = require_project_id(project_id)?;
        let activity = state.ado_client.get_recent_activity(&session, &project_id).await?;
        Ok(ApiResponse::ok(ActivityResponse {
            total_count: activity.len(),
            activity,
            project_id,
        }))
    }
}

fn require_project_id(project_id: String) -> Result<String, AppError> {
    let trimmed = project_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input(vec![FieldError::new("projectId", "Project ID is required")]));
    }
    Ok(trimmed.to_string())
}
