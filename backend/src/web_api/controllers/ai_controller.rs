use axum::{extract::State, Extension, Json};
use chrono::Utc;

use crate::{
    ai::{analysis, recommend::{self, RecommendationKind}},
    analysis_response::{AnalysisResponse, InsightsResponse},
    analyze_task_request::AnalyzeTaskRequest,
    api_response::ApiResponse,
    app_error::AppError,
    app_state::SharedState,
    web_api::extract::{ApiJson, ApiQuery},
    recommendations_query::RecommendationsQuery,
    recommendations_response::RecommendationsResponse,
    task::Task,
    user::User,
};

pub struct AiController {}

impl AiController {
    pub async fn recommendations(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        ApiQuery(query): ApiQuery<RecommendationsQuery>,
    ) -> Result<Json<ApiResponse<RecommendationsResponse>>, AppError> {
        let kind = RecommendationKind::parse(query.kind.as_deref());
        let open: Vec<Task> = state
            .data_context
            .list_tasks_for_user(user.id)?
            .into_iter()
            .filter(|t| t.status.is_open())
            .collect();

        let now = Utc::now();
        let recommendations = recommend::recommend(&open, kind, query.limit(), now);
        tracing::debug!(user_id = %user.id, ?kind, count = recommendations.len(), "recommendations generated");
        Ok(ApiResponse::ok(RecommendationsResponse { recommendations, kind, generated_at: now }))
    }

    pub async fn analyze_task(
        Extension(_user): Extension<User>,
        ApiJson(body): ApiJson<AnalyzeTaskRequest>,
    ) -> Result<Json<ApiResponse<AnalysisResponse>>, AppError> {
        if body.title.trim().is_empty() {
            return Err(AppError::Validation {
                code: "MISSING_TITLE",
                message: "Task title is required".to_string(),
                details: Vec::new(),
            });
        }
        let analysis = analysis::analyze_task(&body.title, body.description.as_deref());
        Ok(ApiResponse::ok(AnalysisResponse { analysis }))
    }

    pub async fn insights(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
    ) -> Result<Json<ApiResponse<InsightsResponse>>, AppError> {
        let mut tasks = state.data_context.list_tasks_for_user(user.id)?;
        tasks.truncate(analysis::INSIGHT_WINDOW);
        Ok(ApiResponse::ok(InsightsResponse { insights: analysis::insights(&tasks) }))
    }
}
