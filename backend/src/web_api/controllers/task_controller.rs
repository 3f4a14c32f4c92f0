use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    api_response::ApiResponse,
    app_error::{AppError, FieldError},
    app_state::SharedState,
    complete_task_request::CompleteTaskRequest,
    create_task_request::CreateTaskRequest,
    web_api::extract::{ApiJson, ApiPath, ApiQuery},
    message_response::MessageResponse,
    task::{InvalidTransition, Task},
    task_action_response::TaskActionResponse,
    task_list_query::TaskListQuery,
    task_list_response::TaskListResponse,
    update_task_request::UpdateTaskRequest,
    user::User,
};

type TaskResult = Result<Json<ApiResponse<TaskActionResponse>>, AppError>;

pub struct TaskController {}

impl TaskController {
    pub async fn list(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        ApiQuery(query): ApiQuery<TaskListQuery>,
    ) -> Result<Json<ApiResponse<TaskListResponse>>, AppError> {
        let tasks = state.data_context.list_tasks_for_user(user.id)?;
        let (page, pagination) = query.apply(tasks).map_err(AppError::invalid_input)?;
        Ok(ApiResponse::ok(TaskListResponse {
            tasks: page.iter().map(|t| t.to_response(&user)).collect(),
            pagination,
        }))
    }

    pub async fn create(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        ApiJson(body): ApiJson<CreateTaskRequest>,
    ) -> Result<(StatusCode, Json<ApiResponse<TaskActionResponse>>), AppError> {
        let errors = body.validate();
        if !errors.is_empty() {
            return Err(AppError::invalid_input(errors));
        }

        let task = Task::new(user.id, body, Utc::now());
        state.data_context.save_task(&task)?;
        tracing::info!(task_id = %task.id, user_id = %user.id, score = task.ai_priority_score, "task created");
        Ok((StatusCode::CREATED, ApiResponse::ok(TaskActionResponse::new(task.to_response(&user)))))
    }

    pub async fn get(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        ApiPath(id): ApiPath<Uuid>,
    ) -> TaskResult {
        let task = owned_task(&state, id, &user)?;
        Ok(ApiResponse::ok(TaskActionResponse::new(task.to_response(&user))))
    }

    pub async fn update(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        ApiPath(id): ApiPath<Uuid>,
        ApiJson(body): ApiJson<UpdateTaskRequest>,
    ) -> TaskResult {
        let errors = body.validate();
        if !errors.is_empty() {
            return Err(AppError::invalid_input(errors));
        }

        let mut task = owned_task(&state, id, &user)?;
        task.apply_update(body, Utc::now());
        state.data_context.save_task(&task)?;
        Ok(ApiResponse::ok(TaskActionResponse::new(task.to_response(&user))))
    }

    pub async fn delete(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        ApiPath(id): ApiPath<Uuid>,
    ) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
        let task = owned_task(&state, id, &user)?;
        state.data_context.delete_task(task.id)?;
        tracing::info!(task_id = %task.id, "task deleted");
        Ok(ApiResponse::ok(MessageResponse { message: "Task deleted successfully" }))
    }

    pub async fn start(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        ApiPath(id): ApiPath<Uuid>,
    ) -> TaskResult {
        let mut task = owned_task(&state, id, &user)?;
        task.start(Utc::now()).map_err(transition_error)?;
        state.data_context.save_task(&task)?;
        Ok(ApiResponse::ok(TaskActionResponse::with_message(
            task.to_response(&user),
            "Task started successfully",
        )))
    }

    /// The body is optional; an empty one means no `actualHours`.
    pub async fn complete(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        ApiPath(id): ApiPath<Uuid>,
        body: Bytes,
    ) -> TaskResult {
        let request: CompleteTaskRequest = if body.iter().all(u8::is_ascii_whitespace) {
            CompleteTaskRequest::default()
        } else {
            serde_json::from_slice(&body)
                .map_err(|e| AppError::invalid_input(vec![FieldError::new("body", e.to_string())]))?
        };
        if request.actual_hours.is_some_and(|h| h < 0.0 || !h.is_finite()) {
            return Err(AppError::invalid_input(vec![FieldError::new(
                "actualHours",
                "actualHours must be a non-negative number",
            )]));
        }

        let mut task = owned_task(&state, id, &user)?;
        task.complete(request.actual_hours, Utc::now()).map_err(transition_error)?;
        state.data_context.save_task(&task)?;
        Ok(ApiResponse::ok(TaskActionResponse::with_message(
            task.to_response(&user),
            "Task completed successfully",
        )))
    }
}

fn owned_task(state: &SharedState, id: Uuid, user: &User) -> Result<Task, AppError> {
    state
        .data_context
        .get_task_for_user(id, user.id)?
        .ok_or_else(AppError::task_not_found)
}

fn transition_error(e: InvalidTransition) -> AppError {
    AppError::Conflict { code: "INVALID_STATUS_TRANSITION", message: e.to_string() }
}
