use axum::{extract::State, Extension, Json};
use chrono::Utc;

use crate::{
    api_response::ApiResponse,
    app_error::AppError,
    app_state::SharedState,
    web_api::extract::ApiJson,
    user::User,
    user_edit_request::UserEditRequest,
    user_profile_response::UserProfileResponse,
};

pub struct UserController {}

impl UserController {
    pub async fn get_profile(Extension(user): Extension<User>) -> Json<ApiResponse<UserProfileResponse>> {
        ApiResponse::ok(UserProfileResponse { user: user.to_get_dto() })
    }

    pub async fn update_profile(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        ApiJson(body): ApiJson<UserEditRequest>,
    ) -> Result<Json<ApiResponse<UserProfileResponse>>, AppError> {
        let errors = body.validate();
        if !errors.is_empty() {
            return Err(AppError::invalid_input(errors));
        }

        let edited = user.edit(body, Utc::now());
        if !state.data_context.update_user(&edited)? {
            return Err(AppError::NotFound {
                code: "USER_NOT_FOUND",
                message: "User not found".to_string(),
            });
        }
        tracing::info!(user_id = %edited.id, "profile updated");
        Ok(ApiResponse::ok(UserProfileResponse { user: edited.to_get_dto() }))
    }
}
