// Requests
pub mod analyze_task_request;
pub mod backlog_query;
pub mod complete_task_request;
pub mod create_task_request;
pub mod initialize_ado_request;
pub mod login_request;
pub mod recommendations_query;
pub mod register_request;
pub mod task_list_query;
pub mod update_task_request;
pub mod user_edit_request;

// Responses
pub mod activity_response;
pub mod analysis_response;
pub mod api_response;
pub mod backlog_response;
pub mod health_response;
pub mod initialize_ado_response;
pub mod login_response;
pub mod message_response;
pub mod recommendations_response;
pub mod task_action_response;
pub mod task_list_response;
pub mod task_response;
pub mod user_get_response;
pub mod user_profile_response;
pub mod work_item_response;
