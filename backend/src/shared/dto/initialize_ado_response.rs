use serde::Serialize;

use crate::ado::{client::ConnectionInfo, session::AuthMode};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeAdoResponse {
    pub message: &'static str,
    pub organization: String,
    pub auth_mode: AuthMode,
    pub user_info: Option<ConnectionInfo>,
}
