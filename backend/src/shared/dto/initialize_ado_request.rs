use serde::Deserialize;

use crate::{ado::session::AuthMode, app_error::FieldError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeAdoRequest {
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub auth_mode: AuthMode,
}

impl InitializeAdoRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.organization.trim().is_empty() {
            errors.push(FieldError::new("organization", "Organization is required"));
        }
        if self.access_token.trim().is_empty() {
            errors.push(FieldError::new("accessToken", "Access token is required"));
        }
        errors
    }
}
