use serde::Deserialize;
use serde_json::Value;

use crate::app_error::FieldError;

#[derive(Debug, Clone, Deserialize)]
pub struct UserEditRequest {
    pub name: Option<String>,
    pub preferences: Option<Value>,
}

impl UserEditRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.preferences.as_ref().is_some_and(|p| !p.is_object()) {
            errors.push(FieldError::new("preferences", "preferences must be a JSON object"));
        }
        errors
    }
}
