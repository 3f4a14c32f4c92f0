use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    task_response::UserSummary,
    user_edit_request::UserEditRequest,
    user_get_response::UserGetResponse,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default = "empty_preferences")]
    pub preferences: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn empty_preferences() -> Value {
    Value::Object(Default::default())
}

impl User {
    pub fn new(name: &str, email: &str, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: normalize_email(email),
            password_hash,
            preferences: empty_preferences(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn edit(self, request: UserEditRequest, now: DateTime<Utc>) -> Self {
        Self {
            name: request
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or(self.name),
            preferences: request.preferences.unwrap_or(self.preferences),
            updated_at: now,
            ..self
        }
    }

    pub fn to_get_dto(&self) -> UserGetResponse {
        UserGetResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            preferences: self.preferences.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
