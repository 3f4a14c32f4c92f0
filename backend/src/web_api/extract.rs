//! Extractors that report malformed input through the JSON error envelope
//! instead of axum's plain-text rejections.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::{
    ado::session::{AdoSession, AuthMode},
    app_error::{AppError, FieldError},
    app_state::SharedState,
};

pub struct ApiJson<T>(pub T);

pub struct ApiQuery<T>(pub T);

pub struct ApiPath<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::invalid_input(vec![FieldError::new("body", rejection.body_text())]))?;
        Ok(ApiJson(value))
    }
}

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::invalid_input(vec![FieldError::new("query", rejection.body_text())]))?;
        Ok(ApiQuery(value))
    }
}

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::invalid_input(vec![FieldError::new("path", rejection.body_text())]))?;
        Ok(ApiPath(value))
    }
}

/// ADO credentials from server configuration, built fresh per request.
pub struct ConfiguredAdoSession(pub AdoSession);

#[axum::async_trait]
impl FromRequestParts<SharedState> for ConfiguredAdoSession {
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        let ado = &state.settings.ado;
        let pat = ado.pat().ok_or_else(|| AppError::Configuration {
            code: "PAT_NOT_CONFIGURED",
            message: "ADO Personal Access Token not configured. Please set ADO_PERSONAL_ACCESS_TOKEN in .env file."
                .to_string(),
        })?;
        let organization = ado.organization().ok_or_else(|| AppError::Configuration {
            code: "ORGANIZATION_NOT_CONFIGURED",
            message: "ADO organization not configured. Please set ADO_DEFAULT_ORGANIZATION in .env file."
                .to_string(),
        })?;

        let session = match ado.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(base_url) => AdoSession::with_base_url(organization, base_url.to_string(), pat, AuthMode::Pat),
            None => AdoSession::new(organization, pat, AuthMode::Pat),
        };
        Ok(ConfiguredAdoSession(session))
    }
}
