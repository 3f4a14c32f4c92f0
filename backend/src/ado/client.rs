//! Azure DevOps REST client (api-version 7.0).
//!
//! The client owns only the connection pool and timeout. Credentials arrive
//! per call through an [`AdoSession`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{header, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use super::session::AdoSession;
use super::transform::{fields, is_guid, transform_work_item, RawWorkItem, WorkItem};
use super::wiql::{build_query, OrderClause, WiqlOptions};

const ACCEPT_API_VERSION: &str = "application/json;api-version=7.0";
/// ADO rejects `workitems?ids=` lists longer than this.
const MAX_IDS_PER_REQUEST: usize = 200;
pub const DEFAULT_BACKLOG_TOP: usize = 15;
pub const MAX_BACKLOG_TOP: usize = 50;
const ACTIVITY_WINDOW_DAYS: u32 = 7;
const ACTIVITY_LIMIT: usize = 10;

/// The single upstream failure kind: an HTTP status when one was received,
/// and the message ADO (or the transport) gave.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AdoRequestError {
    pub status_code: Option<u16>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdoError {
    #[error("ADO service not initialized with authentication")]
    NotInitialized,

    #[error("Project with ID {0} not found")]
    ProjectNotFound(String),

    #[error(transparent)]
    Request(#[from] AdoRequestError),
}

impl AdoError {
    /// Prefixes upstream messages with what was being attempted.
    fn context(self, what: &str) -> Self {
        match self {
            AdoError::Request(e) => AdoError::Request(AdoRequestError {
                status_code: e.status_code,
                message: format!("{what}: {}", e.message),
            }),
            other => other,
        }
    }
}

impl From<reqwest::Error> for AdoError {
    fn from(e: reqwest::Error) -> Self {
        AdoError::Request(AdoRequestError {
            status_code: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        })
    }
}

// ── Wire types ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default)]
    count: usize,
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WiqlResponse {
    #[serde(default)]
    work_items: Vec<WorkItemReference>,
}

#[derive(Debug, Deserialize)]
struct WorkItemReference {
    id: u64,
}

#[derive(Debug, Serialize)]
struct WiqlRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// ── Public result types ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTest {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_info: Option<ConnectionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub organization: String,
    pub project_count: usize,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub work_item_id: u64,
}

// ── Client ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AdoClient {
    http: reqwest::Client,
}

impl AdoClient {
    pub fn new(timeout: Duration) -> Result<Self, AdoError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    fn request(&self, session: &AdoSession, method: Method, path: &str) -> Result<RequestBuilder, AdoError> {
        let auth = session.authorization_header().ok_or(AdoError::NotInitialized)?;
        Ok(self
            .http
            .request(method, format!("{}{path}", session.base_url()))
            .header(header::AUTHORIZATION, auth)
            .header(header::ACCEPT, ACCEPT_API_VERSION)
            .header(header::CONTENT_TYPE, "application/json"))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AdoError> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn get_projects(&self, session: &AdoSession) -> Result<Vec<Project>, AdoError> {
        let result: Result<ListResponse<Project>, AdoError> = async {
            let request = self.request(session, Method::GET, "/_apis/projects")?;
            self.send(request).await
        }
        .await;

        match result {
            Ok(list) => {
                tracing::info!(
                    organization = session.organization(),
                    count = list.value.len(),
                    "retrieved ADO projects"
                );
                Ok(list.value)
            }
            Err(e) => {
                tracing::error!(error = %e, "error fetching ADO projects");
                Err(e.context("Failed to fetch ADO projects"))
            }
        }
    }

    /// WIQL needs the project name; GUID ids are looked up first.
    pub async fn resolve_project_name(&self, session: &AdoSession, project_id: &str) -> Result<String, AdoError> {
        if !is_guid(project_id) {
            return Ok(project_id.to_string());
        }
        self.get_projects(session)
            .await?
            .into_iter()
            .find(|p| p.id.eq_ignore_ascii_case(project_id))
            .map(|p| p.name)
            .ok_or_else(|| AdoError::ProjectNotFound(project_id.to_string()))
    }

    pub async fn query_work_item_ids(&self, session: &AdoSession, wiql: &str) -> Result<Vec<u64>, AdoError> {
        tracing::debug!(wiql, "running WIQL query");
        let request = self
            .request(session, Method::POST, "/_apis/wit/wiql")?
            .json(&WiqlRequest { query: wiql });
        let response: WiqlResponse = self.send(request).await?;
        Ok(response.work_items.into_iter().map(|r| r.id).collect())
    }

    /// Batch fetch, at most [`MAX_IDS_PER_REQUEST`] ids per round trip.
    pub async fn get_work_items(&self, session: &AdoSession, ids: &[u64]) -> Result<Vec<WorkItem>, AdoError> {
        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let joined = chunk.iter().map(u64::to_string).collect::<Vec<_>>().join(",");
            let request = self
                .request(session, Method::GET, "/_apis/wit/workitems")?
                .query(&[("ids", joined.as_str()), ("$expand", "Relations")]);
            let page: ListResponse<RawWorkItem> = self.send(request).await?;
            items.extend(page.value.iter().filter_map(|raw| {
                let item = transform_work_item(raw);
                if item.is_none() {
                    tracing::warn!("skipping work item without an id");
                }
                item
            }));
        }
        Ok(items)
    }

    pub async fn get_backlog_items(
        &self,
        session: &AdoSession,
        project_id: &str,
        options: &WiqlOptions,
        top: usize,
    ) -> Result<Vec<WorkItem>, AdoError> {
        self.query_work_items(session, project_id, options, top)
            .await
            .map_err(|e| {
                tracing::error!(project_id, error = %e, "error fetching ADO backlog items");
                e.context("Failed to fetch backlog items")
            })
    }

    /// WIQL then detail fetch, without an error prefix.
    async fn query_work_items(
        &self,
        session: &AdoSession,
        project_id: &str,
        options: &WiqlOptions,
        top: usize,
    ) -> Result<Vec<WorkItem>, AdoError> {
        if !session.is_authenticated() {
            return Err(AdoError::NotInitialized);
        }
        let project_name = self.resolve_project_name(session, project_id).await?;
        let query = build_query(&project_name, options);
        let ids = self.query_work_item_ids(session, &query).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let limited: Vec<u64> = ids.into_iter().take(top).collect();
        self.get_work_items(session, &limited).await
    }

    pub async fn get_work_item(&self, session: &AdoSession, id: u64) -> Result<WorkItem, AdoError> {
        let result = async {
            let request = self
                .request(session, Method::GET, &format!("/_apis/wit/workitems/{id}"))?
                .query(&[("$expand", "all")]);
            let raw: RawWorkItem = self.send(request).await?;
            transform_work_item(&raw).ok_or_else(|| {
                AdoError::Request(AdoRequestError {
                    status_code: None,
                    message: "response carried no work item id".to_string(),
                })
            })
        }
        .await;

        match result {
            Ok(item) => {
                tracing::info!(id, title = %item.title, "retrieved work item");
                Ok(item)
            }
            Err(e) => {
                tracing::error!(id, error = %e, "error fetching work item");
                Err(e.context("Failed to fetch work item"))
            }
        }
    }

    /// Never fails: problems are reported as `success: false`.
    pub async fn test_connection(&self, session: &AdoSession) -> ConnectionTest {
        let result: Result<ListResponse<Project>, AdoError> = async {
            let request = self
                .request(session, Method::GET, "/_apis/projects")?
                .query(&[("$top", "1")]);
            self.send(request).await
        }
        .await;

        match result {
            Ok(list) => {
                tracing::info!(organization = session.organization(), "ADO connection test successful");
                ConnectionTest {
                    success: true,
                    message: "Successfully connected to Azure DevOps".to_string(),
                    user_info: Some(ConnectionInfo {
                        organization: session.organization().to_string(),
                        project_count: list.count.max(list.value.len()),
                        base_url: session.base_url().to_string(),
                    }),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(organization = session.organization(), error = %e, "ADO connection test failed");
                ConnectionTest {
                    success: false,
                    message: format!("Connection failed: {e}"),
                    user_info: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Work items assigned to the caller that changed in the last week.
    pub async fn get_recent_activity(&self, session: &AdoSession, project_id: &str) -> Result<Vec<ActivityItem>, AdoError> {
        let options = WiqlOptions {
            assigned_to_me: true,
            states: Vec::new(),
            work_item_types: Vec::new(),
            changed_within_days: Some(ACTIVITY_WINDOW_DAYS),
            order_by: vec![OrderClause::desc(fields::CHANGED_DATE)],
        };

        let items = self
            .query_work_items(session, project_id, &options, ACTIVITY_LIMIT)
            .await
            .map_err(|e| {
                tracing::error!(project_id, error = %e, "error fetching recent activity");
                e.context("Failed to fetch recent activity")
            })?;

        tracing::info!(project_id, count = items.len(), "built recent activity");
        Ok(items
            .into_iter()
            .map(|item| ActivityItem {
                id: format!("activity_{}", item.id),
                kind: "work-item-update",
                description: format!("Work item #{} was updated: {}", item.id, item.title),
                timestamp: item.changed_date,
                work_item_id: item.id,
            })
            .collect())
    }
}

async fn check_status(response: Response) -> Result<Response, AdoError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        });
    Err(AdoError::Request(AdoRequestError {
        status_code: Some(status.as_u16()),
        message,
    }))
}
