//! Per-request Azure DevOps credentials.
//!
//! An `AdoSession` is built for each call site and handed to the client, so
//! no organization or token lives in shared mutable state.

use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

const HOSTED_ADO_URL: &str = "https://dev.azure.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Personal Access Token, sent as HTTP Basic with an empty user name.
    Pat,
    /// OAuth access token, sent as `Bearer`.
    #[default]
    Bearer,
}

#[derive(Clone)]
pub struct AdoSession {
    organization: String,
    base_url: String,
    mode: AuthMode,
    token: Option<SecretString>,
}

impl AdoSession {
    pub fn new(organization: &str, token: &str, mode: AuthMode) -> Self {
        let organization = organization.trim();
        Self::with_base_url(organization, construct_base_url(organization), token, mode)
    }

    pub fn with_base_url(organization: &str, base_url: String, token: &str, mode: AuthMode) -> Self {
        let token = token.trim();
        Self {
            organization: organization.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            mode,
            token: (!token.is_empty()).then(|| SecretString::from(token.to_string())),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Value for the `Authorization` header, `None` when no token is held.
    pub fn authorization_header(&self) -> Option<String> {
        let token = self.token.as_ref()?.expose_secret();
        Some(match self.mode {
            AuthMode::Pat => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(format!(":{token}"));
                format!("Basic {encoded}")
            }
            AuthMode::Bearer => format!("Bearer {token}"),
        })
    }
}

impl std::fmt::Debug for AdoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdoSession")
            .field("organization", &self.organization)
            .field("base_url", &self.base_url)
            .field("mode", &self.mode)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A dotted organization is taken as a full host (`contoso.visualstudio.com`),
/// anything else as a dev.azure.com organization name.
pub fn construct_base_url(organization: &str) -> String {
    if organization.contains('.') {
        format!("https://{organization}")
    } else {
        format!("{HOSTED_ADO_URL}/{organization}")
    }
}
