use std::{sync::Arc, time::Duration};

use crate::{
    ado::client::{AdoClient, AdoError},
    data_access::data_context::DataContext,
    settings::Settings,
    web_api::rate_limit::{build_limiter, IpRateLimiter},
};

pub struct AppState {
    pub settings: Settings,
    pub data_context: DataContext,
    pub ado_client: AdoClient,
    pub api_limiter: Arc<IpRateLimiter>,
    pub ai_limiter: Arc<IpRateLimiter>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wires the HTTP client and both rate limiters from `settings`.
    pub fn build(settings: Settings, data_context: DataContext) -> Result<SharedState, AdoError> {
        let ado_client = AdoClient::new(Duration::from_secs(settings.ado.request_timeout_secs))?;
        let api_limiter = build_limiter(settings.rate_limit_window_ms, settings.rate_limit_max);
        let ai_limiter = build_limiter(settings.ai_rate_limit_window_ms, settings.ai_rate_limit_max);

        Ok(Arc::new(AppState {
            settings,
            data_context,
            ado_client,
            api_limiter,
            ai_limiter,
        }))
    }
}
