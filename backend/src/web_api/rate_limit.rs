use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};

use crate::{app_error::AppError, app_state::SharedState};

pub type IpRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// `max` requests per `window_ms` per client, refilled evenly across the window.
pub fn build_limiter(window_ms: u64, max: u32) -> Arc<IpRateLimiter> {
    let burst = NonZeroU32::new(max).unwrap_or(NonZeroU32::MIN);
    let period = Duration::from_millis((window_ms / u64::from(burst.get())).max(1));
    let quota = Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst);
    Arc::new(RateLimiter::keyed(quota))
}

fn client_ip(request: &Request<Body>) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn check(limiter: &IpRateLimiter, request: &Request<Body>) -> Result<(), AppError> {
    let ip = client_ip(request);
    limiter.check_key(&ip).map_err(|_| {
        tracing::warn!(%ip, path = %request.uri().path(), "rate limit exceeded");
        AppError::RateLimited
    })
}

pub async fn api_rate_limit(
    State(state): State<SharedState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    check(&state.api_limiter, &request)?;
    Ok(next.run(request).await)
}

pub async fn ai_rate_limit(
    State(state): State<SharedState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    check(&state.ai_limiter, &request)?;
    Ok(next.run(request).await)
}
