use std::{error::Error, net::SocketAddr};

use tokio::signal;
use worksync_server::{
    app_state::AppState, build_app, data_access::data_context::DataContext, logging,
    settings::Settings,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; real deployments use the process environment.
    let _ = dotenvy::dotenv();

    let settings = Settings::load()?;
    logging::init(&settings.log_level);

    let data_context = DataContext::new(&settings.db_path)?;
    let addr = format!("{}:{}", settings.tcp_socket_binding, settings.tcp_socket_port);

    match (settings.ado.organization(), settings.ado.pat()) {
        (Some(org), Some(_)) => tracing::info!(organization = org, "Azure DevOps configured"),
        _ => tracing::warn!("Azure DevOps organization or PAT not configured; /ado routes will fail"),
    }

    let state = AppState::build(settings, data_context)?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
