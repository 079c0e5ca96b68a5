use ews_dashboard::report::SummaryReport;
use ews_dashboard::theme::Stylesheet;
use ews_dashboard::ui::DASHBOARD_CSS;
use ews_dashboard::{AppConfig, AppState, load_data, router};
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    let data = load_data(&config.data_path).await?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let state = AppState::new(
        config,
        data,
        Stylesheet::parse(DASHBOARD_CSS),
        Arc::new(SummaryReport),
    );
    let app = router(state);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
