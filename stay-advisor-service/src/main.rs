use stay_advisor::AdvisorConfig;
use stay_advisor_service::{ServiceConfig, create_app, telemetry::init_tracing};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let service_config = ServiceConfig::from_env()?;
    init_tracing(&service_config.log_format);

    info!("Starting stay advisor service");

    let advisor_config = AdvisorConfig::global()?;
    info!(config = ?advisor_config, "Loaded advisor configuration");

    let app = create_app(&service_config, advisor_config)?;

    let listener = TcpListener::bind(format!("0.0.0.0:{}", service_config.port)).await?;
    let addr = listener.local_addr()?;
    info!("Server running on http://{}", addr);

    info!("Available endpoints:");
    info!("  GET  /health                        - Health check");
    info!("  POST /recommend                     - Recommend a listing for a travel query");
    info!("  GET  /recommendations/{{request_id}}  - Fetch a previous recommendation");
    info!(r#"    Example: POST /recommend {{"query": "a flat near Sagrada Familia for two next weekend under 120 euros"}}"#);

    axum::serve(listener, app).await?;

    Ok(())
}
