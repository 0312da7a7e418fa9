use stay_advisor::{AdvisorConfig, DetailedListings, RecommendationOrchestrator, SummaryTable};
use stay_advisor_service::ServiceConfig;
use tracing::info;

/// One-shot query: `ask <travel query...>`. Prints the outcome as JSON.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the result.
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        anyhow::bail!("usage: ask <travel query>");
    }

    let service_config = ServiceConfig::from_env()?;
    let advisor_config = AdvisorConfig::global()?;

    let summary = SummaryTable::from_json_file(&service_config.summary_dataset_path)?;
    let detailed = DetailedListings::from_json_file(&service_config.detailed_dataset_path)?;

    let orchestrator = RecommendationOrchestrator::from_config(advisor_config);
    let result = orchestrator
        .get_recommendation(&summary, &detailed, &query)
        .await;

    info!(recommended = result.is_recommended(), "Query finished");
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
