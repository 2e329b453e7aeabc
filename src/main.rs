use sbom_sentinel::adapters::inbound::rest::{router, AppState};
use sbom_sentinel::adapters::outbound::network::{
    CachingVulnerabilityDatabase, OllamaClient, OsvClient,
};
use sbom_sentinel::adapters::outbound::persistence::SqliteSbomRepository;
use sbom_sentinel::analysis::AnalysisOrchestrator;
use sbom_sentinel::application::use_cases::SubmitSbomUseCase;
use sbom_sentinel::config::Config;
use sbom_sentinel::shared::Result;
use sbom_sentinel::vectordb::InMemoryVectorIndex;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("sbom-sentinel failed to start: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // Create adapters (dependency injection)
    let repository = Arc::new(SqliteSbomRepository::open(&config.database_path)?);
    let llm = Arc::new(OllamaClient::new(
        config.generate_url.clone(),
        config.embeddings_url.clone(),
    )?);
    let database = Arc::new(CachingVulnerabilityDatabase::new(OsvClient::new(
        config.osv_url.clone(),
    )?));
    let index = Arc::new(InMemoryVectorIndex::new());

    // Wire the engine
    let orchestrator = Arc::new(AnalysisOrchestrator::new(
        repository.clone(),
        llm,
        database,
        index,
    ));
    let state = AppState {
        submit: Arc::new(SubmitSbomUseCase::new(repository.clone())),
        repository,
        analyzer: orchestrator,
    };

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        port = config.port,
        database = %config.database_path.display(),
        "sbom-sentinel listening"
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}
