use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use data_agent_service::{
    api,
    config,
    openai::{CompletionClient, OpenAIClient},
    AgentService,
    PromptBuilder,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load env before the filter so RUST_LOG from .env applies
    config::Config::dotenv_load();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("data_agent_service=info,tower_http=info")),
        )
        .init();

    let config = config::Config::new()?;
    config.log_summary();

    let client: Option<Arc<dyn CompletionClient>> = match (&config.openai_api_key, config.offline()) {
        (_, true) => {
            tracing::info!("FREESTYLE_LEVEL=0, answering without the model");
            None
        }
        (None, false) => {
            tracing::warn!("OPENAI_API_KEY is not set, answering without the model");
            None
        }
        (Some(key), false) => Some(Arc::new(OpenAIClient::new(config.openai_base_url.clone(), key.clone()))),
    };

    let agent = AgentService::new(
        client,
        config.openai_model.clone(),
        PromptBuilder::new(config.template_path.clone()),
        config.extract_mode,
    );
    let app = api::router(Arc::new(api::AppState { agent }));

    let socket_address = config.socket_addr();
    tracing::info!("[agent-service] listening on http://{}", socket_address);
    axum::Server::bind(&socket_address)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
