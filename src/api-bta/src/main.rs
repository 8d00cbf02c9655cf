use std::sync::Arc;

use anyhow::Context;
use core_bta::{
    get_api_base_url, get_db_pool, get_llm_config, get_tls_config, get_upload_config, llms::OpenAiProvider,
    setup_logging,
};

use api_bta::{routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if it exists
    dotenvy::dotenv().ok();

    setup_logging("api_bta=debug,tower_http=debug")?;

    let pool = get_db_pool().await?;
    let uploads = get_upload_config()?;
    let llm_config = get_llm_config();
    let provider = OpenAiProvider::new(&llm_config);
    tracing::info!("Using model '{}' at {}", provider.model(), llm_config.api_base);
    tracing::info!("Uploads go to {:?} (max {} bytes)", uploads.dir, uploads.max_bytes);

    let app = routes::router(uploads.max_bytes).with_state(AppState::new(
        pool,
        Arc::new(provider),
        uploads,
    ));

    let addr = get_api_base_url().context("Invalid HOST or PORT")?;

    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("A rustls crypto provider was already installed"))?;

    match get_tls_config().await? {
        Some(tls_config) => {
            tracing::info!("Listening on https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind to address: {}", addr))?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }
    Ok(())
}
