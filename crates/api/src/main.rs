use anyhow::Context;

use backoffice_api::app::{self, routes};
use backoffice_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal outside local development.
    let _ = dotenvy::dotenv();
    backoffice_observability::init();

    let config = ApiConfig::from_env()?;
    let port = config.port;

    let services = app::services::build_services(config).await?;

    let gaps = services.configuration_gaps(&routes::policies::all());
    if !gaps.is_empty() {
        for (group, err) in &gaps {
            tracing::error!(%group, error = %err, "route group cannot be authorized");
        }
        anyhow::bail!("refusing to start: {} route group(s) lack verification material", gaps.len());
    }

    let app = app::router(services);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{port}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
