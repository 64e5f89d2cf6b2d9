use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Best effort: a missing .env file is fine, the environment wins anyway.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gh_pilot=info,tower_http=info")),
        )
        .init();

    let config = gh_pilot::Config::from_env();
    gh_pilot::api::serve(config).await
}
