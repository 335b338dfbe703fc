use projects_api::{api, config, state::AppState, store};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, DATABASE_PROVIDER, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!(
        "Starting Projects API in {:?} mode with {:?} backend",
        config.environment,
        config.database.provider
    );

    let reader = store::build_reader(&config.database)
        .await
        .unwrap_or_else(|e| panic!("failed to initialize backend reader: {}", e));

    let app = api::app(AppState::new(reader, config));

    // Allow tests or deployments to override port via env
    let port = std::env::var("PROJECTS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Projects API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
