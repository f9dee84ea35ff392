use minornote::{
    AppState,
    config::{AppConfig, Env},
    create_router, db,
    repository::{RepositoryState, SqliteRepository},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Entry point: configuration, logging, database, router, HTTP server.
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "minornote=debug,tower_http=info,axum=trace".into());

    // Pretty output locally, JSON in production for log aggregation.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    let pool = db::connect(&config.db_url)
        .await
        .expect("FATAL: failed to open database. Check DATABASE_URL.");
    db::init_schema(&pool)
        .await
        .expect("FATAL: failed to apply database schema.");

    let repo = Arc::new(SqliteRepository::new(pool)) as RepositoryState;

    let app_state = AppState { repo, config };
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("FATAL: failed to bind 0.0.0.0:3000");

    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("OpenAPI document available at http://localhost:3000/api-docs/openapi.json");

    axum::serve(listener, app)
        .await
        .expect("FATAL: server error");
}
