use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use mongodb::{bson::doc, options::ClientOptions, Client};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use cinema_api::auth::TokenRegistry;
use cinema_api::config::Config;
use cinema_api::create_router;
use cinema_api::media::MediaStore;
use cinema_api::storage::MongoStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinema_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    let client_options = ClientOptions::parse(&config.mongodb_uri)
        .await
        .context("failed to parse MONGODB_URI")?;
    let client =
        Client::with_options(client_options).context("failed to initialize MongoDB client")?;

    // Ping before serving so a bad connection string fails fast.
    client
        .database(&config.database)
        .run_command(doc! { "ping": 1 }, None)
        .await
        .context("failed to reach MongoDB")?;
    tracing::info!(database = %config.database, "connected to MongoDB");

    let store = MongoStore::new(&client, &config.database);
    store
        .ensure_indexes()
        .await
        .context("failed to create indexes")?;

    tokio::fs::create_dir_all(&config.media_root)
        .await
        .context("failed to create media directory")?;

    let tokens = Arc::new(TokenRegistry::from_tokens(
        &config.admin_tokens,
        &config.user_tokens,
    ));
    let media = Arc::new(MediaStore::new(config.media_root.clone()));
    let mut app = create_router(Arc::new(store), tokens, media);

    if let Some(origin) = &config.allowed_origin {
        let origin = origin
            .parse::<HeaderValue>()
            .context("APP_URL is not a valid origin")?;
        app = app.layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_origin(origin)
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        );
    }

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "cinema API listening");
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
