//! Clientes API Server
//!
//! Serves the `/api/clientes` resource, health checks and Swagger UI.
//!
//! ## Configuration
//!
//! Read from `config.toml` (or `CLIENTES_CONFIG`), then overridden by
//! environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CLIENTES_HTTP_HOST` | `0.0.0.0` | Bind address |
//! | `CLIENTES_HTTP_PORT` | `8080` | HTTP port |
//! | `CLIENTES_CORS_ORIGINS` | `*` | Comma-separated allowed origins |
//! | `CLIENTES_MONGODB_URI` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `CLIENTES_MONGODB_DATABASE` | `webflux` | MongoDB database name |
//! | `CLIENTES_MONGODB_COLLECTION` | `clientes` | Collection name |
//! | `CLIENTES_MONGODB_BATCH_SIZE` | `100` | Cursor batch size for the list endpoint |
//! | `CLIENTES_STORAGE_BACKEND` | `mongodb` | `mongodb` or `memory` |
//! | `CLIENTES_UPDATE_STATUS_CREATED` | `true` | PUT answers 201 instead of 200 |
//! | `RUST_LOG` | `info` | Log level |
//! | `LOG_FORMAT` | text | `json` for structured output |

use std::sync::Arc;

use anyhow::Result;
use axum::{http::HeaderValue, Router};
use tokio::{net::TcpListener, signal};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use clientes_config::{AppConfig, HttpConfig, StorageBackend};
use clientes_platform::{
    clientes_router, health_router, ClienteService, ClientesState, HealthState,
    InMemoryClienteService, MongoClienteService,
};

#[tokio::main]
async fn main() -> Result<()> {
    clientes_common::logging::init_logging("clientes-server");

    let config = AppConfig::load()?;
    info!(backend = ?config.storage.backend, "Starting Clientes API Server");

    let (service, db): (Arc<dyn ClienteService>, Option<mongodb::Database>) = match config.storage.backend {
        StorageBackend::Mongodb => {
            info!("Connecting to MongoDB: {}/{}", config.mongodb.uri, config.mongodb.database);
            let mongo_client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
            let db = mongo_client.database(&config.mongodb.database);
            let service = MongoClienteService::with_collection(&db, &config.mongodb.collection)
                .with_batch_size(config.mongodb.batch_size);
            (Arc::new(service), Some(db))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            (Arc::new(InMemoryClienteService::new()), None)
        }
    };

    let clientes_state = ClientesState::new(service)
        .with_update_status_created(config.api.update_status_created);
    let health_state = HealthState::new(db, Some(env!("CARGO_PKG_VERSION").to_string()));

    let (router, mut openapi) = OpenApiRouter::new()
        .merge(clientes_router(clientes_state))
        .split_for_parts();

    openapi.info.title = "Clientes API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("CRUD REST resource for clientes".to_string());

    let app = Router::new()
        .merge(router)
        .merge(health_router(health_state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http));

    let api_addr = config.http.bind_address();
    let listener = TcpListener::bind(&api_addr).await?;
    info!("API server listening on http://{}", api_addr);

    health_state.set_ready();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Clientes API Server shutdown complete");
    Ok(())
}

fn cors_layer(http: &HttpConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if http.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = http
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received...");
}
