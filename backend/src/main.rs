//! Stock Forecast Service - Backend Server
//!
//! Reconstructs product stock history from the movement ledger and projects
//! future stock levels, stockout dates and trend confidence.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod routes;
mod services;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "stock_forecast_server=debug,shared=info,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Stock Forecast Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    // Create application state
    let state = AppState {
        db: db_pool,
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Stock Forecast API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/stock_forecast_test")
            .unwrap();
        AppState {
            db,
            config: Arc::new(Config {
                environment: "test".to_string(),
                server: config::ServerConfig::default(),
                database: config::DatabaseConfig {
                    url: "postgres://localhost/stock_forecast_test".to_string(),
                    max_connections: 1,
                    min_connections: 0,
                },
                forecast: config::ForecastConfig::default(),
            }),
        }
    }

    async fn post_forecast(body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = create_app(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/forecast")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root() {
        let response = create_app(test_state())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_forecast_snapshot_endpoint() {
        let (status, body) = post_forecast(serde_json::json!({
            "movements": [
                {"product_id": null, "movement_type": "ADD", "quantity": 100,
                 "created_at": "2024-01-01T08:00:00Z", "note": "Création du produit"},
                {"product_id": null, "movement_type": "SALE", "quantity": 10,
                 "created_at": "2024-01-02T08:00:00Z"},
                {"product_id": null, "movement_type": "SALE", "quantity": 10,
                 "created_at": "2024-01-03T08:00:00Z"},
                {"product_id": null, "movement_type": "ADD", "quantity": 5,
                 "created_at": "2024-01-04T08:00:00Z"}
            ],
            "live_stock": 85,
            "horizon_days": 30,
            "today": "2024-01-04"
        }))
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["history"]["points"].as_array().unwrap().len(), 4);
        assert!(body["history"]["correction"].is_null());
        assert_eq!(body["report"]["has_enough_data"], true);
        assert_eq!(
            body["prediction"]["projected_series"].as_array().unwrap().len(),
            34
        );
    }

    #[tokio::test]
    async fn test_forecast_snapshot_rejects_zero_horizon() {
        let (status, body) = post_forecast(serde_json::json!({
            "movements": [],
            "live_stock": 0,
            "horizon_days": 0
        }))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
