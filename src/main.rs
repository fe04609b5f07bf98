mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::core::ratings::RatingPolicy;
use crate::core::selector::Selector;
use crate::models::{BandThresholds, Coordinate};
use crate::routes::places::AppState;
use crate::services::{run_subscription, DirectoryMirror, RatingAggregator, StoreClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_default())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting busymap directory service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize store client
    let store = Arc::new(
        StoreClient::new(
            settings.store.endpoint.clone(),
            settings.store.api_key.clone(),
            settings.store.project_id.clone(),
            settings.store.database_id.clone(),
            settings.store.places_collection.clone(),
        )
        .unwrap_or_else(|e| {
            error!("Failed to create store client: {}", e);
            panic!("Store client error: {}", e);
        }),
    );

    info!("Store client initialized");

    // Initialize the directory mirror and its subscription loop
    let mirror = Arc::new(DirectoryMirror::new());
    let poll_interval = Duration::from_secs(settings.store.poll_interval_secs);

    tokio::spawn(run_subscription(
        Arc::clone(&store),
        Arc::clone(&mirror),
        poll_interval,
    ));

    info!(
        "Directory mirror subscription started (poll every {}s)",
        settings.store.poll_interval_secs
    );

    // Rating policy from configured thresholds
    let policy = RatingPolicy::new(
        settings.ratings.min_value,
        settings.ratings.max_value,
        chrono::Duration::hours(settings.ratings.expiry_hours),
        BandThresholds {
            cold_max: settings.ratings.cold_max,
            medium_max: settings.ratings.medium_max,
            unrated_band: settings.ratings.unrated_band(),
        },
    );

    let aggregator = Arc::new(RatingAggregator::new(
        Arc::clone(&store),
        Arc::clone(&mirror),
        policy,
    ));

    // One-shot expiry sweep at startup, once the first snapshot lands
    {
        let aggregator = Arc::clone(&aggregator);
        let mut rx = mirror.subscribe();
        tokio::spawn(async move {
            if rx.changed().await.is_ok() {
                let cleared = aggregator.sweep_expired().await;
                info!("Startup expiry sweep done: {} places reset", cleared);
            }
        });
    }

    let selector = Selector::new(
        settings.selection.radius_km,
        settings.selection.max_results,
    );

    // Selections with no explicit reference coordinate run against this
    // center, including the client's initial load
    let default_center = Coordinate::new(
        settings.selection.default_latitude,
        settings.selection.default_longitude,
    );

    info!(
        "Selector initialized (radius {} km, max {} results, default center {}, {})",
        settings.selection.radius_km,
        settings.selection.max_results,
        default_center.latitude,
        default_center.longitude
    );

    // Build application state
    let app_state = AppState {
        mirror,
        aggregator,
        selector,
        default_center,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
