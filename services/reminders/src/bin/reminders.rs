//! services/reminders/src/bin/reminders.rs

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderName, HeaderValue, Method,
};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use practice_reminders_core::ports::{NotificationService, ReminderStore};
use reminders_lib::{
    adapters::{DbAdapter, LogNotifier, MemoryStore},
    config::Config,
    dispatch::run_dispatch_loop,
    error::ApiError,
    lifecycle::ReminderService,
    web::{
        complete_reminder_handler, create_reminder_handler, delete_reminder_handler,
        get_reminder_handler, list_due_reminders_handler, list_reminders_handler,
        middleware::{SESSION_ID_HEADER, USER_ID_HEADER},
        reminder_stats_handler, require_owner,
        rest::ApiDoc,
        state::AppState,
        update_reminder_handler,
    },
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting reminders service...");

    // --- 2. Choose the Reminder Store ---
    let store: Arc<dyn ReminderStore> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let db_adapter = DbAdapter::new(db_pool);
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(db_adapter)
        }
        None => {
            info!("DATABASE_URL not set, keeping reminders in memory.");
            Arc::new(MemoryStore::new())
        }
    };

    // --- 3. Build the Shared AppState ---
    let reminders = Arc::new(ReminderService::new(store));
    let app_state = Arc::new(AppState {
        reminders: reminders.clone(),
    });

    // --- 4. Start the Dispatch Job ---
    let shutdown = CancellationToken::new();
    let notifier: Arc<dyn NotificationService> = Arc::new(LogNotifier::new());
    let dispatch_handle = tokio::spawn(run_dispatch_loop(
        reminders,
        notifier,
        config.dispatch_interval,
        shutdown.clone(),
    ));

    // --- 5. Create the Web Router ---
    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(SESSION_ID_HEADER),
        ]);

    let reminder_routes = Router::new()
        .route("/reminders", post(create_reminder_handler).get(list_reminders_handler))
        .route("/reminders/due", get(list_due_reminders_handler))
        .route("/reminders/stats", get(reminder_stats_handler))
        .route(
            "/reminders/{id}",
            get(get_reminder_handler)
                .put(update_reminder_handler)
                .delete(delete_reminder_handler),
        )
        .route("/reminders/{id}/complete", post(complete_reminder_handler))
        .layer(axum_middleware::from_fn(require_owner))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(reminder_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {:?}", e);
            }
            info!("Shutdown signal received.");
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Err(e) = dispatch_handle.await {
        error!("Dispatch task ended abnormally: {:?}", e);
    }
    info!("Reminders service stopped.");

    Ok(())
}
