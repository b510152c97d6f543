//! RentMate moderation server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use rentmate_api::{AppState, auth_middleware, router as api_router};
use rentmate_common::Config;
use rentmate_core::{
    EscalationService, HttpRentalClient, RentalClient, ReportEventPublisherService, ReportService,
    UserService,
};
use rentmate_db::repositories::{ReportRepository, UserRepository};
use rentmate_queue::{JobExecutor, RedisEventPublisher, SchedulerConfig, run_scheduler};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Bridges the scheduled maintenance jobs to the moderation services.
struct MaintenanceJobs {
    report_service: ReportService,
    escalation_service: EscalationService,
}

#[async_trait::async_trait]
impl JobExecutor for MaintenanceJobs {
    async fn release_expired_locks(&self) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.report_service.release_expired_locks().await?)
    }

    async fn escalate_overdue_reports(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.escalation_service.escalate_overdue_reports().await?)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentmate=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting rentmate moderation server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = rentmate_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    rentmate_db::migrate(&db).await?;
    info!("Migrations completed");

    // Connect the Redis event publisher
    info!("Connecting to Redis...");
    let events: ReportEventPublisherService = Arc::new(
        RedisEventPublisher::new(&config.redis.url, &config.redis.prefix).await?,
    );

    // Initialize repositories
    let db = Arc::new(db);
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let user_repo = UserRepository::new(Arc::clone(&db));

    // Initialize services
    let rental_client: Arc<dyn RentalClient> =
        Arc::new(HttpRentalClient::new(&config.rental.base_url));

    let report_service = ReportService::new(
        report_repo.clone(),
        user_repo.clone(),
        rental_client,
        events.clone(),
        config.moderation.lock_ttl(),
    );
    let escalation_service = EscalationService::new(
        report_repo,
        user_repo.clone(),
        events,
        config.moderation.escalation_window(),
    );
    let user_service = UserService::new(user_repo);

    // Start the lock reaper and escalation sweep timers
    let jobs = Arc::new(MaintenanceJobs {
        report_service: report_service.clone(),
        escalation_service,
    });
    run_scheduler(
        SchedulerConfig {
            reaper_interval: config.moderation.reaper_interval(),
            escalation_interval: config.moderation.escalation_interval(),
        },
        jobs,
    )
    .await;
    info!("Maintenance scheduler started");

    // Create app state
    let state = AppState {
        report_service,
        user_service,
    };

    // Build router
    let app = Router::new()
        .merge(api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
