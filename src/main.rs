mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, StorageBackend};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::appointments::{
    routes as appointments_routes, AppointmentService, ConflictChecker,
};
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::notifications::{routes as notifications_routes, NotificationScheduler};
use crate::modules::email::{LogMailer, Mailer, SmtpMailer};
use crate::modules::storage::{AgendaStore, MemoryAgendaStore, PgAgendaStore};
use axum::{middleware::from_fn_with_state, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// How long shutdown waits for a reminder tick in progress
const SCHEDULER_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Configuration loaded: storage={:?}, tokio_worker_threads={}, pid={}",
        config.storage.backend,
        worker_threads,
        std::process::id()
    );

    // Persistence
    let store: Arc<dyn AgendaStore> = match (config.storage.backend, &config.storage.database) {
        (StorageBackend::Postgres, Some(db_config)) => {
            let pool = database::connect(db_config).await?;
            Arc::new(PgAgendaStore::new(pool))
        }
        (StorageBackend::Postgres, None) => {
            anyhow::bail!("Postgres storage selected but no database configured")
        }
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Arc::new(MemoryAgendaStore::with_default_categories())
        }
    };

    // Email
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp_config) => Arc::new(
            SmtpMailer::new(smtp_config)
                .map_err(|e| anyhow::anyhow!("Failed to initialize SMTP mailer: {}", e))?,
        ),
        None => {
            tracing::warn!("SMTP_HOST not set; reminders will only be logged");
            Arc::new(LogMailer::new())
        }
    };

    // Services
    let conflict_checker = Arc::new(ConflictChecker::new(Arc::clone(&store)));
    let appointment_service = Arc::new(AppointmentService::new(
        Arc::clone(&store),
        Arc::clone(&conflict_checker),
    ));
    let category_service = Arc::new(CategoryService::new(Arc::clone(&store)));
    tracing::info!("Agenda services initialized");

    // Reminder worker
    let scheduler_cancel = CancellationToken::new();
    let scheduler = NotificationScheduler::new(Arc::clone(&store), Arc::clone(&mailer));
    let scheduler_handle = {
        let cancel = scheduler_cancel.clone();
        tokio::spawn(async move {
            scheduler.run(cancel).await;
        })
    };
    tracing::info!("Notification scheduler spawned");

    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn_with_state(
                Arc::new(credentials),
                middleware::swagger_basic_auth,
            ))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let api_routes = Router::new()
        .merge(categories_routes::routes(category_service))
        .merge(appointments_routes::routes(appointment_service))
        .merge(notifications_routes::routes(mailer));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(&config.app.cors_allowed_origins))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let listener = bind_listener(&addr)?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the worker between ticks and give a running tick time to finish
    scheduler_cancel.cancel();
    match tokio::time::timeout(
        Duration::from_secs(SCHEDULER_SHUTDOWN_TIMEOUT_SECS),
        scheduler_handle,
    )
    .await
    {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("Notification scheduler task failed: {}", e),
        Err(_) => tracing::warn!("Notification scheduler did not stop in time"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// TCP listener tuned with socket2
fn bind_listener(addr: &str) -> anyhow::Result<tokio::net::TcpListener> {
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(Duration::from_secs(60))
            .with_interval(Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
