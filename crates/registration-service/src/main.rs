//! Platform Registration Service - Entry point.

use registration_service::{
    api::{create_router, AppState},
    config::{Config, LogConfig, StoreBackend},
    DynamoUserStore, MemoryUserStore, PlatformRegistrar, UserStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set by the Lambda runtime in every function execution environment.
const LAMBDA_RUNTIME_API: &str = "AWS_LAMBDA_RUNTIME_API";

fn init_logging(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry().with(filter);

    if log.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config.log);

    info!("Starting Platform Registration Service");

    // Fail fast on missing platform settings
    let settings = match config.registration_settings() {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    // Initialize storage
    let store: Arc<dyn UserStore> = match config.store.backend {
        StoreBackend::DynamoDb => Arc::new(
            DynamoUserStore::from_env(
                settings.table_name.clone(),
                config.store.partition_key.clone(),
            )
            .await,
        ),
        StoreBackend::Memory => {
            warn!("Using in-memory user store (data will be lost on restart)");
            Arc::new(MemoryUserStore::new())
        }
    };

    info!(
        platform_url = %platform_client::register_url(&settings.platform_domain),
        table = %settings.table_name,
        store = store.backend(),
        timeout = ?settings.timeout,
        "Configuration loaded"
    );

    // Initialize registration workflow
    let registrar = match PlatformRegistrar::from_settings(store, &settings) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to create platform client: {}", e);
            std::process::exit(1);
        }
    };

    let app = create_router(AppState::new(registrar));

    if std::env::var_os(LAMBDA_RUNTIME_API).is_some() {
        info!("Running as Lambda function");
        if let Err(e) = lambda_http::run(app).await {
            error!("Lambda runtime error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    // Bind to address
    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
