//! # Posts API Server
//!
//! Actix-web entry point. Startup runs in a fixed order and aborts on the
//! first failure: environment, registry registration, remote configuration,
//! token key, document store, seed data, then the HTTP listener.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use posts_core::domain::seed::seed_default_posts;
use posts_core::ports::ServiceRegistry;
use posts_infra::{
    EurekaClient, EurekaConfig, MongoConnection, MongoPostRepository, SpringConfigClient,
    SpringConfigClientConfig,
};

mod bootstrap;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use bootstrap::StartupError;
use config::AppConfig;
use observability::{Metrics, MetricsMiddleware};
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let env_file = config::load_env_file();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    if let Some(path) = env_file.map_err(StartupError::from)? {
        tracing::info!(path = %path.display(), "Loaded env file");
    }

    let config = AppConfig::from_env().map_err(StartupError::from)?;

    tracing::info!(
        app_id = %config.registry.app_id,
        profile = %config.profile.as_str(),
        "Starting Posts API Server on {}:{}",
        config.bind_address,
        config.server_port
    );

    // Discovery registry
    let mut eureka_config = EurekaConfig::new(&config.registry.server_url);
    eureka_config.renewal_interval = config.registry.renewal_interval;
    let registry: Arc<dyn ServiceRegistry> =
        Arc::new(EurekaClient::new(eureka_config).map_err(StartupError::from)?);
    let instance = config.registry.instance_info(config.server_port);

    bootstrap::register_instance(registry.as_ref(), &instance).await?;
    let heartbeat = bootstrap::spawn_lease_renewal(
        registry.clone(),
        instance.clone(),
        config.registry.renewal_interval,
    );

    // Registered from here on: leave the registry however serving ends.
    let outcome = serve(&config).await;
    if let Err(e) = &outcome {
        tracing::error!(error = %e, "Posts API Server failed");
    }
    bootstrap::leave_registry(registry.as_ref(), &instance, heartbeat).await;

    outcome
}

/// Everything after registration: remote configuration, token key, store,
/// seed data and the HTTP listener. Returns when the server stops.
async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    // Remote configuration and token key
    let config_client = SpringConfigClient::new(
        SpringConfigClientConfig::new(&config.remote_config.uri)
            .with_encrypt_key(&config.remote_config.encrypt_key),
    )
    .map_err(StartupError::from)?;
    let remote =
        bootstrap::fetch_remote_config(&config_client, &config.registry.app_id, &config.profile)
            .await?;

    let key = bootstrap::resolve_jwt_key(
        &config.profile,
        &remote,
        config.public_key_path.as_deref(),
    )?;
    let verifier = bootstrap::build_verifier(&key)?;

    // Document store
    let connection = MongoConnection::init(&config.mongo)
        .await
        .map_err(|e| StartupError::StoreUnavailable(e.to_string()))?;
    let posts = Arc::new(MongoPostRepository::new(&connection.database));

    let seeded = seed_default_posts(posts.as_ref())
        .await
        .map_err(StartupError::from)?;
    if seeded > 0 {
        tracing::info!(count = seeded, "Seeded default posts");
    }

    let metrics = Metrics::new().map_err(StartupError::from)?;
    let state = AppState::new(posts, verifier, metrics);

    HttpServer::new(move || {
        App::new()
            .wrap(MetricsMiddleware::new(state.metrics.clone()))
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.bind_address.as_str(), config.server_port))?
    .run()
    .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
