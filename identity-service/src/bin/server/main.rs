use std::sync::Arc;

use auth::JwtHandler;
use identity_service::config::Config;
use identity_service::domain::principal::ports::PrincipalServicePort;
use identity_service::domain::principal::service::PrincipalService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryPrincipalRepository;
use identity_service::outbound::repositories::PostgresPrincipalRepository;
use identity_service::outbound::BcryptCredentialHasher;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_expires_in = %config.jwt.expires_in,
        password_cost = config.password.cost,
        database = config.database.url.is_some(),
        "Configuration loaded"
    );

    if config.jwt.uses_default_secret() {
        tracing::warn!("Using the default JWT secret; set JWT__SECRET for any shared deployment");
    }

    let jwt_handler = Arc::new(JwtHandler::new(
        config.jwt.secret.as_bytes(),
        config.jwt.expires_in,
    ));
    let credential_hasher = Arc::new(BcryptCredentialHasher::new(config.password.cost));

    let principal_service: Arc<dyn PrincipalServicePort> = match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = 5,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            Arc::new(PrincipalService::new(
                Arc::new(PostgresPrincipalRepository::new(pg_pool)),
                credential_hasher,
                Arc::clone(&jwt_handler),
            ))
        }
        None => {
            tracing::warn!("No database configured; principals are kept in memory");

            Arc::new(PrincipalService::new(
                Arc::new(InMemoryPrincipalRepository::new()),
                credential_hasher,
                Arc::clone(&jwt_handler),
            ))
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(principal_service, jwt_handler);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
