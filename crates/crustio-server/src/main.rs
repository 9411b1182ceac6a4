use std::sync::Arc;

use clap::Parser;
use crustio_api::{AppState, factory::FactoryClient, pizza_router};
use crustio_auth::{TokenCodec, hash_password};
use crustio_db::{DbSys, UserRole};
use crustio_metrics::{HttpSink, MetricsConfig, Reporter, ServiceMetrics};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const TOKEN_TTL_SECONDS: i64 = 60 * 60;

#[derive(Parser)]
#[command(name = "crustio", about = "Pizza ordering service")]
struct Cli {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value = "3000")]
    port: u16,

    #[arg(long, default_value = "./data")]
    data_dir: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::from_default_env().add_directive("crustio=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);

    let db = DbSys::new(&cli.data_dir).await?;
    seed_admin(&db).await?;

    let jwt_secret =
        std::env::var("CRUSTIO_JWT_SECRET").unwrap_or_else(|_| "toomanysecrets".to_string());
    let tokens = TokenCodec::new(jwt_secret, TOKEN_TTL_SECONDS);

    let metrics = Arc::new(ServiceMetrics::new());
    match MetricsConfig::from_env() {
        Some(config) => {
            let sink = Arc::new(HttpSink::new(&config));
            let reporter = Reporter::new(
                Arc::clone(&metrics),
                sink,
                config.source.clone(),
                config.interval,
            );
            // Detached on purpose: the reporting timer must never hold
            // the process open.
            let _handle = reporter.spawn();
            info!(url = %config.url, source = %config.source, "metrics reporting enabled");
        }
        None => warn!("CRUSTIO_METRICS_URL not set, metrics reporting disabled"),
    }

    let factory = FactoryClient::from_env();
    if factory.is_some() {
        info!("pizza factory fulfillment enabled");
    }

    let state = Arc::new(AppState::new(db, tokens, metrics, factory));
    let app = pizza_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("crustio service listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn seed_admin(db: &DbSys) -> crustio_common::Result<()> {
    let email = std::env::var("CRUSTIO_ADMIN_EMAIL").unwrap_or_else(|_| "a@jwt.com".to_string());
    if db.get_user_by_email(&email)?.is_some() {
        return Ok(());
    }

    let password = std::env::var("CRUSTIO_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
    let hash = hash_password(&password)?;
    db.create_user("admin", &email, &hash, vec![UserRole::admin()])
        .await?;
    info!(email = %email, "seeded default admin user");
    Ok(())
}
