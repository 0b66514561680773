mod schema;
mod models;
mod schema_guard;
mod query;
mod store;
mod error;
mod api;

use anyhow::Result;
use clap::Parser;
use diesel_async::{pooled_connection::AsyncDieselConnectionManager, AsyncPgConnection};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "inventory-service")]
struct Args {
    /// Full connection URL; takes precedence over the DB_* parts below.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    db_host: String,

    #[arg(long, env = "DB_PORT", default_value = "5432")]
    db_port: u16,

    #[arg(long, env = "DB_USER", default_value = "postgres")]
    db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "password", hide_env_values = true)]
    db_password: String,

    #[arg(long, env = "DB_NAME", default_value = "inventory")]
    db_name: String,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "DB_CONN_LIMIT", default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
    db_pool_size: u32,

    #[arg(long, env = "PORT", default_value = "5174")]
    port: u16,
}

impl Args {
    fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                urlencoding::encode(&self.db_user),
                urlencoding::encode(&self.db_password),
                self.db_host,
                self.db_port,
                urlencoding::encode(&self.db_name)
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = AsyncDieselConnectionManager::<AsyncPgConnection>::new(args.database_url());
    let pool = bb8::Pool::builder()
        .max_size(args.db_pool_size)
        .build(config)
        .await?;
    info!(
        "Database pool ready ({} connections max, {}:{}/{})",
        args.db_pool_size, args.db_host, args.db_port, args.db_name
    );

    let app_state = api::AppState {
        store: Arc::new(store::PgInventoryStore::new(pool)),
    };

    let app = api::create_router(app_state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", args.port)).await?;

    info!("Inventory service ready to accept HTTP requests at http://0.0.0.0:{}/inventory", args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Inventory service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
