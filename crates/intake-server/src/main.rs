use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use intake_db::SqliteDatabase;
use intake_service::{ServiceConfig, SubmissionService};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use intake_server::auth;
use intake_server::config::{Cli, Command};
use intake_server::InnerAppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Keygen) => {
            // Raw key on stdout so it can be captured
            println!("{}", auth::generate_api_key());
            eprintln!("\nSet INTAKE_ADMIN_KEY to this value to enable the admin listing.");
        }
        None => {
            let cfg = cli.server;
            let db = Arc::new(SqliteDatabase::open(&cfg.db_config())?);
            let store = intake_store::create_store(&cfg.store_config());
            let service_config = ServiceConfig::new(cfg.public_upload_url()?)?;
            let upload_url = service_config.public_upload_url.clone();

            let auth = auth::build_auth_config(cfg.admin_key.as_deref());
            if auth.is_some() {
                tracing::info!("admin listing enabled");
            } else {
                tracing::warn!("no INTAKE_ADMIN_KEY set, admin listing is disabled");
            }

            let state = Arc::new(InnerAppState {
                service: SubmissionService::new(db, store, service_config),
                auth,
                max_body_bytes: cfg.max_upload_bytes,
            });

            let addr = cfg.socket_addr();
            let listener = TcpListener::bind(addr).await?;
            tracing::info!(%addr, %upload_url, "plate-intake listening");

            intake_server::serve(listener, state).await?;
        }
    }

    Ok(())
}
