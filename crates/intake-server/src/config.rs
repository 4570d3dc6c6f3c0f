use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use intake_db::DbConfig;
use intake_store::StoreConfig;
use url::Url;

/// 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Parser)]
#[command(name = "plate-intake", about = "Plate order intake form server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub server: ServerConfig,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a new admin key
    Keygen,
}

#[derive(Debug, Args)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "INTAKE_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "INTAKE_PORT", default_value = "3720")]
    pub port: u16,

    /// SQLite database file
    #[arg(long, env = "INTAKE_DB_PATH")]
    pub db_path: Option<PathBuf>,

    /// Directory uploaded files are written into
    #[arg(long, env = "INTAKE_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Public URL of the upload directory, used for download links
    #[arg(long, env = "INTAKE_PUBLIC_UPLOAD_URL")]
    pub public_upload_url: Option<Url>,

    /// Admin key for the submissions listing. Without one the listing is unavailable.
    #[arg(long, env = "INTAKE_ADMIN_KEY", hide_env_values = true)]
    pub admin_key: Option<String>,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "INTAKE_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// The configured public upload URL, or the server's own `/uploads/` route.
    pub fn public_upload_url(&self) -> Result<Url> {
        match &self.public_upload_url {
            Some(url) => Ok(url.clone()),
            None => {
                let default = format!("http://localhost:{}/uploads/", self.port);
                Url::parse(&default).with_context(|| format!("invalid upload URL {default}"))
            }
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            sqlite_path: self.db_path.clone(),
        }
    }

    /// Upload directory, defaulting to `uploads` under the database's data dir.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            upload_dir: self
                .upload_dir
                .clone()
                .unwrap_or_else(|| intake_db::data_dir().join("uploads")),
        }
    }
}
