//! Service configuration from `.env` and environment variables.

use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub listen_addr: String,
    /// Directory receiving `students.csv` and `jobs.csv`.
    pub export_dir: PathBuf,
    /// Directory uploaded documents are stored under, by original name.
    pub upload_dir: PathBuf,
    pub log_filter: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let listen_addr = get("LISTEN_ADDR", "0.0.0.0:3000");
        listen_addr
            .parse::<std::net::SocketAddr>()
            .with_context(|| format!("Invalid LISTEN_ADDR: {listen_addr}"))?;

        Ok(Self {
            database_url: get("DATABASE_URL", "sqlite://poc.db?mode=rwc"),
            listen_addr,
            export_dir: PathBuf::from(get("EXPORT_DIR", ".")),
            upload_dir: PathBuf::from(get("UPLOAD_DIR", "uploads")),
            log_filter: get("RUST_LOG", "info"),
        })
    }
}
