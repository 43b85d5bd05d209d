use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub db_url: String,
    pub reports_dir: PathBuf,
    /// Bootstrap value for `System_Date` on a fresh database.
    pub default_system_date: Option<NaiveDate>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_url: "sqlite:khata.db".to_string(),
            reports_dir: PathBuf::from("reports"),
            default_system_date: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = ServerConfig::default();
        if let Ok(port) = std::env::var("KHATA_PORT") {
            config.port = port.parse()?;
        }
        if let Ok(db_url) = std::env::var("KHATA_DB_URL") {
            config.db_url = db_url;
        }
        if let Ok(reports_dir) = std::env::var("KHATA_REPORTS_DIR") {
            config.reports_dir = PathBuf::from(reports_dir);
        }
        if let Ok(date) = std::env::var("KHATA_SYSTEM_DATE") {
            config.default_system_date = Some(date.parse()?);
        }
        Ok(config)
    }
}
