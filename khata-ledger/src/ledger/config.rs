use std::path::PathBuf;

use chrono::NaiveDate;
use derive_builder::Builder;

#[derive(Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct KhataLedgerConfig {
    #[builder(setter(into, strip_option), default)]
    pub(super) db_url: Option<String>,
    #[builder(setter(into, strip_option), default)]
    pub(super) pool: Option<sqlx::SqlitePool>,
    #[builder(setter(into, strip_option), default)]
    pub(super) max_connections: Option<u32>,
    #[builder(default)]
    pub(super) exec_migrations: bool,
    #[builder(setter(into), default = "PathBuf::from(\"reports\")")]
    pub(super) reports_dir: PathBuf,
    #[builder(setter(into), default = "\"BDT\".to_string()")]
    pub(super) default_currency: String,
    /// Used to bootstrap `System_Date` when the parameter row is absent.
    #[builder(setter(strip_option), default)]
    pub(super) default_system_date: Option<NaiveDate>,
}

impl KhataLedgerConfig {
    pub fn builder() -> KhataLedgerConfigBuilder {
        KhataLedgerConfigBuilder::default()
    }
}

impl KhataLedgerConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match (self.db_url.as_ref(), self.pool.as_ref()) {
            (None, None) | (Some(None), None) | (None, Some(None)) => {
                Err("One of db_url or pool must be set".to_string())
            }
            (Some(Some(_)), Some(Some(_))) => {
                Err("Only one of db_url or pool must be set".to_string())
            }
            _ => Ok(()),
        }
    }
}
