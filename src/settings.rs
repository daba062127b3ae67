use crate::api::{Error, API_URL};
use crate::model::Credentials;
use config::{Config, Source};
use std::time::Duration;

pub const ENV_PREFIX: &str = "SOLIS";

/// Seconds between two fetch cycles.
pub const DEFAULT_INTERVAL: u64 = 300;

#[derive(Clone, serde::Deserialize)]
pub struct Settings {
    pub api_url: String,
    pub key_id: String,
    pub secret: String,
    #[serde(default)]
    pub username: Option<String>,
    pub interval: u64,
}

impl Settings {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            key_id: self.key_id.to_owned(),
            secret: self.secret.to_owned(),
            username: self.username.to_owned().filter(|u| !u.is_empty()),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

fn build<T: 'static + Source + Send + Sync>(source: T) -> Result<Settings, Error> {
    let mut settings = Config::default();
    settings
        .set_default("api_url", API_URL)?
        .set_default("interval", DEFAULT_INTERVAL as i64)?
        .merge(source)?;

    let settings: Settings = settings.try_into()?;
    if settings.interval == 0 {
        return Err(Error::ConfigError("interval must be positive".to_string()));
    }
    Ok(settings)
}

/// Read settings from `SOLIS_*` environment variables.
pub fn read_settings() -> Result<Settings, Error> {
    build(config::Environment::with_prefix(ENV_PREFIX))
}
