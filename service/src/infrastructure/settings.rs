use std::env;

use anyhow::Context;
use config::{Config, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;
use tutotime_common::DatabaseSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_port: String,
    pub database: DatabaseSettings,
    pub media: MediaSettings,
    pub identity: IdentitySettings,
}

/// Media collaborator deployment configuration. Credential fields stay
/// optional here; [`crate::infrastructure::media::MediaClient::from_settings`]
/// checks the ones the selected auth mode requires and fails fast with
/// `ConfigMissing` before any network I/O.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    pub base_url: Option<String>,
    pub cloud_name: Option<String>,
    /// `signed` or `preset`.
    pub auth_mode: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub upload_preset: Option<String>,
    /// Target folder for uploaded assets.
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySettings {
    pub base_url: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        let run_mode = load_env("RUN_MODE", "development");

        let s = Config::builder()
            .add_source(File::with_name("./config/default"))
            .add_source(File::with_name(&format!("./config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("app").separator("_"))
            .build()?;

        s.try_deserialize().with_context(|| "failed to read config")
    }
}

fn load_env(key: &str, default_value: &'static str) -> String {
    env::var(key).unwrap_or_else(|_| default_value.into())
}
